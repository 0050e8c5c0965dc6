//! Pipe engine.
//!
//! Runs the items of a pipe over a typed dataset, strictly in declared order.
//! The synchronous and asynchronous paths are kept structurally parallel; the
//! async one awaits every item before starting the next.

use crate::PipeItem;
use sift_core::{Config, Dataset};

/// Returns true if the pipe must stop before running the next item.
fn should_stop(dataset: &Dataset, config: &Config) -> bool {
    if !dataset.typed {
        return true;
    }
    dataset.has_issues() && (config.is_abort_early() || config.is_abort_pipe_early())
}

/// Runs `pipe` over `dataset`.
///
/// # Panics
///
/// Panics if the pipe contains an asynchronous item.
pub fn run_pipe(pipe: &[PipeItem], mut dataset: Dataset, config: &Config) -> Dataset {
    for item in pipe {
        if should_stop(&dataset, config) {
            break;
        }
        match item {
            PipeItem::Validation(validation) => validation.run(&mut dataset, config),
            PipeItem::Transformation(transformation) => transformation.run(&mut dataset, config),
            PipeItem::Metadata(_) => {}
        }
    }
    dataset
}

/// Runs `pipe` over `dataset`, awaiting each item in turn.
pub async fn run_pipe_async(pipe: &[PipeItem], mut dataset: Dataset, config: &Config) -> Dataset {
    for item in pipe {
        if should_stop(&dataset, config) {
            break;
        }
        match item {
            PipeItem::Validation(validation) => validation.run_async(&mut dataset, config).await,
            PipeItem::Transformation(transformation) => {
                transformation.run_async(&mut dataset, config).await
            }
            PipeItem::Metadata(_) => {}
        }
    }
    dataset
}
