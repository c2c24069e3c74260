#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Reference controllers that turn observations into actions.

mod navigator;
mod queued;
mod random;

pub use navigator::{plan_path, BreadthFirstNavigator};
pub use queued::QueuedController;
pub use random::RandomWalker;
