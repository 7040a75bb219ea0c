//! Common utilities for Fragment binaries

mod shutdown;

pub use shutdown::{cancellable_sleep, ShutdownManager};
