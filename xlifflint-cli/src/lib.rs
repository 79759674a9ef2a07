//! CLI library for testing purposes

pub mod batch;
pub mod path_glob;
pub mod report;

pub use batch::run_batch;
pub use report::{BatchSummary, OutputMode};
pub use xlifflint::FixOptions;
