pub mod sessionize;

pub use sessionize::{run_pipeline, sessionize, CommandError, RunSummary};
