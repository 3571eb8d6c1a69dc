pub mod engine;

pub use engine::{DeletionEngine, DeletionReport, DeletionStatus, RunConfig};
