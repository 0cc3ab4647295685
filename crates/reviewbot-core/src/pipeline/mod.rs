//! Review classification pipeline.
//!
//! - **analyzer**: the classification chain (cache, then retry controller,
//!   then a single provider call)
//! - **batch**: ordered batch runs with progress reporting
//! - **session**: run state owned by one interactive session

pub mod analyzer;
pub mod batch;
pub mod session;

// Re-exports for convenient access
pub use analyzer::ReviewAnalyzer;
pub use batch::{BatchEntry, BatchRun, BatchRunner};
pub use session::{RunState, Session, TriggerOutcome};
