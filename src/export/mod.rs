//! Batch folder analysis and result persistence

pub mod config;
pub mod output;
pub mod pipeline;
pub mod scan;

pub use config::BatchConfig;
pub use output::Summary;
pub use pipeline::{BatchPipeline, BatchReport};
