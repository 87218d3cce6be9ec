// Core modules
pub mod analysis;
pub mod feed;
pub mod models;
pub mod replication;
pub mod settings;
pub mod stats;
pub mod venue;

// Re-export commonly used types
pub use analysis::TickAnalysisEngine;
pub use models::*;
pub use replication::Replicator;
pub use stats::SessionTracker;

// Error handling
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;
