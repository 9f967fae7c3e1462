// Core models
pub mod commentary;
pub mod live_event;
pub mod match_model;

// Re-export commonly used types
pub use commentary::*;
pub use live_event::*;
pub use match_model::*;
