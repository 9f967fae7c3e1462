// Service layer module for Matchday
pub mod broadcaster;
pub mod commentary_service;
pub mod match_service;
pub mod match_status;
pub mod status_sweeper;

pub use broadcaster::{BroadcastMessage, MatchBroadcaster};
pub use commentary_service::CommentaryService;
pub use match_service::{MatchService, Reconciled, SweepSummary};
pub use match_status::{
    classify, classify_at, sync_status, sync_status_at, IntoMatchTime, InvalidTimeInput,
    StatusRecord, TimeBoundary,
};
pub use status_sweeper::StatusSweeper;
