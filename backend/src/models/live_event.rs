use crate::models::commentary::Commentary;
use crate::models::match_model::{Match, MatchStatus};
use serde::{Deserialize, Serialize};

/// WebSocket message types
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    /// Subscribe to updates of one match
    #[serde(rename_all = "camelCase")]
    Subscribe { match_id: i32 },
    /// Unsubscribe from updates of one match
    #[serde(rename_all = "camelCase")]
    Unsubscribe { match_id: i32 },
    /// A match was created (sent to every session)
    MatchCreated {
        #[serde(rename = "match")]
        match_data: Match,
    },
    /// Stored status of a match changed
    #[serde(rename_all = "camelCase")]
    MatchStatusChanged {
        match_id: i32,
        from: MatchStatus,
        to: MatchStatus,
    },
    /// Commentary appended to a match
    CommentaryCreated { commentary: Commentary },
    /// Error message
    Error { message: String },
    /// Ping/Pong for keepalive
    Ping,
    Pong,
}

impl WsMessage {
    /// Match the message is scoped to; `None` means every session receives it.
    pub fn scope(&self) -> Option<i32> {
        match self {
            WsMessage::MatchStatusChanged { match_id, .. } => Some(*match_id),
            WsMessage::CommentaryCreated { commentary } => Some(commentary.match_id),
            _ => None,
        }
    }
}
