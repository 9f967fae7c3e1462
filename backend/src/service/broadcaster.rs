use crate::models::{Commentary, Match, MatchStatus, WsMessage};
use actix::{Message, Recipient};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tracing::debug;
use uuid::Uuid;

/// Actix message for broadcasting to all sessions
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct BroadcastMessage {
    /// `None` for events every session should see.
    pub match_id: Option<i32>,
    pub message: WsMessage,
}

/// Registry of live WebSocket sessions and fan-out of match events.
#[derive(Default)]
pub struct MatchBroadcaster {
    sessions: RwLock<HashMap<Uuid, Recipient<BroadcastMessage>>>,
}

impl MatchBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, session_id: Uuid, recipient: Recipient<BroadcastMessage>) {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(session_id, recipient);
    }

    pub fn unregister(&self, session_id: Uuid) {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&session_id);
    }

    pub fn session_count(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Deliver `message` to every registered session. Sessions filter scoped
    /// messages against their own subscriptions.
    pub fn publish(&self, message: WsMessage) {
        let envelope = BroadcastMessage {
            match_id: message.scope(),
            message,
        };

        let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
        debug!(
            sessions = sessions.len(),
            match_id = ?envelope.match_id,
            "Broadcasting match event"
        );
        for recipient in sessions.values() {
            recipient.do_send(envelope.clone());
        }
    }

    pub fn match_created(&self, record: &Match) {
        self.publish(WsMessage::MatchCreated {
            match_data: record.clone(),
        });
    }

    pub fn status_changed(&self, match_id: i32, from: MatchStatus, to: MatchStatus) {
        self.publish(WsMessage::MatchStatusChanged { match_id, from, to });
    }

    pub fn commentary_created(&self, commentary: &Commentary) {
        self.publish(WsMessage::CommentaryCreated {
            commentary: commentary.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix::{Actor, Context, Handler};

    #[derive(Default)]
    struct Collector {
        received: Vec<BroadcastMessage>,
    }

    impl Actor for Collector {
        type Context = Context<Self>;
    }

    impl Handler<BroadcastMessage> for Collector {
        type Result = ();

        fn handle(&mut self, msg: BroadcastMessage, _ctx: &mut Self::Context) {
            self.received.push(msg);
        }
    }

    #[derive(Message)]
    #[rtype(result = "Vec<BroadcastMessage>")]
    struct Drain;

    impl Handler<Drain> for Collector {
        type Result = Vec<BroadcastMessage>;

        fn handle(&mut self, _msg: Drain, _ctx: &mut Self::Context) -> Self::Result {
            std::mem::take(&mut self.received)
        }
    }

    #[actix_web::test]
    async fn test_publish_reaches_registered_sessions() {
        let broadcaster = MatchBroadcaster::new();
        let first = Collector::default().start();
        let second = Collector::default().start();
        let first_id = Uuid::new_v4();

        broadcaster.register(first_id, first.clone().recipient());
        broadcaster.register(Uuid::new_v4(), second.clone().recipient());
        assert_eq!(broadcaster.session_count(), 2);

        broadcaster.status_changed(4, MatchStatus::Scheduled, MatchStatus::Live);

        for addr in [&first, &second] {
            let received = addr.send(Drain).await.unwrap();
            assert_eq!(received.len(), 1);
            assert_eq!(received[0].match_id, Some(4));
        }

        broadcaster.unregister(first_id);
        broadcaster.publish(WsMessage::Error {
            message: "maintenance".to_string(),
        });

        assert!(first.send(Drain).await.unwrap().is_empty());
        let received = second.send(Drain).await.unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].match_id, None);
    }

    #[test]
    fn test_publish_without_sessions_is_noop() {
        let broadcaster = MatchBroadcaster::new();
        broadcaster.status_changed(1, MatchStatus::Live, MatchStatus::Finished);
        assert_eq!(broadcaster.session_count(), 0);
    }
}
