use crate::http::AppState;
use crate::models::WsMessage;
use crate::service::{BroadcastMessage, MatchBroadcaster};
use actix::{Actor, ActorContext, AsyncContext, Handler, StreamHandler};
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);

/// WebSocket actor for live match events
pub struct MatchWebSocket {
    /// Unique session ID
    id: Uuid,
    /// Last heartbeat time
    hb: Instant,
    /// Subscribed match IDs
    subscriptions: HashSet<i32>,
    broadcaster: Arc<MatchBroadcaster>,
}

impl MatchWebSocket {
    pub fn new(broadcaster: Arc<MatchBroadcaster>) -> Self {
        Self {
            id: Uuid::new_v4(),
            hb: Instant::now(),
            subscriptions: HashSet::new(),
            broadcaster,
        }
    }

    /// Whether a broadcast scoped to `match_id` should reach this session.
    fn wants(&self, match_id: Option<i32>) -> bool {
        match match_id {
            Some(id) => self.subscriptions.contains(&id),
            None => true,
        }
    }

    fn send(ctx: &mut <Self as Actor>::Context, message: &WsMessage) {
        match serde_json::to_string(message) {
            Ok(json) => ctx.text(json),
            Err(e) => error!(error = %e, "Failed to serialize WebSocket message"),
        }
    }

    /// Send heartbeat to client
    fn hb(&self, ctx: &mut <Self as Actor>::Context) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |act, ctx| {
            if Instant::now().duration_since(act.hb) > CLIENT_TIMEOUT {
                warn!(session_id = %act.id, "WebSocket heartbeat timeout, disconnecting");
                ctx.stop();
                return;
            }

            Self::send(ctx, &WsMessage::Ping);
        });
    }

    /// Handle incoming WebSocket message
    fn handle_message(&mut self, msg: &str, ctx: &mut <Self as Actor>::Context) {
        match serde_json::from_str::<WsMessage>(msg) {
            Ok(WsMessage::Subscribe { match_id }) => {
                if self.subscriptions.insert(match_id) {
                    info!(session_id = %self.id, match_id, "Subscribed to match updates");
                }
            }
            Ok(WsMessage::Unsubscribe { match_id }) => {
                if self.subscriptions.remove(&match_id) {
                    info!(session_id = %self.id, match_id, "Unsubscribed from match updates");
                }
            }
            Ok(WsMessage::Ping) => Self::send(ctx, &WsMessage::Pong),
            Ok(WsMessage::Pong) => self.hb = Instant::now(),
            Ok(_) => {
                warn!(session_id = %self.id, "Received unexpected message type");
            }
            Err(e) => {
                error!(session_id = %self.id, error = %e, "Failed to parse WebSocket message");
                Self::send(
                    ctx,
                    &WsMessage::Error {
                        message: "Invalid message format".to_string(),
                    },
                );
            }
        }
    }
}

impl Actor for MatchWebSocket {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!(session_id = %self.id, "WebSocket connection established");
        self.broadcaster
            .register(self.id, ctx.address().recipient());
        self.hb(ctx);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        self.broadcaster.unregister(self.id);
        info!(session_id = %self.id, "WebSocket connection closed");
    }
}

/// Handle incoming WebSocket frames
impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for MatchWebSocket {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                self.hb = Instant::now();
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {
                self.hb = Instant::now();
            }
            Ok(ws::Message::Text(text)) => {
                self.handle_message(&text, ctx);
            }
            Ok(ws::Message::Binary(_)) => {
                warn!(session_id = %self.id, "Binary messages not supported");
            }
            Ok(ws::Message::Close(reason)) => {
                info!(session_id = %self.id, reason = ?reason, "Client initiated close");
                ctx.close(reason);
                ctx.stop();
            }
            Ok(_) => (),
            Err(e) => {
                warn!(session_id = %self.id, error = %e, "WebSocket protocol error");
                ctx.stop();
            }
        }
    }
}

impl Handler<BroadcastMessage> for MatchWebSocket {
    type Result = ();

    fn handle(&mut self, msg: BroadcastMessage, ctx: &mut Self::Context) {
        if self.wants(msg.match_id) {
            debug!(session_id = %self.id, match_id = ?msg.match_id, "Forwarding match event");
            Self::send(ctx, &msg.message);
        }
    }
}

/// WebSocket endpoint handler
/// WS /ws
pub async fn match_websocket(
    req: HttpRequest,
    stream: web::Payload,
    state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    info!("New WebSocket connection request");

    ws::start(MatchWebSocket::new(state.broadcaster.clone()), &req, stream)
}

/// Configure WebSocket routes
pub fn configure_ws_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/ws", web::get().to(match_websocket));
}
