use crate::logger::get_logger;
use crate::registry::ConnectionRegistry;
use crate::response::{self, Envelope, ResponseError};
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::Response,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectEvent {
    #[serde(default)]
    pub request_context: RequestContext,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    pub connection_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct Connected {
    message: &'static str,
}

/// A registry failure becomes a 500 error envelope.
pub fn on_connect(
    registry: &dyn ConnectionRegistry,
    connection_id: &str,
) -> Result<Envelope, ResponseError> {
    let logger = get_logger("connect");
    logger.info(format!("Client connected: {}", connection_id));

    if let Err(e) = registry.register(connection_id) {
        logger.error(format!("Failed to register connection {}: {}", connection_id, e));
        return Ok(response::error(e.to_string()));
    }

    response::success(&Connected {
        message: "Connected",
    })
}

pub async fn connect_event_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Envelope, ResponseError> {
    let logger = get_logger("connect");

    let event: ConnectEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            logger.warn(format!("Rejected malformed connect event: {}", e));
            return Ok(response::error_with_status(
                format!("Invalid connect event: {}", e),
                StatusCode::BAD_REQUEST,
            ));
        }
    };

    let connection_id = match event.request_context.connection_id {
        Some(id) if !id.is_empty() => id,
        _ => {
            logger.warn("Connect event without a connection id");
            return Ok(response::error_with_status(
                "Missing requestContext.connectionId",
                StatusCode::BAD_REQUEST,
            ));
        }
    };

    on_connect(state.registry.as_ref(), &connection_id)
}

pub async fn connect_upgrade_handler(
    State(state): State<Arc<AppState>>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| serve_connection(state, socket))
}

async fn serve_connection(state: Arc<AppState>, mut socket: WebSocket) {
    let logger = get_logger("connect");
    let connection_id = Uuid::new_v4().to_string();

    let envelope = match on_connect(state.registry.as_ref(), &connection_id) {
        Ok(envelope) => envelope,
        Err(e) => {
            logger.error(format!("Failed to build connect reply: {}", e));
            return;
        }
    };
    let registered = envelope.status().is_success();

    if socket.send(Message::Text(envelope.into_body())).await.is_ok() && registered {
        while let Some(frame) = socket.recv().await {
            match frame {
                Ok(Message::Text(text)) => {
                    logger.debug(format!("Frame from {}: {}", connection_id, text))
                }
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    logger.warn(format!("Socket error on {}: {}", connection_id, e));
                    break;
                }
            }
        }
    }

    if registered {
        match state.registry.unregister(&connection_id) {
            Ok(Some(connected_at)) => logger.info(format!(
                "Client disconnected: {} after {}ms",
                connection_id,
                (Utc::now() - connected_at).num_milliseconds()
            )),
            Ok(None) => logger.info(format!("Client disconnected: {}", connection_id)),
            Err(e) => logger.error(format!("Failed to unregister {}: {}", connection_id, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{InMemoryRegistry, RegistryError};
    use chrono::DateTime;
    use futures::StreamExt;
    use serde_json::{json, Value};
    use std::net::{SocketAddr, TcpListener};
    use std::num::NonZeroUsize;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio_tungstenite::{connect_async, tungstenite::Message as WsMessage};

    #[derive(Default)]
    struct RejectingRegistry {
        unregister_calls: AtomicUsize,
    }

    impl ConnectionRegistry for RejectingRegistry {
        fn register(&self, _connection_id: &str) -> Result<(), RegistryError> {
            Err(RegistryError::Unavailable)
        }
        fn unregister(
            &self,
            _connection_id: &str,
        ) -> Result<Option<DateTime<Utc>>, RegistryError> {
            self.unregister_calls.fetch_add(1, Ordering::SeqCst);
            Err(RegistryError::Unavailable)
        }
        fn contains(&self, _connection_id: &str) -> bool {
            false
        }
        fn len(&self) -> usize {
            0
        }
    }

    fn body(env: &Envelope) -> Value {
        serde_json::from_str(env.body()).expect("json body")
    }

    fn spawn_host(registry: Arc<dyn ConnectionRegistry>) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let app = crate::build_router(Arc::new(AppState::with_registry(registry)));
        let server = axum::Server::from_tcp(listener)
            .expect("server from listener")
            .serve(app.into_make_service());
        tokio::spawn(server);
        addr
    }

    fn frame_json(frame: WsMessage) -> Value {
        match frame {
            WsMessage::Text(text) => serde_json::from_str(&text).expect("json frame"),
            other => panic!("expected a text frame, got {:?}", other),
        }
    }

    #[test]
    fn on_connect_registers_and_replies() {
        let registry = InMemoryRegistry::new(NonZeroUsize::new(8).expect("non-zero"));
        let env = on_connect(&registry, "conn-1").expect("envelope");
        assert_eq!(env.status_code(), 200);
        assert_eq!(body(&env), json!({"success": true, "data": {"message": "Connected"}}));
        assert!(registry.contains("conn-1"));
    }

    #[test]
    fn on_connect_reports_registry_failure() {
        let env = on_connect(&RejectingRegistry::default(), "conn-2").expect("envelope");
        assert_eq!(env.status_code(), 500);
        assert_eq!(
            body(&env),
            json!({"success": false, "error": {"message": "connection registry unavailable"}})
        );
    }

    #[test]
    fn connect_event_parses_host_shape() {
        let event: ConnectEvent =
            serde_json::from_value(json!({"requestContext": {"connectionId": "x1", "stage": "dev"}}))
                .expect("event");
        assert_eq!(event.request_context.connection_id.as_deref(), Some("x1"));

        let bare: ConnectEvent = serde_json::from_value(json!({})).expect("event");
        assert!(bare.request_context.connection_id.is_none());
    }

    #[tokio::test]
    async fn websocket_session_registers_until_close() {
        let registry = Arc::new(InMemoryRegistry::new(NonZeroUsize::new(8).expect("non-zero")));
        let addr = spawn_host(registry.clone());

        let (mut socket, _) = connect_async(format!("ws://{}/ws", addr))
            .await
            .expect("websocket handshake");
        let first = socket.next().await.expect("first frame").expect("frame ok");
        assert_eq!(
            frame_json(first),
            json!({"success": true, "data": {"message": "Connected"}})
        );
        assert_eq!(registry.len(), 1);

        socket.close(None).await.expect("close");
        tokio::time::timeout(Duration::from_secs(2), async {
            while !registry.is_empty() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("connection unregistered after close");
        assert_eq!(registry.len(), 0);
    }

    #[tokio::test]
    async fn websocket_registry_failure_sends_error_and_skips_unregister() {
        let registry = Arc::new(RejectingRegistry::default());
        let addr = spawn_host(registry.clone());

        let (mut socket, _) = connect_async(format!("ws://{}/ws", addr))
            .await
            .expect("websocket handshake");
        let first = socket.next().await.expect("first frame").expect("frame ok");
        assert_eq!(
            frame_json(first),
            json!({"success": false, "error": {"message": "connection registry unavailable"}})
        );

        // The host drops the socket after the error reply.
        tokio::time::timeout(Duration::from_secs(2), async {
            while let Some(Ok(_)) = socket.next().await {}
        })
        .await
        .expect("socket closed by host");
        assert_eq!(registry.unregister_calls.load(Ordering::SeqCst), 0);
    }
}
