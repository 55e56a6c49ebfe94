//! Request handling for bentod
//!
//! Kept as a library so the binary and the integration tests drive the same
//! dispatch code.

mod handler;

pub use handler::*;

use bento_ipc::{IpcServer, ServerMessage};
use tracing::{debug, info, warn};

/// Handle one message from the IPC server
pub async fn handle_message(handler: &CommandHandler, ipc: &IpcServer, msg: ServerMessage) {
    match msg {
        ServerMessage::Request { client_id, request } => {
            let uid = ipc.peer_uid(&client_id).await;
            debug!(
                client_id = %client_id,
                uid = ?uid,
                request_id = request.request_id,
                "Request received"
            );
            let response = handler.handle(request).await;
            if let Err(e) = ipc.send_response(&client_id, response).await {
                warn!(client_id = %client_id, error = %e, "Failed to send response");
            }
        }

        ServerMessage::ClientConnected { client_id, peer_uid } => {
            info!(client_id = %client_id, uid = ?peer_uid, "Client session opened");
        }

        ServerMessage::ClientDisconnected { client_id } => {
            debug!(client_id = %client_id, "Client disconnected");
        }
    }
}
