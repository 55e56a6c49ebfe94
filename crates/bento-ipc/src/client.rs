//! IPC client implementation

use bento_api::{Command, Request, Response};
use bento_util::SessionToken;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tracing::trace;

use crate::{IpcError, IpcResult};

/// IPC Client for connecting to bentod
pub struct IpcClient {
    reader: BufReader<tokio::net::unix::OwnedReadHalf>,
    writer: tokio::net::unix::OwnedWriteHalf,
    next_request_id: u64,
}

impl IpcClient {
    /// Connect to bentod
    pub async fn connect(socket_path: impl AsRef<Path>) -> IpcResult<Self> {
        let stream = UnixStream::connect(socket_path).await?;
        let (read_half, write_half) = stream.into_split();

        Ok(Self {
            reader: BufReader::new(read_half),
            writer: write_half,
            next_request_id: 1,
        })
    }

    /// Send a command without a session and wait for the response
    pub async fn send(&mut self, command: Command) -> IpcResult<Response> {
        self.send_with_token(None, command).await
    }

    /// Send a command on behalf of a session and wait for the response
    pub async fn send_with_token(
        &mut self,
        token: Option<SessionToken>,
        command: Command,
    ) -> IpcResult<Response> {
        let request_id = self.next_request_id;
        self.next_request_id += 1;

        let request = Request::new(request_id, command).with_token(token);
        let mut json = serde_json::to_string(&request)?;
        json.push('\n');

        trace!(request_id, "Sending request");
        self.writer.write_all(json.as_bytes()).await?;

        let mut line = String::new();
        let n = self.reader.read_line(&mut line).await?;
        if n == 0 {
            return Err(IpcError::ConnectionClosed);
        }

        let response: Response = serde_json::from_str(line.trim())?;
        if response.request_id != request_id {
            return Err(IpcError::InvalidMessage(format!(
                "response for request {} while waiting for {}",
                response.request_id, request_id
            )));
        }

        Ok(response)
    }
}
