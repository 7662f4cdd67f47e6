use std::{net::SocketAddr, sync::Arc, time::Duration};

use futures_util::TryFutureExt;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{
        tcp::{OwnedReadHalf, OwnedWriteHalf},
        TcpStream,
    },
    sync::Mutex,
};
use tracing::debug;

use crate::error::ClientError;

/// Outcome of a single bounded read from the server.
pub enum ReadOutcome {
    /// `buf[..len]` holds freshly received bytes.
    Data(usize),
    /// No data arrived within the read timeout. Not an error; retry.
    TimedOut,
    /// The peer closed the stream or the transport failed.
    Closed,
}

/// Write half of the connection, shared between the receive loop's owner
/// and `send` callers. Closing the transport empties the slot, so late
/// writers observe `NotConnected`.
#[derive(Clone)]
pub struct WriteHandle {
    writer: Arc<Mutex<Option<OwnedWriteHalf>>>,
}

impl WriteHandle {
    pub async fn write(&self, bytes: &[u8]) -> Result<(), ClientError> {
        let mut writer = self.writer.lock().await;
        let Some(ref mut stream) = *writer else {
            return Err(ClientError::NotConnected);
        };
        if let Err(e) = stream.write_all(bytes).await {
            debug!("Write failed, dropping connection: {}", e);
            *writer = None;
            return Err(ClientError::ConnectionClosed);
        }
        Ok(())
    }
}

/// One live connection to the server: the read half plus a shareable
/// write handle. Owned by the receive loop after a successful connect.
pub struct Transport {
    reader: OwnedReadHalf,
    writer: WriteHandle,
    read_timeout: Duration,
}

impl Transport {
    pub async fn connect(
        endpoint: &str,
        connect_timeout: Duration,
        read_timeout: Duration,
    ) -> Result<(Self, SocketAddr), ClientError> {
        debug!("Connecting to controller at {}", endpoint);
        let connect = TcpStream::connect(endpoint).and_then(|s| async {
            s.set_nodelay(true)?;
            Ok(s)
        });
        let stream = match tokio::time::timeout(connect_timeout, connect).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                return Err(ClientError::ConnectFailed {
                    reason: e.to_string(),
                })
            }
            Err(_) => {
                return Err(ClientError::ConnectFailed {
                    reason: "Timeout".into(),
                })
            }
        };

        let peer = stream.peer_addr().map_err(|e| ClientError::ConnectFailed {
            reason: e.to_string(),
        })?;
        let (reader, writer) = stream.into_split();
        Ok((
            Self {
                reader,
                writer: WriteHandle {
                    writer: Arc::new(Mutex::new(Some(writer))),
                },
                read_timeout,
            },
            peer,
        ))
    }

    pub fn write_handle(&self) -> WriteHandle {
        self.writer.clone()
    }

    /// Blocks up to the read timeout. A timeout is reported as
    /// [`ReadOutcome::TimedOut`] so the receive loop can keep waiting for
    /// an idle peer without treating it as a failure.
    pub async fn read(&mut self, buf: &mut [u8]) -> ReadOutcome {
        match tokio::time::timeout(self.read_timeout, self.reader.read(buf)).await {
            Ok(Ok(0)) => ReadOutcome::Closed,
            Ok(Ok(len)) => ReadOutcome::Data(len),
            Ok(Err(e)) => {
                debug!("Read failed, treating as closed: {}", e);
                ReadOutcome::Closed
            }
            Err(_) => ReadOutcome::TimedOut,
        }
    }

    /// Idempotent; empties the shared writer slot so pending `send`
    /// callers fail with `NotConnected` instead of writing to a dead
    /// socket.
    pub async fn close(&mut self) {
        self.writer.writer.lock().await.take();
    }
}
