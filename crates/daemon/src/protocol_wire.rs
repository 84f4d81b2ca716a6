// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Frame codec: a big-endian `u32` byte count, then that many bytes of JSON.

use std::future::Future;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("frame of {0} bytes exceeds the {MAX_FRAME_LEN} byte limit")]
    FrameTooLarge(usize),

    #[error("Connection closed")]
    Closed,

    #[error("Timeout")]
    Timeout,
}

/// Largest accepted frame. A full `Sync` listing of a busy node stays far below it.
pub const MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

/// Default IPC timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

pub const PROTOCOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Serialize `msg` and write it as one frame.
pub async fn send<W, T>(writer: &mut W, msg: &T, timeout: Duration) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let payload = serde_json::to_vec(msg)?;
    let len = frame_len(payload.len())?;
    within(timeout, async {
        writer.write_all(&len.to_be_bytes()).await?;
        writer.write_all(&payload).await?;
        writer.flush().await?;
        Ok::<_, ProtocolError>(())
    })
    .await
}

/// Read one frame and deserialize it.
///
/// A frame that arrives intact but does not decode yields
/// [`ProtocolError::Json`]; the stream is still usable for a reply.
pub async fn recv<R, T>(reader: &mut R, timeout: Duration) -> Result<T, ProtocolError>
where
    R: AsyncRead + Unpin,
    T: DeserializeOwned,
{
    let payload = within(timeout, async {
        let len = match reader.read_u32().await {
            Ok(len) => len as usize,
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                return Err(ProtocolError::Closed)
            }
            Err(e) => return Err(ProtocolError::Io(e)),
        };
        frame_len(len)?;
        let mut payload = vec![0u8; len];
        reader.read_exact(&mut payload).await?;
        Ok::<_, ProtocolError>(payload)
    })
    .await?;
    Ok(serde_json::from_slice(&payload)?)
}

fn frame_len(len: usize) -> Result<u32, ProtocolError> {
    match u32::try_from(len) {
        Ok(n) if len <= MAX_FRAME_LEN => Ok(n),
        _ => Err(ProtocolError::FrameTooLarge(len)),
    }
}

async fn within<T>(
    timeout: Duration,
    io: impl Future<Output = Result<T, ProtocolError>>,
) -> Result<T, ProtocolError> {
    tokio::time::timeout(timeout, io)
        .await
        .map_err(|_| ProtocolError::Timeout)?
}
