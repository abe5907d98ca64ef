//! Native-messaging framing.
//!
//! Each message is a 4-byte little-endian length followed by that many bytes
//! of UTF-8 JSON. The same framing is used in both directions.

use serde_json::{Map, Value};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Largest message accepted from the peer (10 MiB).
pub const MAX_MESSAGE_BYTES: usize = 10 * 1024 * 1024;

/// Framing failures.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("I/O error on native messaging pipe: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid message length")]
    InvalidLength,

    #[error("native message too large: {0} bytes")]
    TooLarge(usize),

    #[error("message body truncated")]
    Truncated,

    #[error("invalid JSON in native message: {0}")]
    Json(#[from] serde_json::Error),

    #[error("message payload must be object")]
    NotObject,
}

/// Reads one frame and parses it as any JSON value.
///
/// Returns `Ok(None)` on a clean end of stream before the first length byte.
///
/// # Errors
///
/// Returns [`CodecError`] for a short or zero length prefix, an oversized
/// frame, a truncated body, or invalid JSON.
pub async fn read_frame<R>(reader: &mut R) -> Result<Option<Value>, CodecError>
where
    R: AsyncRead + Unpin,
{
    let mut prefix = [0_u8; 4];
    let mut filled = 0;
    while filled < prefix.len() {
        let n = reader.read(&mut prefix[filled..]).await?;
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(CodecError::InvalidLength);
        }
        filled += n;
    }

    let length = u32::from_le_bytes(prefix) as usize;
    if length == 0 {
        return Err(CodecError::InvalidLength);
    }
    if length > MAX_MESSAGE_BYTES {
        return Err(CodecError::TooLarge(length));
    }

    let mut body = vec![0_u8; length];
    reader.read_exact(&mut body).await.map_err(|err| {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            CodecError::Truncated
        } else {
            CodecError::Io(err)
        }
    })?;
    Ok(Some(serde_json::from_slice(&body)?))
}

/// Reads one frame that must hold a JSON object.
///
/// # Errors
///
/// Same as [`read_frame`], plus [`CodecError::NotObject`].
pub async fn read_message<R>(reader: &mut R) -> Result<Option<Map<String, Value>>, CodecError>
where
    R: AsyncRead + Unpin,
{
    match read_frame(reader).await? {
        None => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(_) => Err(CodecError::NotObject),
    }
}

/// Writes one frame and flushes.
///
/// # Errors
///
/// Returns [`CodecError`] if encoding fails, the payload exceeds
/// [`MAX_MESSAGE_BYTES`], or the pipe rejects the write.
pub async fn write_message<W>(writer: &mut W, payload: &Value) -> Result<(), CodecError>
where
    W: AsyncWrite + Unpin,
{
    let encoded = serde_json::to_vec(payload)?;
    if encoded.len() > MAX_MESSAGE_BYTES {
        return Err(CodecError::TooLarge(encoded.len()));
    }
    let length = u32::try_from(encoded.len()).map_err(|_| CodecError::TooLarge(encoded.len()))?;
    writer.write_all(&length.to_le_bytes()).await?;
    writer.write_all(&encoded).await?;
    writer.flush().await?;
    Ok(())
}
