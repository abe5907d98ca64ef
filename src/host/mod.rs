//! The native-messaging host process.
//!
//! The browser launches the host and talks to it over framed stdin/stdout
//! (see [`crate::bridge::codec`]). The host answers `ping` itself and
//! forwards every other message to the desktop app's HTTP bridge.

mod config;
mod forward;

pub use config::{CONFIG_FILE_NAME, HostConfig, config_path};
pub use forward::{HOST_REQUEST_TIMEOUT, Forwarder, MAX_DETAIL_CHARS};

use serde_json::{Value, json};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info, warn};

use crate::bridge::codec::{self, CodecError};
use crate::config::DEFAULT_NATIVE_HOST;

/// Answers framed requests until the reader reaches end of stream.
///
/// A malformed frame is answered with `{ok: false, error}` and the loop
/// continues.
///
/// # Errors
///
/// Returns [`CodecError`] only when a reply cannot be written.
pub async fn serve<R, W>(reader: &mut R, writer: &mut W, forwarder: &Forwarder) -> Result<(), CodecError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    loop {
        let reply = match codec::read_message(reader).await {
            Ok(None) => {
                info!("input closed, host exiting");
                return Ok(());
            }
            Ok(Some(message)) => handle(&Value::Object(message), forwarder).await,
            Err(err) => {
                warn!(error = %err, "bad native message");
                json!({ "ok": false, "error": err.to_string() })
            }
        };
        codec::write_message(writer, &reply).await?;
    }
}

async fn handle(message: &Value, forwarder: &Forwarder) -> Value {
    let action = message
        .get("action")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    if action == "ping" {
        debug!("ping");
        return json!({ "ok": true, "host": DEFAULT_NATIVE_HOST });
    }
    forwarder.forward(message).await
}
