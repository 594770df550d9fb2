// transport.rs - Line-delimited JSON over stdio, plus an in-process channel sink

use std::io::Write;

use log::{info, warn};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::bridge::HostSink;
use crate::error::ProtocolError;
use crate::protocol::{OutboundMessage, encode_outbound};

/// Spawns a task that forwards each non-empty line of `reader` into the returned channel.
pub fn spawn_line_reader<R>(runtime: &Handle, reader: R) -> UnboundedReceiver<String>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    runtime.spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    if tx.send(line).is_err() {
                        break; // bridge detached
                    }
                }
                Ok(None) => {
                    info!("Host input closed");
                    break;
                }
                Err(e) => {
                    warn!("Host input failed: {}", e);
                    break;
                }
            }
        }
    });
    rx
}

pub fn spawn_stdin_reader(runtime: &Handle) -> UnboundedReceiver<String> {
    spawn_line_reader(runtime, tokio::io::stdin())
}

/// Writes one JSON object per line to stdout.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl StdoutSink {
    fn write(message: &OutboundMessage) -> Result<(), ProtocolError> {
        let text = encode_outbound(message)?;
        let mut out = std::io::stdout().lock();
        writeln!(out, "{}", text)?;
        out.flush()?;
        Ok(())
    }
}

impl HostSink for StdoutSink {
    fn send_to_host(&mut self, message: OutboundMessage) {
        if let Err(e) = Self::write(&message) {
            warn!("Dropping {}: {}", message.action(), e);
        }
    }
}

/// Forwards outbound messages to an in-process host.
#[derive(Debug, Clone)]
pub struct ChannelSink(pub UnboundedSender<OutboundMessage>);

impl HostSink for ChannelSink {
    fn send_to_host(&mut self, message: OutboundMessage) {
        if let Err(e) = self.0.send(message) {
            warn!("Host is gone, dropping {}", e.0.action());
        }
    }
}
