// bridge.rs - Host bridge: inbound dispatch and the outbound send capability

use std::collections::BTreeMap;

use log::{debug, info, warn};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::error::TryRecvError;

use crate::grid::StateSequence;
use crate::protocol::{InboundMessage, OutboundMessage, decode_inbound};

/// The `sendToHost` capability handed to the visualizer by its embedder.
pub trait HostSink {
    fn send_to_host(&mut self, message: OutboundMessage);
}

impl HostSink for Vec<OutboundMessage> {
    fn send_to_host(&mut self, message: OutboundMessage) {
        self.push(message);
    }
}

/// One handler per inbound action kind.
pub trait InboundHandler {
    fn on_update_table(&mut self, table: StateSequence);
    fn on_parameters(&mut self, parameters: BTreeMap<String, f64>);
    fn on_imported_data(&mut self, table: StateSequence, parameters: BTreeMap<String, f64>);
}

/// Routes inbound host messages to an [`InboundHandler`] and owns the
/// outbound sink.
///
/// The inbound side is a channel of raw JSON texts. The bridge holds the
/// subscription from `attach` until `detach` (or until the sender side goes
/// away); messages are processed in arrival order with no deduplication.
pub struct HostBridge<S> {
    inbound: Option<UnboundedReceiver<String>>,
    sink: S,
    dispatched: u64,
    rejected: u64,
}

impl<S: HostSink> HostBridge<S> {
    pub fn new(sink: S) -> Self {
        Self {
            inbound: None,
            sink,
            dispatched: 0,
            rejected: 0,
        }
    }

    pub fn attach(&mut self, inbound: UnboundedReceiver<String>) {
        if self.inbound.is_some() {
            warn!("Host bridge already attached; replacing the inbound channel");
        }
        self.inbound = Some(inbound);
        info!("Host bridge attached");
    }

    pub fn detach(&mut self) {
        if let Some(mut inbound) = self.inbound.take() {
            inbound.close();
            info!("Host bridge detached after {} messages", self.dispatched);
        }
    }

    pub fn is_attached(&self) -> bool {
        self.inbound.is_some()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }

    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    pub fn send(&mut self, message: OutboundMessage) {
        debug!("Sending {} to host", message.action());
        self.sink.send_to_host(message);
    }

    /// Drains every message currently queued without blocking. Returns how
    /// many were dispatched.
    pub fn pump<H: InboundHandler>(&mut self, handler: &mut H) -> usize {
        let mut count = 0;
        loop {
            let Some(inbound) = self.inbound.as_mut() else {
                return count;
            };
            match inbound.try_recv() {
                Ok(text) => {
                    if self.dispatch_text(&text, handler) {
                        count += 1;
                    }
                }
                Err(TryRecvError::Empty) => return count,
                Err(TryRecvError::Disconnected) => {
                    info!("Host channel closed");
                    self.inbound = None;
                    return count;
                }
            }
        }
    }

    /// Decodes and dispatches one raw message. Malformed input is logged and dropped.
    pub fn dispatch_text<H: InboundHandler>(&mut self, text: &str, handler: &mut H) -> bool {
        match decode_inbound(text) {
            Ok(message) => {
                self.dispatch(message, handler);
                true
            }
            Err(e) => {
                self.rejected += 1;
                warn!("{}", e);
                false
            }
        }
    }

    pub fn dispatch<H: InboundHandler>(&mut self, message: InboundMessage, handler: &mut H) {
        self.dispatched += 1;
        match message {
            InboundMessage::UpdateTable { table } => {
                debug!("Data from host: UPDATE_TABLE ({} cells)", table.len());
                handler.on_update_table(table);
            }
            InboundMessage::Parameters { parameters } => {
                debug!("Data from host: PARAMETERS {:?}", parameters);
                handler.on_parameters(parameters);
            }
            InboundMessage::ImportedData { table, parameters } => {
                debug!("Data from host: IMPORTED_DATA ({} cells, {:?})", table.len(), parameters);
                handler.on_imported_data(table, parameters);
            }
        }
    }
}

impl<S> Drop for HostBridge<S> {
    fn drop(&mut self) {
        if let Some(mut inbound) = self.inbound.take() {
            inbound.close();
        }
    }
}
