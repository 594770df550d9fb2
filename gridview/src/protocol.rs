// protocol.rs - Wire format for messages exchanged with the host
//
// Every message is a JSON object `{ "action": ..., "data": ... }`. Actions
// without a payload omit `data`.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ProtocolError;
use crate::grid::StateSequence;

/// Messages pushed by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InboundMessage {
    /// One new generation computed by the host.
    UpdateTable { table: StateSequence },
    Parameters {
        #[serde(deserialize_with = "numeric_map")]
        parameters: BTreeMap<String, f64>,
    },
    /// A previously exported table and its parameters, loaded by the host.
    ImportedData {
        table: StateSequence,
        #[serde(default, deserialize_with = "numeric_map")]
        parameters: BTreeMap<String, f64>,
    },
}

/// Messages sent to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutboundMessage {
    Export {
        table: StateSequence,
        parameters: BTreeMap<String, ExportedParameter>,
    },
    Import,
    PlaySimulation {
        parameters: BTreeMap<String, u32>,
        table: StateSequence,
    },
    PauseSimulation,
}

impl OutboundMessage {
    pub fn action(&self) -> &'static str {
        match self {
            OutboundMessage::Export { .. } => "EXPORT",
            OutboundMessage::Import => "IMPORT",
            OutboundMessage::PlaySimulation { .. } => "PLAY_SIMULATION",
            OutboundMessage::PauseSimulation => "PAUSE_SIMULATION",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedParameter {
    pub value: u32,
    #[serde(rename = "type")]
    pub kind: String,
}

impl ExportedParameter {
    pub fn number(value: u32) -> Self {
        Self { value, kind: "number".to_string() }
    }
}

// Exported files may carry numbers as strings; both forms are accepted.
#[derive(Deserialize)]
#[serde(untagged)]
enum Numeric {
    Number(f64),
    Text(String),
    Exported { value: Box<Numeric> },
    // Anything else is dropped without rejecting its siblings
    Other(serde::de::IgnoredAny),
}

impl Numeric {
    fn as_f64(&self) -> Option<f64> {
        match self {
            Numeric::Number(n) => Some(*n),
            Numeric::Text(s) => s.trim().parse().ok(),
            Numeric::Exported { value } => value.as_f64(),
            Numeric::Other(_) => None,
        }
    }
}

fn numeric_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, Numeric>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|(name, value)| value.as_f64().map(|v| (name, v)))
        .collect())
}

pub fn decode_inbound(text: &str) -> Result<InboundMessage, ProtocolError> {
    serde_json::from_str(text).map_err(ProtocolError::Decode)
}

pub fn encode_outbound(message: &OutboundMessage) -> Result<String, ProtocolError> {
    serde_json::to_string(message).map_err(ProtocolError::Encode)
}
