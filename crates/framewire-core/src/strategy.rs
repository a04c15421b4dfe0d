use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::WireError;

const MEBIBYTE: usize = 1024 * 1024;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Strategy {
    #[serde(rename = "base64")]
    TextEnvelope,
    #[serde(rename = "binary")]
    RawBinary,
    #[serde(rename = "matrix")]
    StructuredMatrix,
    #[serde(rename = "stream")]
    FragmentedStream,
}

impl Strategy {
    pub fn all() -> [Strategy; 4] {
        [
            Strategy::TextEnvelope,
            Strategy::RawBinary,
            Strategy::StructuredMatrix,
            Strategy::FragmentedStream,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::TextEnvelope => "base64",
            Strategy::RawBinary => "binary",
            Strategy::StructuredMatrix => "matrix",
            Strategy::FragmentedStream => "stream",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Strategy::TextEnvelope => "Base64",
            Strategy::RawBinary => "Binary",
            Strategy::StructuredMatrix => "Matrix",
            Strategy::FragmentedStream => "Stream",
        }
    }

    pub fn port(&self) -> u16 {
        match self {
            Strategy::TextEnvelope => 8765,
            Strategy::RawBinary => 8766,
            Strategy::StructuredMatrix => 8767,
            Strategy::FragmentedStream => 8768,
        }
    }

    pub fn summary_header(&self) -> String {
        format!("Benchmark {} Summary:", self.title())
    }

    /// Whether the server side of this strategy expects binary messages.
    pub fn expects_binary(&self) -> bool {
        matches!(self, Strategy::RawBinary | Strategy::FragmentedStream)
    }

    pub fn default_transport_ceiling(&self) -> usize {
        match self {
            Strategy::StructuredMatrix => 2 * MEBIBYTE,
            _ => MEBIBYTE,
        }
    }
}

impl Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = WireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "base64" | "text-envelope" => Ok(Strategy::TextEnvelope),
            "binary" | "raw-binary" => Ok(Strategy::RawBinary),
            "matrix" | "structured-matrix" => Ok(Strategy::StructuredMatrix),
            "stream" | "fragmented-stream" => Ok(Strategy::FragmentedStream),
            _ => Err(WireError::UnknownStrategy(s.to_string())),
        }
    }
}
