pub mod payment;

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two external payment processors a payment can be sent to.
///
/// This names a backend for an outbound call. For the terminal outcome that
/// gets persisted (which adds `error`), see [`ProcessorLabel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessorKind {
    Default,
    Fallback,
}

impl ProcessorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProcessorKind::Default => "default",
            ProcessorKind::Fallback => "fallback",
        }
    }
}

impl fmt::Display for ProcessorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal routing outcome recorded for accounting.
///
/// `Error` marks a payment both processors turned down: no money moved, but
/// the attempt is kept on record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessorLabel {
    Default,
    Fallback,
    Error,
}

impl ProcessorLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            ProcessorLabel::Default => "default",
            ProcessorLabel::Fallback => "fallback",
            ProcessorLabel::Error => "error",
        }
    }
}

impl fmt::Display for ProcessorLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ProcessorKind> for ProcessorLabel {
    fn from(kind: ProcessorKind) -> Self {
        match kind {
            ProcessorKind::Default => ProcessorLabel::Default,
            ProcessorKind::Fallback => ProcessorLabel::Fallback,
        }
    }
}
