//! Trace events
//!
//! Every component reports progress and validation findings as [`TraceMessage`] values
//! handed synchronously to a trace sink, a plain `FnMut(&TraceMessage)` callback. Messages
//! are never buffered by the engine. Each message is mirrored to `tracing` as well.

use serde::{Deserialize, Serialize};

/// Severity of a trace event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Progress information
    Diagnostic,
    /// A problem with the model being built
    BuildError,
}

/// Category of a build error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildError {
    /// A feature of the document is not supported and was dropped
    NotSupportedFeature,
    /// A referenced node has no definition
    NodeIdNotDefined,
    /// The same NodeId is defined more than once
    NodeIdDuplicated,
    /// The subtype hierarchy loops back onto itself
    CircularReference,
    /// A type has more than one direct supertype
    TooManySubtypes,
    /// A node could not be imported
    NodeImportFailed,
    NonCategorized,
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Single trace event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceMessage {
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_error: Option<BuildError>,
    pub message: String,
}

impl TraceMessage {
    pub fn diagnostic(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Diagnostic,
            build_error: None,
            message: message.into(),
        }
    }

    pub fn build_error(kind: BuildError, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::BuildError,
            build_error: Some(kind),
            message: message.into(),
        }
    }

    pub fn is_build_error(&self) -> bool {
        self.severity == Severity::BuildError
    }
}

impl std::fmt::Display for TraceMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.build_error {
            Some(kind) => write!(f, "[{kind}] {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Failure of one node in a batch operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeFault {
    pub node_id: String,
    pub message: String,
}

impl NodeFault {
    pub fn new(node_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for NodeFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.node_id, self.message)
    }
}

/// Trace sink callback
pub type TraceSink = Box<dyn FnMut(&TraceMessage)>;

/// Sink that only mirrors events to `tracing`
pub fn tracing_sink() -> TraceSink {
    Box::new(|_| {})
}

/// Mirror `message` to `tracing` and hand it to `sink`
pub(crate) fn emit(sink: &mut dyn FnMut(&TraceMessage), message: TraceMessage) {
    match message.build_error {
        Some(kind) => tracing::warn!(kind = %kind, "{}", message.message),
        None => tracing::debug!("{}", message.message),
    }
    sink(&message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_reaches_sink() {
        let mut received = Vec::new();
        {
            let mut sink = |message: &TraceMessage| received.push(message.clone());
            emit(&mut sink, TraceMessage::diagnostic("starting"));
            emit(
                &mut sink,
                TraceMessage::build_error(BuildError::NodeIdNotDefined, "ns=1;i=7"),
            );
        }
        assert_eq!(received.len(), 2);
        assert!(!received[0].is_build_error());
        assert_eq!(received[1].build_error, Some(BuildError::NodeIdNotDefined));
        assert_eq!(received[1].to_string(), "[NodeIdNotDefined] ns=1;i=7");
    }
}
