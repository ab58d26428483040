/// Failure category for a pipeline error.
///
/// Kinds map 1:1 onto the places a per-indicator pipeline can fail. The
/// orchestrator uses the kind for reporting only, never for control flow:
/// every kind is handled the same way (the indicator gets an error record).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or empty credential / unusable configuration.
    Configuration,
    /// Transport failure or non-2xx HTTP response.
    Network,
    /// Payload not parseable as CSV or spreadsheet.
    Parse,
    /// Tabular extractor could not infer a numeric value column.
    NoNumericColumn,
    /// Derivation engine given an unrecognized transform name.
    UnknownTransform,
    /// Malformed data that could not be recovered by dropping rows.
    Validation,
}

impl ErrorKind {
    /// Process exit code when this kind escapes to the binary boundary
    /// (e.g. the configuration file itself is unreadable).
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::Configuration => 2,
            ErrorKind::Parse | ErrorKind::NoNumericColumn | ErrorKind::Validation => 3,
            ErrorKind::Network => 4,
            ErrorKind::UnknownTransform => 5,
        }
    }
}

#[derive(Clone)]
pub struct PipelineError {
    kind: ErrorKind,
    message: String,
}

impl PipelineError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn exit_code(&self) -> u8 {
        self.kind.exit_code()
    }
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for PipelineError {}
