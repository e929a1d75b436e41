#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Network failure or non-2xx while reading from the backend.
    FetchFailed(String),
    /// Non-2xx or network failure on update/delete. Carries the backend message when it sent one.
    MutationRejected(String),
    /// 2xx response whose body did not decode.
    MalformedResponse(String),
    /// No bearer token available from the session.
    AuthMissing,
    InvalidQuery(&'static str),
}

impl EngineError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::FetchFailed(_) => "fetch_failed",
            EngineError::MutationRejected(_) => "mutation_rejected",
            EngineError::MalformedResponse(_) => "malformed_response",
            EngineError::AuthMissing => "auth_missing",
            EngineError::InvalidQuery(_) => "invalid_query",
        }
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::FetchFailed(msg) => f.write_str(msg),
            EngineError::MutationRejected(msg) => f.write_str(msg),
            EngineError::MalformedResponse(msg) => write!(f, "malformed response: {msg}"),
            EngineError::AuthMissing => write!(f, "not signed in: no access token in session"),
            EngineError::InvalidQuery(msg) => write!(f, "invalid query: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}
