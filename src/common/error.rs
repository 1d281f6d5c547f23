//! Error handling primitives shared across the core.
//!
//! Every core operation returns [`LensResult`]; the boundary turns a
//! [`LensError`] into an `{error}` payload plus an HTTP-style status.

/// Stable error codes that cross the FFI boundary.
#[repr(u32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LensCode {
    /// Success code used as a sentinel.
    Ok = 0,
    /// No dataset stored for the session.
    NotFound = 1,
    /// Upload or request body could not be parsed.
    MalformedInput = 2,
    /// Target column absent or not numeric.
    InvalidTarget = 3,
    /// Degenerate split or feature set.
    InsufficientData = 4,
    /// Catch-all for numeric faults and bugs.
    Internal = 5,
}

/// Canonical error type for the core.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum LensError {
    #[error("{0}")]
    NotFound(String),

    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("invalid target: {0}")]
    InvalidTarget(String),

    #[error("insufficient data: {0}")]
    InsufficientData(String),

    #[error("internal failure: {0}")]
    Internal(String),
}

/// Result alias used throughout the crate.
pub type LensResult<T> = Result<T, LensError>;

impl LensError {
    /// "No data found" for the given session.
    pub fn no_dataset(session: &str) -> Self {
        Self::NotFound(format!("No data found for session '{session}'"))
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedInput(msg.into())
    }

    pub fn invalid_target(msg: impl Into<String>) -> Self {
        Self::InvalidTarget(msg.into())
    }

    pub fn insufficient(msg: impl Into<String>) -> Self {
        Self::InsufficientData(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Lock poisoning is only possible after a panic in another request.
    pub fn poisoned() -> Self {
        Self::internal("session store lock poisoned")
    }

    /// Machine parsable error code.
    pub fn code(&self) -> LensCode {
        match self {
            LensError::NotFound(_) => LensCode::NotFound,
            LensError::MalformedInput(_) => LensCode::MalformedInput,
            LensError::InvalidTarget(_) => LensCode::InvalidTarget,
            LensError::InsufficientData(_) => LensCode::InsufficientData,
            LensError::Internal(_) => LensCode::Internal,
        }
    }

    /// HTTP-equivalent status: 4xx for caller mistakes, 5xx for internal faults.
    pub fn status(&self) -> u16 {
        match self {
            LensError::NotFound(_) => 404,
            LensError::MalformedInput(_) | LensError::InvalidTarget(_) => 400,
            LensError::InsufficientData(_) => 422,
            LensError::Internal(_) => 500,
        }
    }
}

impl From<csv::Error> for LensError {
    fn from(err: csv::Error) -> Self {
        LensError::MalformedInput(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(LensCode::Ok as u32, 0);
        assert_eq!(LensCode::NotFound as u32, 1);
        assert_eq!(LensCode::MalformedInput as u32, 2);
        assert_eq!(LensCode::InvalidTarget as u32, 3);
        assert_eq!(LensCode::InsufficientData as u32, 4);
        assert_eq!(LensCode::Internal as u32, 5);
    }

    #[test]
    fn caller_mistakes_map_to_4xx() {
        assert_eq!(LensError::no_dataset("s").status(), 404);
        assert_eq!(LensError::malformed("x").status(), 400);
        assert_eq!(LensError::invalid_target("x").status(), 400);
        assert_eq!(LensError::insufficient("x").status(), 422);
        assert_eq!(LensError::internal("x").status(), 500);
    }

    #[test]
    fn not_found_message_names_the_session() {
        let err = LensError::no_dataset("12345");
        assert_eq!(err.code(), LensCode::NotFound);
        assert_eq!(err.to_string(), "No data found for session '12345'");
    }
}
