//! Application-level error type.
//!
//! Pipeline stages report failures as an [`AppError`] carrying the process
//! exit code and a human-readable message. Exit-code conventions:
//!
//! - `2` — I/O and schema problems: unreadable or malformed dataset CSV,
//!   chart/export write failures
//! - `3` — the required primary dataset is missing or empty
//! - `4` — a fit-stage failure escalated by a caller that required the fit

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
