//! Process-level error type.
//!
//! Every failure carries the exit code the binary should terminate with:
//!
//! - 2: usage / file-access problems (bad flags, missing files)
//! - 3: invalid input data (shape mismatch, non-finite values, bad target size)
//! - 4: internal compute failures

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

    /// CLI/usage or file-access problem (exit code 2).
    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(2, message)
    }

    /// Invalid input data (exit code 3).
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(3, message)
    }

    /// Internal compute failure (exit code 4).
    pub fn compute(message: impl Into<String>) -> Self {
        Self::new(4, message)
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
