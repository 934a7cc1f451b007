use crate::data::RetrievalError;

/// Exit code for usage and configuration problems.
pub const EXIT_CONFIG: u8 = 2;
/// Exit code for retrieval and data failures.
pub const EXIT_DATA: u8 = 4;
/// Exit code for terminal (TUI) failures.
pub const EXIT_TERMINAL: u8 = 5;

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

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(EXIT_CONFIG, message)
    }

    pub fn terminal(message: impl Into<String>) -> Self {
        Self::new(EXIT_TERMINAL, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<RetrievalError> for AppError {
    fn from(err: RetrievalError) -> Self {
        Self::new(EXIT_DATA, err.to_string())
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
