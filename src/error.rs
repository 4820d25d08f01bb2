use std::path::PathBuf;

use thiserror::Error;

/// Process-level error: a message plus the exit code `covid` terminates with.
///
/// Exit codes:
/// - 2: input/data problems (missing checkout, malformed CSV)
/// - 3: not enough data for a computation (e.g. regression overlay)
/// - 4: rendering, terminal, or output problems
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

/// Errors raised while locating and parsing the CSSE time-series files.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("Failed to find {what}. Expected here: {}", path.display())]
    DataSourceNotFound { what: &'static str, path: PathBuf },

    #[error("Malformed date column '{column}' in {file} (expected M/D/YY)")]
    MalformedDate { file: String, column: String },

    #[error("Malformed count '{value}' in {file} line {line}, column '{column}'")]
    MalformedValue {
        file: String,
        line: usize,
        column: String,
        value: String,
    },

    #[error("No country/region column in {file}")]
    MissingCountryColumn { file: String },

    #[error("Failed to parse CSV {file}: {source}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<DataError> for AppError {
    fn from(err: DataError) -> Self {
        AppError::new(2, err.to_string())
    }
}
