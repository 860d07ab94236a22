use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}: '{value}'")]
    Parse { line: usize, value: String },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Insufficient primes: need {needed}, have {available}")]
    InsufficientPrimes { needed: usize, available: usize },

    #[error("Input not strictly ascending at line {line}")]
    UnsortedInput { line: usize },

    #[error("Config error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl CoreError {
    /// True when re-running with a larger prime source could succeed.
    pub fn is_capacity(&self) -> bool {
        matches!(self, CoreError::InsufficientPrimes { .. })
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
