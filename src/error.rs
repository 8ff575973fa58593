use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Config directory not found at {0}. Run 'ledger init' to create it.")]
    ConfigNotFound(PathBuf),

    #[error("Config file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config directory already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to write project store: {0}")]
    StoreWrite(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read project input {path}: {reason}")]
    InputParse { path: PathBuf, reason: String },

    #[error("Invalid assignment '{0}'. Expected 'path=value' (e.g., 'supplier.advance_payment.loan_amount=500')")]
    InvalidAssignment(String),

    #[error("Invalid project fields: {0}")]
    InvalidFields(String),

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Project number '{0}' already exists")]
    DuplicateProjectNo(String),

    #[error("Project '{0}' not found")]
    ProjectNotFound(String),

    #[error("Project number is fixed at creation (stored '{stored}', got '{requested}')")]
    ProjectNoImmutable { stored: String, requested: String },

    #[error("Access denied. Admin only.")]
    AccessDenied,

    #[error("Failed to write spreadsheet: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
