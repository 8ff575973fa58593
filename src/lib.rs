pub mod config;
pub mod error;
pub mod project;
pub mod report;

pub use config::{Config, Role, Store};
pub use error::{LedgerError, Result};
pub use project::{derive, preview, LedgerInputs, ProjectInput, ProjectRecord, ProjectService};
pub use report::{export_xlsx, ReportRow, ReportTotals};
