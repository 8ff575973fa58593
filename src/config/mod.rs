mod settings;
mod store;

pub use settings::{Company, Config, ReportSettings, Role, UserSettings};
pub use store::Store;

use crate::error::{LedgerError, Result};
use directories::ProjectDirs;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path (~/.ledger/)
pub fn config_dir() -> Result<PathBuf> {
    // First try XDG-style directories
    if let Some(proj_dirs) = ProjectDirs::from("", "", "ledger") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    // Fallback to ~/.ledger/
    let home = dirs_home().ok_or_else(|| {
        LedgerError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".ledger"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Expand ~ in paths
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_home() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Resolve the report output directory; relative paths are taken from the
/// config directory.
pub fn resolve_output_dir(output_dir: &str, cfg_dir: &Path) -> PathBuf {
    let path = expand_path(output_dir);
    if path.is_absolute() {
        path
    } else {
        cfg_dir.join(path)
    }
}

/// Fail early when `ledger init` has not been run.
pub fn ensure_initialized(cfg_dir: &Path) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(LedgerError::ConfigNotFound(cfg_dir.to_path_buf()));
    }
    Ok(())
}

/// Load the main config.toml
pub fn load_config(cfg_dir: &Path) -> Result<Config> {
    let path = cfg_dir.join("config.toml");
    if !path.exists() {
        return Err(LedgerError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| LedgerError::ConfigParse { path, source: e })
}

/// Load projects.toml (empty store if missing)
pub fn load_store(cfg_dir: &Path) -> Result<Store> {
    let path = cfg_dir.join("projects.toml");
    if !path.exists() {
        return Ok(Store::default());
    }
    let content = fs::read_to_string(&path)?;
    let store: Store =
        toml::from_str(&content).map_err(|e| LedgerError::ConfigParse { path, source: e })?;
    debug!("Loaded {} projects", store.projects.len());
    Ok(store)
}

/// Save projects.toml, replacing the whole file.
pub fn save_store(cfg_dir: &Path, store: &Store) -> Result<()> {
    let path = cfg_dir.join("projects.toml");
    let content = toml::to_string_pretty(store)?;
    // Write to a sibling file first so a failed write never truncates the store.
    let tmp = cfg_dir.join("projects.toml.tmp");
    fs::write(&tmp, content)?;
    fs::rename(&tmp, &path)?;
    debug!("Saved {} projects to {}", store.projects.len(), path.display());
    Ok(())
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"[company]
name = "TWL Trading"
# address = "12 Harbour Road, Colombo"   # optional
# email = "accounts@example.com"         # optional

[user]
name = "admin"
role = "admin"   # "admin" may create, update and delete; "user" is read-only

[report]
title = "TWL SYSTEM - COMPREHENSIVE PROJECTS REPORT"
currency_symbol = "$"
output_dir = "output"   # relative to this directory, or an absolute / ~/ path
"#;

/// Template content for a new project input file
pub const PROJECT_TEMPLATE: &str = r#"# Project input. Amounts may be numbers or numeric strings; anything else
# counts as 0. Derived figures (totals, balances, profit) are always computed
# and any values given for them here are ignored.
#
#   ledger add --file project.toml

project_name = "Rice import"
project_no = "TWL-2026-001"
project_date = "2026-01-15"

[supplier.proforma_invoice]
supplier_name = "Acme Mills"
invoice_number = "PI-778"
invoice_amount = 1000
credit_note = 100

[supplier.advance_payment]
loan_amount = 500
twl_contribution = 100
# payment_date = "2026-01-20"
# reference = "TT-1001"

[supplier.balance_payment]
amount = 300
twl_contribution = 0

[buyer.proforma_invoice]
buyer_name = "Harbour Foods"
invoice_no = "B-55"
invoice_amount = 1200

[buyer.advance_payment]
amount = 600

[buyer.balance_payment]
amount = 500
twl_contribution = 0

[costing]
supplier_invoice_amount = 1000
twl_invoice_amount = 1200
notes = ""

[costing.expenses]
in_going = 0
out_going = 0
cal_charges = 0
other = 0
foreign_bank_charges = 0
loan_interest = 0
freight_charges = 0
"#;
