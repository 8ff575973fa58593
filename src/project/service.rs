use chrono::Utc;
use log::{info, warn};
use std::path::{Path, PathBuf};

use super::input::ProjectInput;
use super::record::{Identity, ProjectRecord, RecordMeta};
use crate::config::{load_store, save_store, Role};
use crate::error::{LedgerError, Result};

/// Create, update, delete and read projects in the store under `cfg_dir`.
///
/// The calculator runs before every write, so what lands in `projects.toml`
/// is always fully derived from the merged raw fields.
pub struct ProjectService {
    cfg_dir: PathBuf,
    user: String,
    role: Role,
}

impl ProjectService {
    pub fn new(cfg_dir: &Path, user: impl Into<String>, role: Role) -> Self {
        Self {
            cfg_dir: cfg_dir.to_path_buf(),
            user: user.into(),
            role,
        }
    }

    /// Create a new project
    pub fn create(&self, input: ProjectInput) -> Result<ProjectRecord> {
        self.require_admin()?;
        let identity = validate_identity(&input)?;
        info!("Creating project: {}", identity.project_no);

        let mut store = load_store(&self.cfg_dir)?;
        if store.contains(&identity.project_no) {
            warn!("Duplicate project number: {}", identity.project_no);
            return Err(LedgerError::DuplicateProjectNo(identity.project_no));
        }

        let now = Utc::now();
        let record = ProjectRecord::build(
            identity,
            &input,
            RecordMeta {
                created_by: Some(self.user.clone()),
                created_at: now,
                updated_at: now,
            },
        );

        store.projects.push(record.clone());
        save_store(&self.cfg_dir, &store)?;

        info!(
            "Created project: {} (net profit {})",
            record.project_no, record.costing.net_profit
        );
        Ok(record)
    }

    /// Apply a partial update. The patch is merged onto the stored record's
    /// raw fields before anything is recomputed.
    pub fn update(&self, project_no: &str, patch: ProjectInput) -> Result<ProjectRecord> {
        self.require_admin()?;
        info!("Updating project: {}", project_no);

        let mut store = load_store(&self.cfg_dir)?;
        let idx = store
            .position(project_no)
            .ok_or_else(|| LedgerError::ProjectNotFound(project_no.to_string()))?;

        if let Some(requested) = patch.project_no.as_deref() {
            if requested.trim() != project_no {
                return Err(LedgerError::ProjectNoImmutable {
                    stored: project_no.to_string(),
                    requested: requested.to_string(),
                });
            }
        }

        let existing = &store.projects[idx];
        let meta = RecordMeta {
            created_by: existing.created_by.clone(),
            created_at: existing.created_at,
            updated_at: Utc::now(),
        };

        let mut merged = existing.to_input();
        merged.merge(patch);
        let identity = validate_identity(&merged)?;

        let record = ProjectRecord::build(identity, &merged, meta);
        store.projects[idx] = record.clone();
        save_store(&self.cfg_dir, &store)?;

        info!("Updated project: {}", record.project_no);
        Ok(record)
    }

    /// Delete a project
    pub fn delete(&self, project_no: &str) -> Result<ProjectRecord> {
        self.require_admin()?;
        info!("Deleting project: {}", project_no);

        let mut store = load_store(&self.cfg_dir)?;
        let idx = store
            .position(project_no)
            .ok_or_else(|| LedgerError::ProjectNotFound(project_no.to_string()))?;

        let removed = store.projects.remove(idx);
        save_store(&self.cfg_dir, &store)?;

        info!("Deleted project: {}", project_no);
        Ok(removed)
    }

    /// Get a project by number
    pub fn get(&self, project_no: &str) -> Result<ProjectRecord> {
        let store = load_store(&self.cfg_dir)?;
        store.find(project_no).cloned().ok_or_else(|| {
            warn!("Project not found: {}", project_no);
            LedgerError::ProjectNotFound(project_no.to_string())
        })
    }

    /// All projects, newest project date first.
    pub fn list(&self) -> Result<Vec<ProjectRecord>> {
        let store = load_store(&self.cfg_dir)?;
        let mut projects = store.projects;
        projects.sort_by(|a, b| {
            b.project_date
                .cmp(&a.project_date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        info!("Found {} projects", projects.len());
        Ok(projects)
    }

    fn require_admin(&self) -> Result<()> {
        if self.role.is_admin() {
            Ok(())
        } else {
            warn!("Denied write for user '{}' with role {}", self.user, self.role);
            Err(LedgerError::AccessDenied)
        }
    }
}

/// Compute a record from input without identity checks or persistence, for
/// previewing figures while a project is still being entered.
pub fn preview(input: &ProjectInput) -> ProjectRecord {
    let now = Utc::now();
    let identity = Identity {
        project_name: input.project_name.clone().unwrap_or_default(),
        project_no: input.project_no.clone().unwrap_or_default(),
        project_date: input.project_date.unwrap_or_else(|| now.date_naive()),
    };
    ProjectRecord::build(
        identity,
        input,
        RecordMeta {
            created_by: None,
            created_at: now,
            updated_at: now,
        },
    )
}

fn required_text(value: &Option<String>, field: &'static str) -> Result<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(LedgerError::MissingField(field))
}

fn validate_identity(input: &ProjectInput) -> Result<Identity> {
    Ok(Identity {
        project_name: required_text(&input.project_name, "Project name")?,
        project_no: required_text(&input.project_no, "Project number")?,
        project_date: input
            .project_date
            .ok_or(LedgerError::MissingField("Project date"))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_store;
    use rust_decimal::Decimal;
    use tempfile::TempDir;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn input(pairs: &[&str]) -> ProjectInput {
        let owned: Vec<String> = pairs.iter().map(|s| s.to_string()).collect();
        ProjectInput::from_assignments(&owned).unwrap()
    }

    fn base_input(project_no: &str) -> ProjectInput {
        input(&[
            "project_name=Rice import",
            &format!("project_no={project_no}"),
            "project_date=2026-01-15",
            "supplier.proforma_invoice.invoice_amount=1000",
            "supplier.proforma_invoice.credit_note=100",
            "supplier.advance_payment.loan_amount=500",
            "supplier.advance_payment.twl_contribution=100",
            "supplier.balance_payment.amount=300",
        ])
    }

    fn admin(dir: &TempDir) -> ProjectService {
        ProjectService::new(dir.path(), "admin", Role::Admin)
    }

    #[test]
    fn create_computes_and_persists() {
        let dir = TempDir::new().unwrap();
        let record = admin(&dir).create(base_input("TWL-001")).unwrap();

        assert_eq!(record.supplier.summary.total_amount, dec("900"));
        assert_eq!(record.supplier.summary.cancel_amount, dec("-800"));
        assert_eq!(record.created_by.as_deref(), Some("admin"));

        let store = load_store(dir.path()).unwrap();
        assert_eq!(store.projects, vec![record]);
    }

    #[test]
    fn duplicate_project_number_is_rejected_and_first_kept() {
        let dir = TempDir::new().unwrap();
        let service = admin(&dir);
        let first = service.create(base_input("TWL-001")).unwrap();

        let mut second = base_input("TWL-001");
        second.project_name = Some("Another".into());
        let err = service.create(second).unwrap_err();
        assert!(matches!(err, LedgerError::DuplicateProjectNo(ref no) if no == "TWL-001"));

        assert_eq!(service.get("TWL-001").unwrap(), first);
        assert_eq!(service.list().unwrap().len(), 1);
    }

    #[test]
    fn missing_identity_fields_fail_validation() {
        let dir = TempDir::new().unwrap();
        let service = admin(&dir);

        let err = service
            .create(input(&["project_no=X", "project_date=2026-01-01"]))
            .unwrap_err();
        assert!(matches!(err, LedgerError::MissingField("Project name")));

        let err = service
            .create(input(&["project_name=  ", "project_no=X", "project_date=2026-01-01"]))
            .unwrap_err();
        assert!(matches!(err, LedgerError::MissingField("Project name")));

        let err = service
            .create(input(&["project_name=A", "project_no=X"]))
            .unwrap_err();
        assert!(matches!(err, LedgerError::MissingField("Project date")));
    }

    #[test]
    fn partial_update_merges_against_stored_record() {
        let dir = TempDir::new().unwrap();
        let service = admin(&dir);
        let created = service.create(base_input("TWL-001")).unwrap();

        let updated = service
            .update("TWL-001", input(&["supplier.advance_payment.loan_amount=700"]))
            .unwrap();

        // twl_contribution was not resent but still counts
        assert_eq!(updated.supplier.advance_payment.twl_contribution, dec("100"));
        assert_eq!(updated.supplier.advance_payment.total_payment, dec("800"));
        assert_eq!(updated.supplier.advance_payment.balance_amount, dec("100"));
        assert_eq!(updated.supplier.summary.total_amount, dec("1100"));
        assert_eq!(updated.project_name, "Rice import");
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[test]
    fn project_number_is_immutable() {
        let dir = TempDir::new().unwrap();
        let service = admin(&dir);
        service.create(base_input("TWL-001")).unwrap();

        let err = service
            .update("TWL-001", input(&["project_no=TWL-002"]))
            .unwrap_err();
        assert!(matches!(err, LedgerError::ProjectNoImmutable { .. }));

        // Resending the same number is harmless
        service
            .update("TWL-001", input(&["project_no=TWL-001"]))
            .unwrap();
    }

    #[test]
    fn update_and_delete_unknown_project() {
        let dir = TempDir::new().unwrap();
        let service = admin(&dir);

        let err = service.update("NOPE", ProjectInput::default()).unwrap_err();
        assert!(matches!(err, LedgerError::ProjectNotFound(_)));
        let err = service.delete("NOPE").unwrap_err();
        assert!(matches!(err, LedgerError::ProjectNotFound(_)));
    }

    #[test]
    fn delete_removes_record() {
        let dir = TempDir::new().unwrap();
        let service = admin(&dir);
        service.create(base_input("TWL-001")).unwrap();
        service.create(base_input("TWL-002")).unwrap();

        service.delete("TWL-001").unwrap();
        let remaining: Vec<_> = service
            .list()
            .unwrap()
            .into_iter()
            .map(|p| p.project_no)
            .collect();
        assert_eq!(remaining, vec!["TWL-002".to_string()]);
    }

    #[test]
    fn non_admin_cannot_write_but_can_read() {
        let dir = TempDir::new().unwrap();
        admin(&dir).create(base_input("TWL-001")).unwrap();

        let viewer = ProjectService::new(dir.path(), "clerk", Role::User);
        assert!(matches!(
            viewer.create(base_input("TWL-002")),
            Err(LedgerError::AccessDenied)
        ));
        assert!(matches!(
            viewer.update("TWL-001", ProjectInput::default()),
            Err(LedgerError::AccessDenied)
        ));
        assert!(matches!(viewer.delete("TWL-001"), Err(LedgerError::AccessDenied)));
        assert!(viewer.get("TWL-001").is_ok());
    }

    #[test]
    fn list_orders_by_project_date_descending() {
        let dir = TempDir::new().unwrap();
        let service = admin(&dir);
        let mut older = base_input("OLD");
        older.project_date = chrono::NaiveDate::from_ymd_opt(2025, 6, 1);
        service.create(older).unwrap();
        service.create(base_input("NEW")).unwrap();

        let order: Vec<_> = service
            .list()
            .unwrap()
            .into_iter()
            .map(|p| p.project_no)
            .collect();
        assert_eq!(order, vec!["NEW".to_string(), "OLD".to_string()]);
    }

    #[test]
    fn preview_does_not_require_identity() {
        let record = preview(&input(&["buyer.advance_payment.amount=250"]));
        assert_eq!(record.buyer.payment_total, dec("250"));
        assert_eq!(record.costing.profit_percentage, "0");
    }

    #[test]
    fn preview_survives_extreme_amounts() {
        let tiny = preview(&input(&[
            "supplier.advance_payment.loan_amount=0.0000000000000000000000000001",
            "buyer.advance_payment.amount=1",
        ]));
        assert_eq!(tiny.supplier.payment_total, Decimal::ZERO);
        assert_eq!(tiny.costing.profit_percentage, "0");

        let huge = preview(&input(&[
            "supplier.advance_payment.loan_amount=79228162514264337593543950335",
            "supplier.advance_payment.twl_contribution=1",
        ]));
        assert_eq!(huge.supplier.advance_payment.loan_amount, Decimal::ZERO);
        assert_eq!(huge.supplier.advance_payment.total_payment, dec("1"));
        assert_eq!(huge.costing.profit_percentage, "-100.00");
    }
}
