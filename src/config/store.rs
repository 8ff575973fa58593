use serde::{Deserialize, Serialize};

use crate::project::ProjectRecord;

/// Every project record, persisted as `projects.toml`. Project numbers are
/// unique within the store.
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct Store {
    #[serde(default)]
    pub projects: Vec<ProjectRecord>,
}

impl Store {
    pub fn find(&self, project_no: &str) -> Option<&ProjectRecord> {
        self.projects.iter().find(|p| p.project_no == project_no)
    }

    pub fn position(&self, project_no: &str) -> Option<usize> {
        self.projects.iter().position(|p| p.project_no == project_no)
    }

    pub fn contains(&self, project_no: &str) -> bool {
        self.position(project_no).is_some()
    }
}
