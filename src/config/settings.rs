use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub company: Company,
    pub user: UserSettings,
    pub report: ReportSettings,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Company {
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// The acting user. Authentication happens elsewhere; only the role gate
/// is enforced here.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct UserSettings {
    pub name: String,
    #[serde(default)]
    pub role: Role,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    pub fn is_admin(self) -> bool {
        self == Role::Admin
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::User => write!(f, "user"),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ReportSettings {
    pub title: String,
    pub currency_symbol: String,
    pub output_dir: String,
}
