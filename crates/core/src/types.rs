//! Gemeinsame Identifikationstypen fuer Papervault
//!
//! Der Organisationsschluessel verwendet das Newtype-Pattern, damit er nicht
//! mit beliebigen Strings (Benutzername, Rolle, URL) verwechselt wird.

use serde::{Deserialize, Serialize};

/// Organisationsschluessel (Fachbereich) eines Benutzers
///
/// Bestimmt, welcher Backend-Knoten einen Benutzer bedient.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrgKey(pub String);

impl OrgKey {
    /// Schluessel wie vom Knoten geliefert, ohne Normalisierung
    pub fn neu(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Rohform
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Leerer Schluessel = Benutzer ohne Fachbereich
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Display for OrgKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OrgKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Rolle eines angemeldeten Benutzers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Lehrkraft (reicht Pruefungen ein)
    Teacher,
    /// Fachbereichs-Administrator
    DeptAdmin,
    /// Fakultaets-Administrator
    CollegeAdmin,
    /// Vom Knoten gelieferte, hier unbekannte Rolle
    #[serde(untagged)]
    Other(String),
}

impl Role {
    /// `true` fuer beide Administrator-Rollen
    pub fn ist_admin(&self) -> bool {
        matches!(self, Role::DeptAdmin | Role::CollegeAdmin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Teacher => write!(f, "teacher"),
            Role::DeptAdmin => write!(f, "dept_admin"),
            Role::CollegeAdmin => write!(f, "college_admin"),
            Role::Other(s) => write!(f, "{s}"),
        }
    }
}

/// Profil des angemeldeten Benutzers (`userInfo` der Login-Antwort)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub real_name: String,
    pub role: Role,
    /// Organisationsschluessel; auf dem Draht heisst das Feld `department`
    #[serde(rename = "department", default)]
    pub org_key: OrgKey,
}
