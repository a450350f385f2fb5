use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::id_from_number_or_string;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Employee,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Employee => "employee",
        }
    }

    /// Landing page for the role.
    pub fn dashboard_path(self) -> &'static str {
        match self {
            Role::Admin => "/admin",
            Role::Manager => "/manager",
            Role::Employee => "/employee",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "employee" => Ok(Role::Employee),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// A user record as returned by `GET /users/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "id_from_number_or_string")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub manager: Option<serde_json::Value>,
}

impl User {
    pub fn display_name(&self) -> String {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or_else(|| self.username.as_deref().filter(|n| !n.is_empty()))
            .unwrap_or(&self.id)
            .to_string()
    }

    pub fn is_manager(&self) -> bool {
        self.role
            .as_deref()
            .map(|r| r.eq_ignore_ascii_case("manager"))
            .unwrap_or(false)
    }
}

/// One `<option>` in a user dropdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserOption {
    pub id: String,
    pub label: String,
}

impl From<&User> for UserOption {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            label: user.display_name(),
        }
    }
}

/// Credential check used by the login screen.
pub trait Authenticator: Send + Sync {
    fn authenticate(&self, email: &str, password: &str) -> Option<Role>;
}

/// Fixed demo accounts; there is no credential service behind the front.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockDirectory;

const DEMO_ACCOUNTS: [(&str, &str, Role); 3] = [
    ("admin@example.com", "admin123", Role::Admin),
    ("manager@example.com", "manager123", Role::Manager),
    ("employee@example.com", "employee123", Role::Employee),
];

impl Authenticator for MockDirectory {
    fn authenticate(&self, email: &str, password: &str) -> Option<Role> {
        DEMO_ACCOUNTS
            .iter()
            .find(|(e, p, _)| *e == email && *p == password)
            .map(|(_, _, role)| *role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_accounts_map_to_roles() {
        let dir = MockDirectory;
        assert_eq!(dir.authenticate("admin@example.com", "admin123"), Some(Role::Admin));
        assert_eq!(dir.authenticate("manager@example.com", "manager123"), Some(Role::Manager));
        assert_eq!(dir.authenticate("employee@example.com", "employee123"), Some(Role::Employee));
        assert_eq!(dir.authenticate("admin@example.com", "manager123"), None);
    }

    #[test]
    fn user_ids_accept_numbers_and_strings() {
        let users: Vec<User> = serde_json::from_str(
            r#"[{"id": 7, "username": "marc", "role": "Manager"}, {"id": "u-2", "name": "Dana"}]"#,
        )
        .unwrap();
        assert_eq!(users[0].id, "7");
        assert_eq!(users[0].display_name(), "marc");
        assert!(users[0].is_manager());
        assert_eq!(users[1].id, "u-2");
        assert_eq!(users[1].display_name(), "Dana");
        assert!(!users[1].is_manager());
    }

    #[test]
    fn role_parsing_ignores_case() {
        assert_eq!("Manager".parse::<Role>(), Ok(Role::Manager));
        assert!("owner".parse::<Role>().is_err());
        assert_eq!(Role::Employee.dashboard_path(), "/employee");
    }
}
