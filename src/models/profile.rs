//! Profile model

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Access level of a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Member,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Member => "member",
            Role::Admin => "admin",
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
        match s.trim() {
            "member" => Ok(Role::Member),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub preferred_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub major: Option<String>,
    #[serde(default)]
    pub graduation_year: Option<i32>,
    #[serde(default)]
    pub instrument: Option<String>,
    #[serde(default)]
    pub role: Role,
}

impl Profile {
    /// Preferred name, falling back to the first name
    pub fn display_name(&self) -> Option<&str> {
        self.preferred_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .or(self.first_name.as_deref())
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Fields a member may change on their own profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    pub preferred_name: String,
    pub major: String,
    pub graduation_year: i32,
}

/// Role change issued by an admin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing() {
        assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
        assert_eq!(" member ".parse::<Role>(), Ok(Role::Member));
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn test_profile_defaults_to_member() {
        let json = r#"{"id": "7f0c2b1e-8a4d-4c57-9d7a-3f1f5e2a9b10", "first_name": "Homer"}"#;
        let profile: Profile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.role, Role::Member);
        assert!(!profile.is_admin());
        assert_eq!(profile.display_name(), Some("Homer"));
    }

    #[test]
    fn test_display_name_prefers_preferred_name() {
        let json = r#"{"id": "7f0c2b1e-8a4d-4c57-9d7a-3f1f5e2a9b10", "first_name": "Homer", "preferred_name": "Ho", "role": "admin"}"#;
        let profile: Profile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.display_name(), Some("Ho"));
        assert!(profile.is_admin());
    }
}
