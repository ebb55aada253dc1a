use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Student,
    Admin,
}

impl Role {
    /// Indicates whether user with role can manage users and courses
    pub fn is_admin(self) -> bool {
        self == Role::Admin
    }
}

impl std::default::Default for Role {
    fn default() -> Self {
        Role::Student
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Student => write!(f, "student"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Role;

    #[test]
    fn role_serializes_uppercase() {
        assert_eq!(
            serde_json::to_string(&Role::Student).expect("role must serialize"),
            "\"STUDENT\""
        );
        let admin: Role = serde_json::from_str("\"ADMIN\"").expect("role must deserialize");
        assert!(admin.is_admin());
        assert!(!Role::default().is_admin());
    }
}
