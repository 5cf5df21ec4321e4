use uuid::Uuid;

/// Role granting administrative endpoints
pub const ADMIN: &str = "Admin";

/// Role held by ordinary readers
pub const USER: &str = "User";

/// Role record managed by the identity subsystem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
}

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }

    /// Upper-cased name; role names are unique case-insensitively
    pub fn normalized_name(&self) -> String {
        normalize_role_name(&self.name)
    }
}

pub fn normalize_role_name(name: &str) -> String {
    name.trim().to_uppercase()
}
