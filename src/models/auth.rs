use serde::{Deserialize, Serialize};

use crate::session::Role;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Successful login answer; `role` is one of the `ROLE_*` strings
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(deserialize_with = "super::id_as_string")]
    pub id: String,
}

impl LoginResponse {
    /// Role the server granted. Without one the role of the login page
    /// stands; an unrecognised one is `None`.
    pub fn granted_role(&self, requested: Role) -> Option<Role> {
        match self.role.as_deref().map(str::trim) {
            None | Some("") => Some(requested),
            Some(raw) => Role::parse(raw),
        }
    }
}
