use serde::{Deserialize, Serialize};

use crate::model::UserId;

/// The signed-in account as returned by the `user/`, `login/` and `register/` endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl User {
    /// Name to greet the user with: full name, else username, else email.
    #[must_use]
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if !full.is_empty() {
            return full.to_string();
        }
        if !self.username.trim().is_empty() {
            return self.username.trim().to_string();
        }
        self.email.clone()
    }
}
