use serde::{Deserialize, Serialize};

use crate::models::session::Role;

/// A user account as listed on the admin dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// The unique identifier for the user.
    pub id: i64,
    /// The user's username.
    pub username: String,
    /// The user's email address.
    #[serde(default)]
    pub email: String,
    /// The user's role.
    pub role: Role,
}
