use crate::domain::user::UserProfile;
use serde::{Deserialize, Serialize};

/// Caller identity recovered from a verified token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: String,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct Auth {
    pub token: String,
    pub user: UserProfile,
}
