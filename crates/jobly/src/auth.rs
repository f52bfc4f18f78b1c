//! Authorization checks for already-authenticated callers.
//!
//! Token verification happens outside this crate; these helpers only decide
//! whether the verified identity may act on a given account.

use crate::error::{JoblyError, JoblyResult};
use serde::{Deserialize, Serialize};

/// The identity carried by a verified token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub username: String,
    #[serde(default)]
    pub is_admin: bool,
}

impl AuthUser {
    pub fn new(username: impl Into<String>, is_admin: bool) -> Self {
        Self {
            username: username.into(),
            is_admin,
        }
    }

    pub fn is_self(&self, username: &str) -> bool {
        self.username == username
    }

    pub fn is_admin_or_self(&self, username: &str) -> bool {
        self.is_admin || self.is_self(username)
    }
}

fn denied() -> JoblyError {
    JoblyError::unauthorized("Unauthorized")
}

/// Require an admin caller.
pub fn ensure_admin(user: Option<&AuthUser>) -> JoblyResult<&AuthUser> {
    match user {
        Some(u) if u.is_admin => Ok(u),
        _ => Err(denied()),
    }
}

/// Require a caller acting on their own account, or an admin.
pub fn ensure_admin_or_self<'a>(
    user: Option<&'a AuthUser>,
    username: &str,
) -> JoblyResult<&'a AuthUser> {
    match user {
        Some(u) if u.is_admin_or_self(username) => Ok(u),
        _ => Err(denied()),
    }
}

/// Require a caller acting on their own account. Admins get no exemption.
pub fn ensure_self<'a>(user: Option<&'a AuthUser>, username: &str) -> JoblyResult<&'a AuthUser> {
    match user {
        Some(u) if u.is_self(username) => Ok(u),
        _ => Err(denied()),
    }
}
