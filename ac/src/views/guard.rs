//! Access control for signed-in screens

use backstore::User;

pub const LOGIN_ROUTE: &str = "/login";
pub const HOME_ROUTE: &str = "/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Allow,
    Redirect(&'static str),
}

/// Requires a user, optionally with a given `user_metadata.role`
#[derive(Debug, Clone, Default)]
pub struct RouteGuard {
    role: Option<String>,
}

impl RouteGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_role(role: impl Into<String>) -> Self {
        Self { role: Some(role.into()) }
    }

    pub fn check(&self, user: Option<&User>) -> Access {
        let Some(user) = user else {
            return Access::Redirect(LOGIN_ROUTE);
        };
        match &self.role {
            Some(required) if user.role() != Some(required.as_str()) => Access::Redirect(HOME_ROUTE),
            _ => Access::Allow,
        }
    }
}
