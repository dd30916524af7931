use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub full_name: String,
}

/// Token and user held by the client. Authentication itself is bypassed:
/// the shipped default is a demo session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    token: Option<String>,
    user: Option<User>,
}

impl AuthSession {
    /// The demo session used while sign-in is disabled.
    #[must_use]
    pub fn bypass() -> Self {
        Self {
            token: Some("bypass-token".into()),
            user: Some(User {
                id: "demo-id".into(),
                email: "demo@student.com".into(),
                full_name: "Demo Student".into(),
            }),
        }
    }

    #[must_use]
    pub fn signed_out() -> Self {
        Self {
            token: None,
            user: None,
        }
    }

    pub fn set(&mut self, token: impl Into<String>, user: User) {
        self.token = Some(token.into());
        self.user = Some(user);
    }

    pub fn logout(&mut self) {
        *self = Self::signed_out();
    }

    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

impl Default for AuthSession {
    fn default() -> Self {
        Self::bypass()
    }
}
