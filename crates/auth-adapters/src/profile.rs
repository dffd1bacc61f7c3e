//! Profile claims from the user-info endpoint.

use domains::User;
use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "cognito:username")]
    pub username: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

impl UserProfile {
    /// Maps claims onto a [`User`], filling gaps from the other claims.
    pub fn to_user(&self) -> User {
        let sub = non_empty(&self.sub);
        let email = non_empty(&self.email);
        let username = non_empty(&self.username);

        User {
            id: sub.or(email).unwrap_or("unknown-user").to_string(),
            email: email.or(username).unwrap_or("unknown@example.com").to_string(),
            name: non_empty(&self.name)
                .or(email)
                .or(username)
                .unwrap_or("Cognito User")
                .to_string(),
        }
    }
}
