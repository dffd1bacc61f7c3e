use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The identity provider redirected back with `error=…`.
    #[error("sign-in failed: {error}{}", describe(.description))]
    Callback {
        error: String,
        description: Option<String>,
    },

    #[error("token exchange failed: {status} - {body}")]
    TokenExchange { status: u16, body: String },

    #[error("get user info failed: {0}")]
    UserInfo(u16),

    #[error("identity provider unreachable: {0}")]
    Transport(String),

    #[error("invalid identity provider URL: {0}")]
    InvalidUrl(String),
}

fn describe(description: &Option<String>) -> String {
    description
        .as_deref()
        .map(|d| format!(" ({d})"))
        .unwrap_or_default()
}
