//! # Session
//!
//! Holds the signed-in user's tokens and supplies the bearer credential to
//! the catalog clients.

use async_trait::async_trait;
use domains::{TokenProvider, User};
use secrecy::SecretString;
use tokio::sync::RwLock;
use tracing::info;

use crate::hosted_ui::TokenSet;

#[derive(Debug)]
struct SignedIn {
    tokens: TokenSet,
    user: User,
}

/// Explicit application auth state. Starts signed out.
#[derive(Debug, Default)]
pub struct AuthSession {
    inner: RwLock<Option<SignedIn>>,
}

impl AuthSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sign_in(&self, tokens: TokenSet, user: User) {
        info!(user_id = %user.id, "signed in");
        *self.inner.write().await = Some(SignedIn { tokens, user });
    }

    pub async fn sign_out(&self) {
        if let Some(previous) = self.inner.write().await.take() {
            info!(user_id = %previous.user.id, "signed out");
        }
    }

    pub async fn current_user(&self) -> Option<User> {
        self.inner.read().await.as_ref().map(|s| s.user.clone())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.inner.read().await.is_some()
    }
}

#[async_trait]
impl TokenProvider for AuthSession {
    /// Prefers the ID token, as the catalog backend authorizes on identity claims.
    async fn bearer_token(&self) -> Option<SecretString> {
        let guard = self.inner.read().await;
        let signed_in = guard.as_ref()?;
        Some(
            signed_in
                .tokens
                .id_token
                .clone()
                .unwrap_or_else(|| signed_in.tokens.access_token.clone()),
        )
    }
}

/// A fixed token, e.g. one passed on the command line.
pub struct StaticToken(SecretString);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn bearer_token(&self) -> Option<SecretString> {
        Some(self.0.clone())
    }
}
