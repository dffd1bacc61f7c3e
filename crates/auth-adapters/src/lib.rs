//! # auth-adapters
//!
//! Sign-in through the identity provider's hosted UI and the session that
//! feeds bearer tokens to the catalog clients.

pub mod errors;
pub mod hosted_ui;
pub mod profile;
pub mod session;

pub use errors::AuthError;
pub use hosted_ui::{parse_callback, HostedUiClient, HostedUiConfig, TokenSet};
pub use profile::UserProfile;
pub use session::{AuthSession, StaticToken};
