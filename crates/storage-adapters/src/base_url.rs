//! Backend base URL handling and bearer-token attachment shared by the
//! catalog, upload and health clients.

use std::sync::Arc;

use domains::TokenProvider;
use reqwest::RequestBuilder;
use secrecy::ExposeSecret;

/// Marker left in unedited deployment templates.
const PLACEHOLDER: &str = "PASTE_YOUR";

/// Trims the configured URL and drops one trailing `/`.
/// Blank or placeholder values mean "not configured".
pub fn normalize_base_url(raw: Option<&str>) -> Option<String> {
    let url = raw?.trim();
    if url.is_empty() || url.contains(PLACEHOLDER) {
        return None;
    }
    let url = url.strip_suffix('/').unwrap_or(url);
    Some(url.to_string())
}

/// Adds `Authorization: Bearer …` when the provider has a token.
pub(crate) async fn with_bearer(
    request: RequestBuilder,
    tokens: Option<&Arc<dyn TokenProvider>>,
) -> RequestBuilder {
    let Some(provider) = tokens else {
        return request;
    };
    match provider.bearer_token().await {
        Some(token) => request.bearer_auth(token.expose_secret()),
        None => request,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_trailing_slash_and_whitespace() {
        assert_eq!(
            normalize_base_url(Some("  https://api.example.com/ ")),
            Some("https://api.example.com".to_string())
        );
        assert_eq!(
            normalize_base_url(Some("https://api.example.com")),
            Some("https://api.example.com".to_string())
        );
    }

    #[test]
    fn blank_and_placeholder_are_unconfigured() {
        assert_eq!(normalize_base_url(None), None);
        assert_eq!(normalize_base_url(Some("   ")), None);
        assert_eq!(normalize_base_url(Some("PASTE_YOUR_LAMBDA_URL_HERE")), None);
    }
}
