//! Domain Verification Service
//!
//! Custom storefront domains are verified by serving a token at a
//! well-known path on the claimed host. The server fetches it over
//! plain HTTP (the domain has no certificate yet at this point) with a
//! short timeout and no redirect following, and compares the trimmed
//! body to the stored token.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use ring::rand::{SecureRandom, SystemRandom};
use std::time::Duration;

use crate::utils::validation::MAX_HOSTNAME_LEN;
use crate::utils::{AppError, AppResult};

/// Well-known path the customer serves the token at
pub const WELL_KNOWN_PATH: &str = "/.well-known/tably-verification.txt";

/// Fetch timeout
const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Generate a URL-safe verification token (32 bytes of entropy)
pub fn generate_token() -> AppResult<String> {
    let rng = SystemRandom::new();
    let mut bytes = [0u8; 32];
    rng.fill(&mut bytes)
        .map_err(|_| AppError::internal("Failed to generate verification token"))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Normalize and validate a hostname
///
/// Lowercases, strips a trailing dot, enforces RFC 1035 label shape and
/// rejects the platform's own base domain (and its subdomains).
pub fn normalize_hostname(hostname: &str, platform_base_domain: &str) -> AppResult<String> {
    let hostname = hostname.trim().trim_end_matches('.').to_lowercase();

    if hostname.is_empty() || hostname.len() > MAX_HOSTNAME_LEN {
        return Err(AppError::validation("Invalid hostname length"));
    }
    if !hostname.contains('.') {
        return Err(AppError::validation(
            "Hostname must be fully qualified (e.g. order.example.com)",
        ));
    }
    for label in hostname.split('.') {
        let valid = !label.is_empty()
            && label.len() <= 63
            && label
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
            && !label.starts_with('-')
            && !label.ends_with('-');
        if !valid {
            return Err(AppError::validation(format!(
                "Invalid hostname label '{}'",
                label
            )));
        }
    }

    let base = platform_base_domain.to_lowercase();
    if hostname == base || hostname.ends_with(&format!(".{}", base)) {
        return Err(AppError::validation(format!(
            "Hostname must not be under the platform domain {}",
            base
        )));
    }

    Ok(hostname)
}

/// Domain verifier - wraps the outbound HTTP client
#[derive(Debug, Clone)]
pub struct DomainVerifier {
    client: reqwest::Client,
}

impl DomainVerifier {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("Failed to build HTTP client");
        Self { client }
    }

    /// Fetch the token body from the claimed host
    ///
    /// Any transport error, non-2xx status or oversized body is a
    /// verification failure described by the returned message.
    pub async fn fetch_token(&self, hostname: &str) -> Result<String, String> {
        let url = format!("http://{}{}", hostname, WELL_KNOWN_PATH);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| format!("Fetch failed: {}", e))?;

        if !response.status().is_success() {
            return Err(format!("Unexpected status {}", response.status()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| format!("Failed to read body: {}", e))?;

        // A verification file is one token line; anything huge is not it
        if body.len() > 4096 {
            return Err("Response body too large".to_string());
        }

        Ok(body.trim().to_string())
    }
}

impl Default for DomainVerifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_accepts_valid_hostnames() {
        assert_eq!(
            normalize_hostname("Order.Example.COM.", "tably.app").unwrap(),
            "order.example.com"
        );
        assert_eq!(
            normalize_hostname("el-rancho.eat", "tably.app").unwrap(),
            "el-rancho.eat"
        );
    }

    #[test]
    fn test_normalize_rejects_bad_labels() {
        assert!(normalize_hostname("no_underscores.com", "tably.app").is_err());
        assert!(normalize_hostname("-leading.com", "tably.app").is_err());
        assert!(normalize_hostname("bare-host", "tably.app").is_err());
        assert!(normalize_hostname("", "tably.app").is_err());
    }

    #[test]
    fn test_normalize_rejects_platform_domain() {
        assert!(normalize_hostname("tably.app", "tably.app").is_err());
        assert!(normalize_hostname("foo.tably.app", "tably.app").is_err());
        assert!(normalize_hostname("nottably.app", "tably.app").is_ok());
    }

    #[test]
    fn test_generated_tokens_differ() {
        let a = generate_token().unwrap();
        let b = generate_token().unwrap();
        assert_ne!(a, b);
        assert!(a.len() >= 40);
    }
}
