//! Share link token generation.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;

use boxlite_core::config::share::MIN_TOKEN_BYTES;

/// Generates unguessable, URL-safe share link tokens.
#[derive(Debug, Clone)]
pub struct LinkService {
    token_bytes: usize,
}

impl LinkService {
    /// Creates a link service producing tokens from `token_bytes` random
    /// bytes. Sizes below the minimum are raised to it.
    pub fn new(token_bytes: usize) -> Self {
        Self {
            token_bytes: token_bytes.max(MIN_TOKEN_BYTES),
        }
    }

    /// Generates a cryptographically secure random token for share links.
    pub fn generate_token(&self) -> String {
        let mut bytes = vec![0u8; self.token_bytes];
        rand::rng().fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }
}

impl Default for LinkService {
    fn default() -> Self {
        Self::new(32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_tokens_are_url_safe() {
        let token = LinkService::default().generate_token();
        // 32 bytes -> 43 base64 chars without padding
        assert_eq!(token.len(), 43);
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_tokens_do_not_repeat() {
        let links = LinkService::default();
        let tokens: HashSet<String> = (0..1000).map(|_| links.generate_token()).collect();
        assert_eq!(tokens.len(), 1000);
    }

    #[test]
    fn test_short_size_is_raised() {
        let token = LinkService::new(4).generate_token();
        // 16 bytes -> 22 chars
        assert_eq!(token.len(), 22);
    }
}
