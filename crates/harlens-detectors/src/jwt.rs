use crate::Result;
use harlens_core::har::Entry;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// JWT header information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtHeader {
    pub alg: Option<String>,
    pub typ: Option<String>,
}

/// A bearer JWT seen in an `Authorization` header
///
/// `header` is `None` when the first segment could not be decoded; the token
/// is still reported as present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BearerJwt {
    pub entry_index: usize,
    pub domain: String,
    pub header: Option<JwtHeader>,
}

impl BearerJwt {
    pub fn algorithm(&self) -> Option<&str> {
        self.header.as_ref().and_then(|h| h.alg.as_deref())
    }

    /// `alg: none` means the token is not signed at all
    pub fn is_unsigned(&self) -> bool {
        self.algorithm()
            .is_some_and(|alg| alg.eq_ignore_ascii_case("none"))
    }
}

pub struct JwtInspector;

impl JwtInspector {
    /// Collect bearer JWTs, one per domain and token
    pub fn scan(entries: &[Entry]) -> Vec<BearerJwt> {
        let mut seen = HashSet::new();
        let mut tokens = Vec::new();

        for (idx, entry) in entries.iter().enumerate() {
            let Some(token) = Self::extract_bearer_token(entry.request_header("authorization"))
            else {
                continue;
            };
            if !Self::is_jwt(token) {
                continue;
            }

            let domain = entry.host();
            if !seen.insert((domain.clone(), Self::token_key(token))) {
                continue;
            }

            tokens.push(Self::inspect(token, idx, domain));
        }

        tracing::debug!("Found {} distinct bearer JWTs", tokens.len());
        tokens
    }

    fn inspect(token: &str, entry_index: usize, domain: String) -> BearerJwt {
        let header_segment = token.split('.').next().unwrap_or("");
        let header = match Self::parse_jwt_header(header_segment) {
            Ok(header) => Some(header),
            Err(e) => {
                tracing::debug!("JWT header not decodable: {}", e);
                None
            }
        };

        BearerJwt {
            entry_index,
            domain,
            header,
        }
    }

    fn parse_jwt_header(encoded: &str) -> Result<JwtHeader> {
        let decoded = Self::base64_decode(encoded)?;
        let json: serde_json::Value = serde_json::from_str(&decoded)
            .map_err(|e| crate::Error::Parse(format!("Failed to parse JWT header: {}", e)))?;

        let obj = json
            .as_object()
            .ok_or_else(|| crate::Error::InvalidData("JWT header is not an object".to_string()))?;

        Ok(JwtHeader {
            alg: obj.get("alg").and_then(|v| v.as_str()).map(String::from),
            typ: obj.get("typ").and_then(|v| v.as_str()).map(String::from),
        })
    }

    fn base64_decode(encoded: &str) -> Result<String> {
        use base64::engine::Engine;
        use base64::engine::general_purpose::URL_SAFE_NO_PAD;

        let decoded_bytes = URL_SAFE_NO_PAD
            .decode(encoded.trim_end_matches('='))
            .map_err(|e| crate::Error::Parse(format!("Base64 decode failed: {}", e)))?;

        String::from_utf8(decoded_bytes)
            .map_err(|e| crate::Error::Parse(format!("UTF-8 decode failed: {}", e)))
    }

    fn extract_bearer_token(header_value: &str) -> Option<&str> {
        let (scheme, token) = header_value.trim().split_once(' ')?;
        scheme
            .eq_ignore_ascii_case("bearer")
            .then(|| token.trim())
    }

    fn is_jwt(token: &str) -> bool {
        let parts: Vec<&str> = token.split('.').collect();
        parts.len() == 3 && !parts[0].is_empty() && !parts[1].is_empty()
    }

    fn token_key(token: &str) -> String {
        token.chars().take(20).collect()
    }
}
