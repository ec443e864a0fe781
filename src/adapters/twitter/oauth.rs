//! OAuth 1.0a request signing (HMAC-SHA1) for the Twitter v1.1 API.

use crate::config::app_config::Credentials;
use crate::utils::error::{EtlError, Result};
use base64::Engine;
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rand::distributions::Alphanumeric;
use rand::Rng;
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

/// RFC 3986 unreserved characters stay as-is, everything else is escaped.
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

pub fn percent_encode(value: &str) -> String {
    utf8_percent_encode(value, OAUTH_ENCODE_SET).to_string()
}

/// Query string encoded exactly the way it is signed.
pub fn encode_query(params: &[(String, String)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

#[derive(Debug, Clone)]
pub struct OAuthSigner {
    credentials: Credentials,
}

impl OAuthSigner {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    /// `Authorization` header value for one request, with a fresh nonce and timestamp.
    pub fn authorization_header(
        &self,
        method: &str,
        url: &str,
        params: &[(String, String)],
    ) -> Result<String> {
        let nonce: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();
        let timestamp = chrono::Utc::now().timestamp().to_string();

        self.authorization_header_with(method, url, params, &nonce, &timestamp)
    }

    pub fn authorization_header_with(
        &self,
        method: &str,
        url: &str,
        params: &[(String, String)],
        nonce: &str,
        timestamp: &str,
    ) -> Result<String> {
        let mut oauth_params = self.oauth_params(nonce, timestamp);
        let base = signature_base_string(method, url, params, &oauth_params);
        let signature = self.sign(&base)?;
        oauth_params.push(("oauth_signature".to_string(), signature));
        oauth_params.sort();

        let fields = oauth_params
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
            .collect::<Vec<_>>()
            .join(", ");
        Ok(format!("OAuth {}", fields))
    }

    fn oauth_params(&self, nonce: &str, timestamp: &str) -> Vec<(String, String)> {
        vec![
            (
                "oauth_consumer_key".to_string(),
                self.credentials.api_key.clone(),
            ),
            ("oauth_nonce".to_string(), nonce.to_string()),
            (
                "oauth_signature_method".to_string(),
                "HMAC-SHA1".to_string(),
            ),
            ("oauth_timestamp".to_string(), timestamp.to_string()),
            (
                "oauth_token".to_string(),
                self.credentials.access_token.clone(),
            ),
            ("oauth_version".to_string(), "1.0".to_string()),
        ]
    }

    fn sign(&self, base: &str) -> Result<String> {
        let key = format!(
            "{}&{}",
            percent_encode(&self.credentials.secret_key),
            percent_encode(&self.credentials.access_token_secret)
        );
        let mut mac =
            HmacSha1::new_from_slice(key.as_bytes()).map_err(|e| EtlError::ProcessingError {
                message: format!("invalid signing key: {}", e),
            })?;
        mac.update(base.as_bytes());
        Ok(base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes()))
    }
}

pub fn signature_base_string(
    method: &str,
    url: &str,
    params: &[(String, String)],
    oauth_params: &[(String, String)],
) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .chain(oauth_params.iter())
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect();
    encoded.sort();

    let param_string = encoded
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_uppercase(),
        percent_encode(url),
        percent_encode(&param_string)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_credentials() -> Credentials {
        Credentials {
            api_key: "xvz1evFS4wEEPTGEFPHBog".to_string(),
            secret_key: "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw".to_string(),
            access_token: "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb".to_string(),
            access_token_secret: "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE".to_string(),
        }
    }

    fn reference_params() -> Vec<(String, String)> {
        vec![
            ("include_entities".to_string(), "true".to_string()),
            (
                "status".to_string(),
                "Hello Ladies + Gentlemen, a signed OAuth request!".to_string(),
            ),
        ]
    }

    #[test]
    fn test_percent_encode_keeps_unreserved() {
        assert_eq!(percent_encode("Az09-._~"), "Az09-._~");
        assert_eq!(percent_encode("a b+c,d!"), "a%20b%2Bc%2Cd%21");
        assert_eq!(percent_encode("☃"), "%E2%98%83");
    }

    #[test]
    fn test_signature_base_string_matches_reference_construction() {
        let signer = OAuthSigner::new(reference_credentials());
        let oauth = signer.oauth_params("kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg", "1318622958");

        let base = signature_base_string(
            "post",
            "https://api.twitter.com/1.1/statuses/update.json",
            &reference_params(),
            &oauth,
        );

        assert_eq!(
            base,
            "POST&https%3A%2F%2Fapi.twitter.com%2F1.1%2Fstatuses%2Fupdate.json&\
include_entities%3Dtrue%26oauth_consumer_key%3Dxvz1evFS4wEEPTGEFPHBog%26\
oauth_nonce%3DkYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg%26\
oauth_signature_method%3DHMAC-SHA1%26oauth_timestamp%3D1318622958%26\
oauth_token%3D370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb%26\
oauth_version%3D1.0%26status%3DHello%2520Ladies%2520%252B%2520Gentlemen\
%252C%2520a%2520signed%2520OAuth%2520request%2521"
        );
    }

    #[test]
    fn test_header_is_deterministic_for_fixed_nonce() {
        let signer = OAuthSigner::new(reference_credentials());
        let url = "https://api.twitter.com/1.1/statuses/update.json";

        let first = signer
            .authorization_header_with("POST", url, &reference_params(), "nonce", "1318622958")
            .unwrap();
        let second = signer
            .authorization_header_with("POST", url, &reference_params(), "nonce", "1318622958")
            .unwrap();

        assert_eq!(first, second);
        assert!(first.starts_with("OAuth oauth_consumer_key=\"xvz1evFS4wEEPTGEFPHBog\""));
        assert!(first.contains("oauth_signature=\""));
        assert!(first.contains("oauth_version=\"1.0\""));
    }

    #[test]
    fn test_fresh_headers_use_different_nonces() {
        let signer = OAuthSigner::new(reference_credentials());
        let params = vec![("screen_name".to_string(), "ExtendCaresUI".to_string())];
        let url = "https://api.twitter.com/1.1/statuses/user_timeline.json";

        let a = signer.authorization_header("GET", url, &params).unwrap();
        let b = signer.authorization_header("GET", url, &params).unwrap();

        assert_ne!(a, b);
    }

    #[test]
    fn test_encode_query_preserves_order() {
        let params = vec![
            ("screen_name".to_string(), "Extend Cares".to_string()),
            ("count".to_string(), "200".to_string()),
        ];
        assert_eq!(encode_query(&params), "screen_name=Extend%20Cares&count=200");
    }
}
