use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Arbitrary caller-supplied payload carried inside a token.
///
/// No schema is enforced: whatever object was signed at issuance comes back
/// verbatim on verification and is trusted by downstream filters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(pub Map<String, Value>);

impl Claims {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The `email` claim, used to scope "my toys"
    pub fn email(&self) -> Option<&Value> {
        self.get("email")
    }
}

impl From<Map<String, Value>> for Claims {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Invalid token secret")]
    InvalidSecret,

    #[error("Token generation error: {0}")]
    Generation(String),

    #[error("Missing token header")]
    MissingHeader,

    #[error("Token header must look like '<scheme> <token>'")]
    MalformedHeader,

    #[error("Token expired")]
    Expired,

    #[error("Invalid token: {0}")]
    Invalid(String),
}

/// Issues and verifies bearer tokens over a server-held secret
pub trait TokenService: Send + Sync {
    /// Sign `claims` into an opaque bearer token
    fn issue(&self, claims: Claims) -> Result<String, TokenError>;

    /// Check a bare token's signature (and `exp`, when present)
    fn verify_token(&self, token: &str) -> Result<Claims, TokenError>;

    /// Verify a `"<scheme> <token>"` header value
    fn verify(&self, header_value: Option<&str>) -> Result<Claims, TokenError> {
        let header_value = header_value.ok_or(TokenError::MissingHeader)?;
        let token = extract_token(header_value)?;
        self.verify_token(token)
    }
}

/// Second whitespace-separated part of the header; the scheme is not checked
pub fn extract_token(header_value: &str) -> Result<&str, TokenError> {
    header_value
        .split_whitespace()
        .nth(1)
        .ok_or(TokenError::MalformedHeader)
}

/// HS256 JSON Web Token implementation
pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    default_expiry: Option<Duration>,
}

impl JwtTokenService {
    pub fn new(secret: &str, expiry_hours: Option<u64>) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::InvalidSecret);
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            default_expiry: expiry_hours.map(|h| Duration::hours(h as i64)),
        })
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        // Tokens carry whatever the caller signed; exp is only checked when present
        validation.required_spec_claims.clear();
        validation.validate_aud = false;
        validation
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, mut claims: Claims) -> Result<String, TokenError> {
        let now = Utc::now();
        claims
            .0
            .entry("iat")
            .or_insert_with(|| Value::from(now.timestamp()));
        if let Some(expiry) = self.default_expiry {
            claims
                .0
                .entry("exp")
                .or_insert_with(|| Value::from((now + expiry).timestamp()));
        }

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Generation(e.to_string()))
    }

    fn verify_token(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &Self::validation())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SECRET: &str = "test_secret_key_for_testing_purposes_only";

    fn claims(v: Value) -> Claims {
        Claims(v.as_object().cloned().unwrap())
    }

    #[test]
    fn issue_and_verify_roundtrip() {
        let service = JwtTokenService::new(SECRET, None).unwrap();
        let token = service.issue(claims(json!({ "email": "a@b.com", "role": "seller" }))).unwrap();

        let header = format!("Bearer {}", token);
        let decoded = service.verify(Some(&header)).unwrap();

        assert_eq!(decoded.email(), Some(&json!("a@b.com")));
        assert_eq!(decoded.get("role"), Some(&json!("seller")));
        assert!(decoded.get("iat").is_some());
        assert!(decoded.get("exp").is_none());
    }

    #[test]
    fn any_scheme_is_accepted() {
        let service = JwtTokenService::new(SECRET, None).unwrap();
        let token = service.issue(claims(json!({ "email": "x@y.z" }))).unwrap();

        let header = format!("whatever   {}", token);
        assert!(service.verify(Some(&header)).is_ok());
    }

    #[test]
    fn rejects_missing_or_malformed_header() {
        let service = JwtTokenService::new(SECRET, None).unwrap();
        let token = service.issue(Claims::default()).unwrap();

        assert!(matches!(service.verify(None), Err(TokenError::MissingHeader)));
        assert!(matches!(service.verify(Some(&token)), Err(TokenError::MalformedHeader)));
        assert!(matches!(service.verify(Some("Bearer not.a.jwt")), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let issuer = JwtTokenService::new("some_other_secret", None).unwrap();
        let verifier = JwtTokenService::new(SECRET, None).unwrap();
        let token = issuer.issue(claims(json!({ "email": "a@b.com" }))).unwrap();

        assert!(matches!(verifier.verify_token(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn honours_exp_when_present() {
        let service = JwtTokenService::new(SECRET, None).unwrap();
        let past = Utc::now().timestamp() - 3600;
        let token = service.issue(claims(json!({ "email": "a@b.com", "exp": past }))).unwrap();

        assert!(matches!(service.verify_token(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn default_expiry_is_stamped_when_configured() {
        let service = JwtTokenService::new(SECRET, Some(2)).unwrap();
        let token = service.issue(Claims::default()).unwrap();
        let decoded = service.verify_token(&token).unwrap();

        let iat = decoded.get("iat").and_then(Value::as_i64).unwrap();
        let exp = decoded.get("exp").and_then(Value::as_i64).unwrap();
        assert_eq!(exp - iat, 2 * 3600);
    }

    #[test]
    fn empty_secret_is_rejected() {
        assert!(matches!(JwtTokenService::new("", None), Err(TokenError::InvalidSecret)));
    }
}
