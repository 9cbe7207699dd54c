use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{crypto, decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identity claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("token is malformed")]
    Malformed,

    #[error("token generation failed: {0}")]
    Signing(String),

    #[error("token secret is not configured")]
    MissingSecret,
}

/// A freshly minted token together with the instant it stops being valid.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Mints and verifies HS256 session tokens with a process-wide secret.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer").field("ttl", &self.ttl).finish_non_exhaustive()
    }
}

impl TokenIssuer {
    pub fn new(secret: &[u8], ttl: Duration) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl,
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, user_id: i64) -> Result<IssuedToken, TokenError> {
        self.issue_at(user_id, Utc::now())
    }

    pub fn issue_at(&self, user_id: i64, now: DateTime<Utc>) -> Result<IssuedToken, TokenError> {
        let expires_at = now + self.ttl;
        let claims = Claims {
            user_id,
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))?;

        // exp is whole seconds; report the same instant the claim asserts
        let expires_at = Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .ok_or_else(|| TokenError::Signing("expiry out of range".to_string()))?;

        Ok(IssuedToken { token, expires_at })
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify `token` as of `now`.
    ///
    /// Expiry is judged on the decodable claims before the MAC is checked, so a token
    /// past its `exp` is always `Expired` whatever its signature. The MAC then covers
    /// every byte before the last `.`, header and separator included, so any other
    /// alteration is `InvalidSignature`. Past a missing signature segment, only an
    /// authentic token can be `Malformed`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let Some((signing_input, signature)) = token.rsplit_once('.') else {
            return Err(TokenError::Malformed);
        };

        if let Some(claims) = Self::peek_claims(token) {
            if claims.exp < now.timestamp() {
                return Err(TokenError::Expired);
            }
        }

        let authentic = crypto::verify(signature, signing_input.as_bytes(), &self.decoding_key, Algorithm::HS256)
            .map_err(|_| TokenError::InvalidSignature)?;
        if !authentic {
            return Err(TokenError::InvalidSignature);
        }

        let claims = decode::<Claims>(token, &self.decoding_key, &Self::signed_validation())
            .map(|data| data.claims)
            .map_err(|_| TokenError::Malformed)?;

        if claims.exp < now.timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    fn signed_validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        // exp is checked against the caller-supplied clock instead
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.required_spec_claims.clear();
        validation
    }

    /// Decode claims without trusting them.
    fn peek_claims(token: &str) -> Option<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
            .ok()
            .map(|data| data.claims)
    }
}
