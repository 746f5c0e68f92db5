use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::SessionClaims;
use super::claims::TokenKind;
use super::errors::TokenError;

/// Access token lifetime when none is configured.
pub const DEFAULT_ACCESS_TTL_MINUTES: i64 = 30;
/// Refresh token lifetime when none is configured.
pub const DEFAULT_REFRESH_TTL_DAYS: i64 = 7;

/// An access/refresh token pair for one authenticated session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// Issues and verifies session tokens.
///
/// Tokens are HS256-signed JWTs carrying [`SessionClaims`]. Access tokens are
/// short-lived and authenticate individual requests; refresh tokens are
/// long-lived and can only be traded for new access tokens.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    /// Create a token service with the default lifetimes
    /// (30 minute access tokens, 7 day refresh tokens).
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (should be stored securely)
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Store secrets in environment variables or secure vaults, never in code
    pub fn new(secret: &[u8]) -> Self {
        Self::with_lifetimes(
            secret,
            Duration::minutes(DEFAULT_ACCESS_TTL_MINUTES),
            Duration::days(DEFAULT_REFRESH_TTL_DAYS),
        )
    }

    /// Create a token service with explicit lifetimes.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens
    /// * `access_ttl` - Lifetime of issued access tokens
    /// * `refresh_ttl` - Lifetime of issued refresh tokens
    pub fn with_lifetimes(secret: &[u8], access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            access_ttl,
            refresh_ttl,
        }
    }

    /// Issue an access token for the given subject.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token signing failed
    pub fn issue_access(&self, subject: impl ToString) -> Result<String, TokenError> {
        self.issue(subject.to_string(), TokenKind::Access, self.access_ttl)
    }

    /// Issue a refresh token for the given subject.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token signing failed
    pub fn issue_refresh(&self, subject: impl ToString) -> Result<String, TokenError> {
        self.issue(subject.to_string(), TokenKind::Refresh, self.refresh_ttl)
    }

    /// Issue the access/refresh pair for a newly authenticated session.
    ///
    /// # Arguments
    /// * `subject` - Account identifier the pair is issued for
    ///
    /// # Errors
    /// * `EncodingFailed` - Token signing failed
    pub fn create_session(&self, subject: impl ToString) -> Result<SessionTokens, TokenError> {
        let subject = subject.to_string();

        Ok(SessionTokens {
            access_token: self.issue_access(&subject)?,
            refresh_token: self.issue_refresh(&subject)?,
        })
    }

    /// Decode a token and validate its signature and expiry.
    ///
    /// Callers are expected to check the returned claims' `kind` against
    /// the kind they accept.
    ///
    /// # Arguments
    /// * `token` - JWT string to verify
    ///
    /// # Returns
    /// The verified claims
    ///
    /// # Errors
    /// * `Expired` - Token expiry is in the past
    /// * `Invalid` - Signature mismatch or malformed token
    pub fn verify(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        // Expiry is exact: no clock-skew leeway past `exp`.
        validation.leeway = 0;

        let token_data = decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            })?;

        Ok(token_data.claims)
    }

    /// Trade a refresh token for a new access token.
    ///
    /// The refresh token itself is not rotated; it stays valid until its
    /// own expiry.
    ///
    /// # Arguments
    /// * `refresh_token` - Previously issued refresh token
    ///
    /// # Returns
    /// A newly issued access token for the same subject
    ///
    /// # Errors
    /// * `Expired` - Refresh token expiry is in the past
    /// * `Invalid` - Signature mismatch or malformed token
    /// * `WrongKind` - Presented token is not a refresh token
    pub fn refresh(&self, refresh_token: &str) -> Result<String, TokenError> {
        let claims = self.verify(refresh_token)?;

        if claims.kind != TokenKind::Refresh {
            return Err(TokenError::WrongKind {
                expected: TokenKind::Refresh,
                actual: claims.kind,
            });
        }

        self.issue_access(claims.sub)
    }

    fn issue(&self, subject: String, kind: TokenKind, ttl: Duration) -> Result<String, TokenError> {
        let now = Utc::now();

        let claims = SessionClaims {
            sub: subject,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            kind,
        };

        let header = Header::new(self.algorithm);

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| TokenError::EncodingFailed(e.to_string()))
    }
}
