//! Authentication primitives library
//!
//! Provides reusable credential and session-token infrastructure for services:
//! - Password hashing (Argon2id)
//! - Session token issuance and verification (short-lived access / long-lived refresh pairs)
//!
//! Each service defines its own authentication traits and adapts these implementations.
//! This avoids coupling services through shared domain logic while reducing code duplication.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::CredentialHasher;
//!
//! let hasher = CredentialHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Session Tokens
//! ```
//! use auth::TokenKind;
//! use auth::TokenService;
//!
//! let tokens = TokenService::new(b"secret_key_at_least_32_bytes_long!");
//!
//! // Login: issue an access/refresh pair
//! let session = tokens.create_session("user123").unwrap();
//!
//! // Request: verify the access token
//! let claims = tokens.verify(&session.access_token).unwrap();
//! assert_eq!(claims.sub, "user123");
//! assert_eq!(claims.kind, TokenKind::Access);
//!
//! // Later: trade the refresh token for a fresh access token
//! let renewed = tokens.refresh(&session.refresh_token).unwrap();
//! ```

pub mod password;
pub mod token;

// Re-export commonly used items
pub use password::CredentialHasher;
pub use password::PasswordError;
pub use token::SessionClaims;
pub use token::SessionTokens;
pub use token::TokenError;
pub use token::TokenKind;
pub use token::TokenService;
