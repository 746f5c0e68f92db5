pub mod claims;
pub mod errors;
pub mod service;

pub use claims::SessionClaims;
pub use claims::TokenKind;
pub use errors::TokenError;
pub use service::SessionTokens;
pub use service::TokenService;
