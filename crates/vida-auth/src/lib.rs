//! Vida+ auth: password hashing, JWT issuance/validation, role-based
//! access decisions and the register/login/refresh flows.

pub mod access;
pub mod config;
pub mod directory;
pub mod error;
pub mod guard;
pub mod password;
pub mod service;
pub mod token;

pub use access::{Decision, Requirement, authorize};
pub use config::AuthConfig;
pub use directory::{Directory, IdentityStats};
pub use error::AuthError;
pub use guard::RequestGuard;
pub use service::{AuthService, LoginInput, LoginOutput, RefreshOutput, RegisterInput};
pub use token::{AccessTokenClaims, RefreshTokenClaims, TokenCodec, TokenKind};
