//! Login, credential change, and session-token lifecycle.
//!
//! [`AuthService`] drives the login state machine: check the attempt tracker,
//! verify credentials, then rotate session tokens. The stores it talks to are
//! trait seams so the persistence backend (Postgres here, in-memory for tests
//! and single-process runs) stays swappable.
//!
//! ## Error mapping at the boundary
//!
//! [`AuthError::UserNotFound`] must be presented by the transport layer with
//! the same visible effect as [`AuthError::IncorrectCredentials`]; anything
//! else lets a caller enumerate usernames.

pub mod attempts;
pub mod clock;
pub mod error;
pub mod memory;
pub mod password;
pub mod postgres;
pub mod principal;
pub mod provision;
pub mod service;
pub mod state;
pub mod store;
pub mod token;
pub mod types;

pub use attempts::LoginAttemptTracker;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::AuthError;
pub use memory::{InMemoryCredentialStore, InMemoryTokenStore};
pub use password::PasswordHasher;
pub use postgres::{PgCredentialStore, PgTokenStore};
pub use principal::{Principal, Role};
pub use service::AuthService;
pub use state::AuthConfig;
pub use store::{CredentialStore, SessionToken, TokenStore, User};
pub use token::{TokenError, TokenIssuer};
pub use types::{CredentialPair, IssuedToken};
