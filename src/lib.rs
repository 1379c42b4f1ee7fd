//! # Gymgate (Authentication & Session Authority)
//!
//! `gymgate` is the authentication core of a gym-management backend. It owns
//! login, credential change, session-token issuance and revocation, and
//! login-attempt throttling. Trainee and trainer profile management lives in
//! the surrounding services and reaches this crate only through the store
//! traits in [`auth::store`].
//!
//! ## Sessions
//!
//! A successful login mints an HMAC-signed JWT bound to the authenticated
//! principal and revokes every previously valid token for that user, so at
//! most one valid token exists per user at any time. `expired` and `revoked`
//! stay distinct flags on the stored record: expiry is time-based, revocation
//! is an explicit invalidation.
//!
//! ## Login throttling
//!
//! Failed logins are counted per username. Once the failure threshold is
//! reached the username is blocked until the lockout window elapses; the
//! window self-heals by elapsed time and a successful login clears the
//! counter.
//!
//! ## Passwords
//!
//! Stored credentials are Argon2id hashes in PHC string format. Unknown
//! usernames and wrong passwords are reported identically so callers cannot
//! probe for account existence.

pub mod auth;
