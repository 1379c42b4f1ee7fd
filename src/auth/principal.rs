//! Authenticated identity carried through token issuance.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::store::User;

/// Profile kind attached to a user record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Trainee,
    Trainer,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trainee => "trainee",
            Self::Trainer => "trainer",
        }
    }
}

/// Plain identity data for the authenticated user. Passed explicitly between
/// the flows; nothing is discovered through a runtime lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
    pub username: String,
    pub active: bool,
    pub role: Role,
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            active: user.active,
            role: user.role,
        }
    }
}
