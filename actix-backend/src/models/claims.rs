use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user: AuthUser,
    pub exp: usize,
}

/// Identity attached to a request once the bearer token checks out.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
}
