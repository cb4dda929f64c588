//! Wire DTOs for the Keycloak token and admin endpoints.

use serde::{Deserialize, Serialize};

/// Token endpoint response for both the password and refresh grants.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
}

/// Group creation payload; the admin API fills in everything else.
#[derive(Debug, Serialize)]
pub(crate) struct GroupRepresentation<'a> {
    pub name: &'a str,
}

/// User creation payload with group membership by full path.
#[derive(Debug, Serialize)]
pub(crate) struct UserRepresentation<'a> {
    pub username: &'a str,
    pub enabled: bool,
    pub groups: &'a [String],
}
