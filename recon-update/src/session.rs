//! Simulated login
//!
//! The record API is a stand-in, so login only checks that all three
//! credentials are present and hands back an opaque session id.

use recon_common::{Error, Result};
use uuid::Uuid;

/// Operator credentials
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub customer_id: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("customer_id", &self.customer_id)
            .finish()
    }
}

/// Authenticated session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: String,
}

/// Log in; every credential must be non-blank
pub async fn login(credentials: &Credentials) -> Result<Session> {
    tracing::info!(
        username = %credentials.username,
        customer_id = %credentials.customer_id,
        "Simulating login"
    );

    let missing: Vec<&str> = [
        ("username", &credentials.username),
        ("password", &credentials.password),
        ("customer id", &credentials.customer_id),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(name, _)| name)
    .collect();

    if !missing.is_empty() {
        return Err(Error::Authentication(format!(
            "simulated login failed, missing {}",
            missing.join(", ")
        )));
    }

    let session = Session {
        id: format!("session-{}", Uuid::new_v4().simple()),
    };
    tracing::info!("Login succeeded");
    Ok(session)
}
