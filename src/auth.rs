//! Shared-secret admin login.

use crate::error::{AppError, Result};
use sha2::{Digest, Sha256};

/// Verifies the admin password configured for the dashboard
#[derive(Clone, Default)]
pub struct AdminAuth {
    password_digest: Option<[u8; 32]>,
}

impl AdminAuth {
    pub fn new(password: Option<String>) -> Self {
        Self {
            password_digest: password.as_deref().map(digest),
        }
    }

    /// Whether a password is configured at all
    pub fn is_configured(&self) -> bool {
        self.password_digest.is_some()
    }

    /// Check a login attempt against the configured password
    pub fn verify(&self, candidate: &str) -> Result<()> {
        let expected = self.password_digest.ok_or_else(|| {
            AppError::Configuration("Admin password not set in environment variables.".to_string())
        })?;

        if constant_time_eq(&expected, &digest(candidate)) {
            Ok(())
        } else {
            tracing::warn!("Rejected admin login attempt");
            Err(AppError::Authentication("Invalid password".to_string()))
        }
    }
}

impl std::fmt::Debug for AdminAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminAuth")
            .field("configured", &self.is_configured())
            .finish()
    }
}

fn digest(value: &str) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Sha256::digest(value.as_bytes()));
    out
}

/// Compares every byte so timing does not reveal the first mismatch
fn constant_time_eq(a: &[u8; 32], b: &[u8; 32]) -> bool {
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
