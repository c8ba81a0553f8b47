//! Registration storage.
//!
//! [`RegistrationStore`] is the capability set the gateway needs from a
//! backend. The PostgreSQL implementation lives in [`crate::db`]; the
//! in-memory one below enforces the same unique-email constraint.

use crate::error::Error;
use crate::models::{NewRegistration, Registration};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

#[async_trait]
pub trait RegistrationStore: Send + Sync {
    /// Inserts one row and returns it as stored. Fails with
    /// [`Error::DuplicateRecord`] when the email is already present.
    async fn insert(&self, registration: &NewRegistration) -> crate::Result<Registration>;

    /// Exact-match lookup on the stored (normalized) email.
    async fn find_by_email(&self, email: &str) -> crate::Result<Option<Registration>>;

    /// All rows, most recently created first.
    async fn list(&self) -> crate::Result<Vec<Registration>>;

    async fn ping(&self) -> crate::Result<()>;
}

#[derive(Default)]
pub struct MemoryStore {
    rows: RwLock<Vec<Registration>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RegistrationStore for MemoryStore {
    async fn insert(&self, registration: &NewRegistration) -> crate::Result<Registration> {
        let mut rows = self.rows.write().await;
        if rows.iter().any(|r| r.email == registration.email) {
            return Err(Error::DuplicateRecord(format!(
                "Key (email)=({}) already exists.",
                registration.email
            )));
        }

        let row = Registration {
            id: rows.last().map_or(1, |r| r.id + 1),
            first_name: registration.first_name.clone(),
            last_name: registration.last_name.clone(),
            mobile_number: registration.mobile_number.clone(),
            email: registration.email.clone(),
            company: registration.company.clone(),
            position: registration.position.clone(),
            created_at: Utc::now(),
        };
        rows.push(row.clone());
        Ok(row)
    }

    async fn find_by_email(&self, email: &str) -> crate::Result<Option<Registration>> {
        let rows = self.rows.read().await;
        Ok(rows.iter().find(|r| r.email == email).cloned())
    }

    async fn list(&self) -> crate::Result<Vec<Registration>> {
        let mut rows = self.rows.read().await.clone();
        rows.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(rows)
    }

    async fn ping(&self) -> crate::Result<()> {
        Ok(())
    }
}
