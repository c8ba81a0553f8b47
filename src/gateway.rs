//! The registration gateway: the only path from callers to the store.
//!
//! Every operation is a single store round trip. Input is validated before
//! anything reaches the store and sanitized again on the way in; store
//! failures come back as one of the [`GatewayError`] messages.

use crate::error::Error;
use crate::models::{NewRegistration, Registration};
use crate::store::RegistrationStore;
use crate::validation::{sanitize_email, FieldError};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error(transparent)]
    Invalid(#[from] FieldError),
    #[error("Email already registered")]
    DuplicateEmail,
    #[error("Email not found")]
    NotFound,
    #[error("Registrations table not found. Please run the database setup script.")]
    MissingTable,
    #[error("Permission denied. Please check database access policies.")]
    PermissionDenied,
    #[error("Registration failed")]
    CreateFailed,
    #[error("Failed to fetch registrations")]
    FetchFailed,
    #[error("Service unavailable")]
    Unavailable,
}

#[derive(Clone)]
pub struct Gateway {
    store: Arc<dyn RegistrationStore>,
    require_affiliation: bool,
}

impl Gateway {
    pub fn new(store: Arc<dyn RegistrationStore>, require_affiliation: bool) -> Gateway {
        Gateway {
            store,
            require_affiliation,
        }
    }

    pub async fn create_registration(
        &self,
        registration: NewRegistration,
    ) -> Result<Registration, GatewayError> {
        let registration = self.admit(registration)?;

        // Uniqueness is left to the store; checking first would race
        match self.store.insert(&registration).await {
            Ok(created) => {
                tracing::info!(id = created.id, email = %created.email, "registration created");
                Ok(created)
            }
            Err(Error::DuplicateRecord(_)) => {
                tracing::debug!(email = %registration.email, "email already registered");
                Err(GatewayError::DuplicateEmail)
            }
            Err(e) => Err(translate(e, GatewayError::CreateFailed)),
        }
    }

    /// Validates, sanitizes, then validates the stored form again: stripping
    /// apostrophes can leave a required company or position empty.
    fn admit(&self, registration: NewRegistration) -> Result<NewRegistration, GatewayError> {
        registration
            .validate(self.require_affiliation)
            .map_err(rejected)?;
        let sanitized = registration.sanitize();
        sanitized
            .validate(self.require_affiliation)
            .map_err(rejected)?;
        Ok(sanitized)
    }

    pub async fn get_registration_by_email(
        &self,
        email: &str,
    ) -> Result<Registration, GatewayError> {
        let email = sanitize_email(email);
        match self.store.find_by_email(&email).await {
            Ok(Some(registration)) => Ok(registration),
            Ok(None) => Err(GatewayError::NotFound),
            Err(e) => Err(translate(e, GatewayError::FetchFailed)),
        }
    }

    pub async fn get_all_registrations(&self) -> Result<Vec<Registration>, GatewayError> {
        self.store
            .list()
            .await
            .map_err(|e| translate(e, GatewayError::FetchFailed))
    }

    pub async fn health(&self) -> Result<(), GatewayError> {
        self.store.ping().await.map_err(|e| {
            tracing::error!("store health check failed: {}", e);
            GatewayError::Unavailable
        })
    }
}

fn rejected(e: FieldError) -> GatewayError {
    tracing::debug!(field = e.field, reason = %e.reason, "registration rejected");
    e.into()
}

/// Maps a store fault onto its user-facing error. Misconfiguration is
/// reported as such; anything unrecognised becomes `fallback` and is only
/// logged in full.
fn translate(e: Error, fallback: GatewayError) -> GatewayError {
    match e {
        Error::MissingTable(detail) => {
            tracing::error!("registrations table is missing: {}", detail);
            GatewayError::MissingTable
        }
        Error::PermissionDenied(detail) => {
            tracing::error!("store refused access: {}", detail);
            GatewayError::PermissionDenied
        }
        e => {
            tracing::error!("store operation failed: {:?}", e);
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::validation::ValidationError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn attendee(email: &str) -> NewRegistration {
        NewRegistration {
            first_name: "Ana".into(),
            last_name: "Cruz".into(),
            mobile_number: "09171234567".into(),
            email: email.into(),
            company: "Acme".into(),
            position: "Dev".into(),
        }
    }

    fn gateway() -> Gateway {
        Gateway::new(Arc::new(MemoryStore::new()), true)
    }

    /// Store that fails every call with the error produced by `fault`.
    struct FailingStore {
        fault: fn() -> Error,
        calls: AtomicUsize,
    }

    impl FailingStore {
        fn new(fault: fn() -> Error) -> Arc<Self> {
            Arc::new(FailingStore {
                fault,
                calls: AtomicUsize::new(0),
            })
        }

        fn fail<T>(&self) -> crate::Result<T> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err((self.fault)())
        }
    }

    #[async_trait]
    impl RegistrationStore for FailingStore {
        async fn insert(&self, _: &NewRegistration) -> crate::Result<Registration> {
            self.fail()
        }

        async fn find_by_email(&self, _: &str) -> crate::Result<Option<Registration>> {
            self.fail()
        }

        async fn list(&self) -> crate::Result<Vec<Registration>> {
            self.fail()
        }

        async fn ping(&self) -> crate::Result<()> {
            self.fail()
        }
    }

    #[tokio::test]
    async fn test_create_normalizes_email() {
        let gateway = gateway();
        let created = gateway
            .create_registration(attendee("Ana@Example.com"))
            .await
            .unwrap();

        assert_eq!(created.email, "ana@example.com");
        assert_eq!(created.mobile_number, "09171234567");
        assert_eq!(created.first_name, "Ana");
        assert_eq!(created.company, "Acme");
    }

    #[tokio::test]
    async fn test_duplicate_email_is_case_insensitive() {
        let gateway = gateway();
        let first = gateway.create_registration(attendee("ana@example.com")).await;
        let second = gateway.create_registration(attendee("ANA@example.COM")).await;

        assert!(first.is_ok());
        assert_eq!(second, Err(GatewayError::DuplicateEmail));
        assert_eq!(second.unwrap_err().to_string(), "Email already registered");
        assert_eq!(gateway.get_all_registrations().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_store() {
        let store = FailingStore::new(|| Error::DuplicateRecord(String::new()));
        let gateway = Gateway::new(store.clone(), true);

        let mut registration = attendee("ana@example.com");
        registration.mobile_number = "12345".into();
        let error = gateway.create_registration(registration).await.unwrap_err();

        assert_eq!(error.to_string(), "Mobile number must be 10 or 11 digits");
        assert!(matches!(error, GatewayError::Invalid(FieldError { field: "mobileNumber", .. })));
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_affiliation_emptied_by_sanitizing_is_required() {
        let store = Arc::new(MemoryStore::new());
        let gateway = Gateway::new(store.clone(), true);

        let mut registration = attendee("ana@example.com");
        registration.company = "'''".into();
        let error = gateway.create_registration(registration).await.unwrap_err();
        assert_eq!(
            error,
            GatewayError::Invalid(FieldError {
                field: "company",
                reason: ValidationError::Required,
            })
        );

        let mut registration = attendee("ana@example.com");
        registration.position = "'".into();
        let error = gateway.create_registration(registration).await.unwrap_err();
        assert!(matches!(error, GatewayError::Invalid(FieldError { field: "position", .. })));
        assert!(store.list().await.unwrap().is_empty());

        // optional affiliation may end up empty
        let optional = Gateway::new(store.clone(), false);
        let mut registration = attendee("ana@example.com");
        registration.company = "'''".into();
        let created = optional.create_registration(registration).await.unwrap();
        assert_eq!(created.company, "");
    }

    #[tokio::test]
    async fn test_lookup_on_empty_store_is_not_found() {
        let result = gateway().get_registration_by_email("ana@example.com").await;
        assert_eq!(result, Err(GatewayError::NotFound));
    }

    #[tokio::test]
    async fn test_lookup_sanitizes_email() {
        let gateway = gateway();
        gateway
            .create_registration(attendee("ana@example.com"))
            .await
            .unwrap();

        let found = gateway
            .get_registration_by_email("  ANA@Example.com ")
            .await
            .unwrap();
        assert_eq!(found.email, "ana@example.com");
    }

    #[tokio::test]
    async fn test_list_most_recent_first() {
        let gateway = gateway();
        assert!(gateway.get_all_registrations().await.unwrap().is_empty());

        for email in ["a@example.com", "b@example.com", "c@example.com"] {
            gateway.create_registration(attendee(email)).await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }

        let all = gateway.get_all_registrations().await.unwrap();
        let emails: Vec<_> = all.iter().map(|r| r.email.as_str()).collect();
        assert_eq!(emails, ["c@example.com", "b@example.com", "a@example.com"]);
    }

    #[tokio::test]
    async fn test_store_faults_map_to_messages() {
        let missing = Gateway::new(FailingStore::new(|| Error::MissingTable("x".into())), true);
        assert_eq!(
            missing.create_registration(attendee("a@example.com")).await,
            Err(GatewayError::MissingTable)
        );
        assert_eq!(
            missing.get_all_registrations().await,
            Err(GatewayError::MissingTable)
        );

        let denied = Gateway::new(FailingStore::new(|| Error::PermissionDenied("x".into())), true);
        assert_eq!(
            denied.get_registration_by_email("a@example.com").await,
            Err(GatewayError::PermissionDenied)
        );

        let broken = Gateway::new(
            FailingStore::new(|| Error::ReadFileError(std::io::ErrorKind::Other.into())),
            true,
        );
        assert_eq!(
            broken.create_registration(attendee("a@example.com")).await,
            Err(GatewayError::CreateFailed)
        );
        assert_eq!(
            broken.get_registration_by_email("a@example.com").await,
            Err(GatewayError::FetchFailed)
        );
        assert_eq!(broken.get_all_registrations().await, Err(GatewayError::FetchFailed));
        assert_eq!(broken.health().await, Err(GatewayError::Unavailable));
    }
}
