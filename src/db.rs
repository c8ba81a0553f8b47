use crate::error::Error::*;
use crate::models::{NewRegistration, Registration};
use crate::store::RegistrationStore;
use async_trait::async_trait;
use bb8::{Pool, PooledConnection};
use bb8_postgres::PostgresConnectionManager;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tokio_postgres_rustls::MakeRustlsConnect;

pub type Connection = PooledConnection<'static, PostgresConnectionManager<MakeRustlsConnect>>;

#[derive(Clone)]
pub struct ConnectionPool(Pool<PostgresConnectionManager<MakeRustlsConnect>>);

impl ConnectionPool {
    pub async fn create(connection_string: &str, max_size: u32) -> crate::Result<ConnectionPool> {
        // Initialise root certificate store using Mozilla root certificates
        let mut root_store = rustls::RootCertStore::empty();
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

        // Create tls config, using root cert store
        let config = rustls::ClientConfig::builder_with_provider(Arc::new(
            rustls::crypto::ring::default_provider(),
        ))
        .with_safe_default_protocol_versions()?
        .with_root_certificates(root_store)
        .with_no_client_auth();
        let tls = MakeRustlsConnect::new(config);

        // Servers without TLS are still reached, as sslmode defaults to prefer
        let manager = PostgresConnectionManager::new_from_stringlike(connection_string, tls)
            .map_err(DatabaseQueryError)?;
        let pool = Pool::builder().max_size(max_size).build(manager).await?;
        Ok(ConnectionPool(pool))
    }

    pub async fn get_connection(&self) -> crate::Result<Connection> {
        Ok(self.0.get_owned().await?)
    }
}

// Initialise the database from the schema script
pub async fn initialise(connection: &Connection, script: &Path) -> crate::Result<()> {
    let initialisation_script = fs::read_to_string(script).await?;
    connection
        .batch_execute(initialisation_script.as_str())
        .await
        .map_err(DatabaseInitialisationError)?;
    Ok(())
}

pub async fn healthy(connection: &Connection) -> crate::Result<()> {
    connection
        .execute("SELECT 1", &[])
        .await
        .map_err(DatabaseQueryError)?;
    Ok(())
}

pub mod registrations {
    use crate::db::Connection;
    use crate::error::Error;
    use crate::models::{NewRegistration, Registration};
    use tokio_postgres::Row;

    const CREATE_COMMAND: &str = "INSERT INTO registrations \
        (first_name, last_name, mobile_number, email, company, position) \
        VALUES ($1, $2, $3, $4, $5, $6) RETURNING *";
    const BY_EMAIL_QUERY: &str = "SELECT * FROM registrations WHERE email = $1";
    const ALL_QUERY: &str = "SELECT * FROM registrations ORDER BY created_at DESC, id DESC";

    pub async fn create(
        connection: &Connection,
        registration: &NewRegistration,
    ) -> crate::Result<Registration> {
        let row = connection
            .query_one(
                CREATE_COMMAND,
                &[
                    &registration.first_name,
                    &registration.last_name,
                    &registration.mobile_number,
                    &registration.email,
                    &registration.company,
                    &registration.position,
                ],
            )
            .await
            .map_err(Error::from_query)?;
        to_registration(&row)
    }

    pub async fn by_email(
        connection: &Connection,
        email: &str,
    ) -> crate::Result<Option<Registration>> {
        let row = connection
            .query_opt(BY_EMAIL_QUERY, &[&email])
            .await
            .map_err(Error::from_query)?;
        row.as_ref().map(to_registration).transpose()
    }

    pub async fn all(connection: &Connection) -> crate::Result<Vec<Registration>> {
        let rows = connection
            .query(ALL_QUERY, &[])
            .await
            .map_err(Error::from_query)?;
        rows.iter().map(to_registration).collect()
    }

    fn to_registration(row: &Row) -> crate::Result<Registration> {
        Ok(Registration {
            id: row.try_get("id")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            mobile_number: row.try_get("mobile_number")?,
            email: row.try_get("email")?,
            company: row.try_get("company")?,
            position: row.try_get("position")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// [`RegistrationStore`] backed by the `registrations` table.
pub struct PostgresStore {
    pool: ConnectionPool,
}

impl PostgresStore {
    pub fn new(pool: ConnectionPool) -> Self {
        PostgresStore { pool }
    }
}

#[async_trait]
impl RegistrationStore for PostgresStore {
    async fn insert(&self, registration: &NewRegistration) -> crate::Result<Registration> {
        let connection = self.pool.get_connection().await?;
        registrations::create(&connection, registration).await
    }

    async fn find_by_email(&self, email: &str) -> crate::Result<Option<Registration>> {
        let connection = self.pool.get_connection().await?;
        registrations::by_email(&connection, email).await
    }

    async fn list(&self) -> crate::Result<Vec<Registration>> {
        let connection = self.pool.get_connection().await?;
        registrations::all(&connection).await
    }

    async fn ping(&self) -> crate::Result<()> {
        let connection = self.pool.get_connection().await?;
        healthy(&connection).await
    }
}
