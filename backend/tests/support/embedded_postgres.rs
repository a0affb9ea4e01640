//! Database provisioning for embedded PostgreSQL suites.
//!
//! Databases are recreated through the cluster's superuser connection so
//! Diesel transaction semantics never interfere with `DROP DATABASE`. The
//! schema always comes from the embedded Diesel migrations.

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use pg_embedded_setup_unpriv::ClusterHandle;
use postgres::{Client, NoTls};

use super::format_postgres_error;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Drop `name` when present and create it empty.
pub fn reset_database(cluster: &ClusterHandle, name: &str) -> Result<(), String> {
    let exists = cluster
        .database_exists(name)
        .map_err(|err| format!("database check: {err:?}"))?;
    if exists {
        cluster
            .drop_database(name)
            .map_err(|err| format!("drop database: {err:?}"))?;
    }
    cluster
        .create_database(name)
        .map_err(|err| format!("create database: {err:?}"))
}

/// Run every pending migration against `url`.
pub fn migrate_schema(url: &str) -> Result<(), String> {
    let mut conn = PgConnection::establish(url).map_err(|err| format!("connect: {err:?}"))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|err| format!("migration: {err:?}"))?;
    Ok(())
}

/// Insert a user row directly and return its generated id.
pub fn seed_user(url: &str, email: &str, name: &str) -> Result<i32, String> {
    let mut client = Client::connect(url, NoTls).map_err(|err| format_postgres_error(&err))?;
    let row = client
        .query_one(
            "INSERT INTO users (email, name, password_hash) VALUES ($1, $2, 'unused') RETURNING id",
            &[&email, &name],
        )
        .map_err(|err| format_postgres_error(&err))?;
    Ok(row.get(0))
}
