use anyhow::Result;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, RuntimeErr, SqlErr, Statement,
};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::entities::prelude::*;

pub mod migrator;
pub mod repositories;

pub use repositories::applicant::{ApplicantChanges, ApplicantRepository, ApplicantWithScores};
pub use repositories::user::{User, UserChanges, UserRepository};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite://").trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    #[must_use]
    pub fn user_repo(&self) -> UserRepository {
        UserRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn applicant_repo(&self) -> ApplicantRepository {
        ApplicantRepository::new(self.conn.clone())
    }

    pub async fn count_users(&self) -> Result<u64> {
        Ok(Users::find().count(&self.conn).await?)
    }

    pub async fn count_applicants(&self) -> Result<u64> {
        Ok(Applicants::find().count(&self.conn).await?)
    }

    pub async fn count_scores(&self) -> Result<u64> {
        Ok(Scores::find().count(&self.conn).await?)
    }
}

/// SQLite raises 787 for a plain FK failure and 1811 when a RESTRICT action fires.
const SQLITE_FOREIGN_KEY_CODES: [&str; 2] = ["787", "1811"];

fn db_err(err: &anyhow::Error) -> Option<&DbErr> {
    err.chain().find_map(|cause| cause.downcast_ref::<DbErr>())
}

fn sql_err(err: &anyhow::Error) -> Option<SqlErr> {
    db_err(err).and_then(DbErr::sql_err)
}

fn sqlite_code(err: &anyhow::Error) -> Option<String> {
    match db_err(err)? {
        DbErr::Exec(RuntimeErr::SqlxError(e)) | DbErr::Query(RuntimeErr::SqlxError(e)) => e
            .as_database_error()
            .and_then(|db| db.code())
            .map(std::borrow::Cow::into_owned),
        _ => None,
    }
}

/// True when the error was raised by a unique index.
#[must_use]
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    matches!(sql_err(err), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// True when the error was raised by a foreign key.
#[must_use]
pub fn is_foreign_key_violation(err: &anyhow::Error) -> bool {
    matches!(sql_err(err), Some(SqlErr::ForeignKeyConstraintViolation(_)))
        || sqlite_code(err).is_some_and(|code| SQLITE_FOREIGN_KEY_CODES.contains(&code.as_str()))
}
