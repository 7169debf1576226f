mod error;

pub use error::StoreError;

use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use crate::domain::{
    pagination::Pagination, subscriber::Subscriber, subscriber_email::SubscriberEmail,
    subscriber_update::SubscriberUpdate,
};

/// Persistence of the mailing list. Records are never removed: deleting an
/// address marks it as opted out.
#[derive(Clone, Debug)]
pub struct SubscriberStore {
    db_pool: SqlitePool,
}

impl SubscriberStore {
    pub fn new(db_pool: SqlitePool) -> Self {
        Self { db_pool }
    }

    #[tracing::instrument(name = "Ensure the subscriber table exists", skip(self))]
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS emails (
                id           INTEGER PRIMARY KEY,
                email        TEXT UNIQUE,
                confirmed_at INTEGER,
                opt_out      INTEGER
            )
            "#,
        )
        .execute(&self.db_pool)
        .await
        .map_err(log_failure)?;

        Ok(())
    }

    #[tracing::instrument(
        name = "Insert a new subscriber into the database",
        skip(self),
        fields(subscriber_email = %email)
    )]
    pub async fn create(&self, email: &SubscriberEmail) -> Result<Subscriber, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO emails (email, confirmed_at, opt_out)
            VALUES (?, 0, 0)
            RETURNING id, email, confirmed_at, opt_out
            "#,
        )
        .bind(email.as_ref())
        .try_map(|row: SqliteRow| subscriber_from_row(&row))
        .fetch_one(&self.db_pool)
        .await
        .map_err(log_failure)
    }

    #[tracing::instrument(
        name = "Fetch a subscriber by email",
        skip(self),
        fields(subscriber_email = %email)
    )]
    pub async fn get(&self, email: &SubscriberEmail) -> Result<Option<Subscriber>, StoreError> {
        sqlx::query(
            r#"
            SELECT id, email, confirmed_at, opt_out
            FROM emails
            WHERE email = ?
            "#,
        )
        .bind(email.as_ref())
        .try_map(|row: SqliteRow| subscriber_from_row(&row))
        .fetch_optional(&self.db_pool)
        .await
        .map_err(log_failure)
    }

    /// Inserts the subscriber or replaces its confirmation and opt-out state
    /// in a single statement.
    #[tracing::instrument(
        name = "Upsert a subscriber",
        skip(self, update),
        fields(
            subscriber_email = %update.email,
            opted_out = update.opted_out
        )
    )]
    pub async fn upsert(&self, update: &SubscriberUpdate) -> Result<Subscriber, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO emails (email, confirmed_at, opt_out)
            VALUES (?, ?, ?)
            ON CONFLICT (email) DO UPDATE SET
                confirmed_at = excluded.confirmed_at,
                opt_out = excluded.opt_out
            RETURNING id, email, confirmed_at, opt_out
            "#,
        )
        .bind(update.email.as_ref())
        .bind(update.confirmed_at.map_or(0, |at| at.timestamp()))
        .bind(update.opted_out)
        .try_map(|row: SqliteRow| subscriber_from_row(&row))
        .fetch_one(&self.db_pool)
        .await
        .map_err(log_failure)
    }

    /// Marks the subscriber as opted out. Unknown addresses are left alone
    /// and yield `None`.
    #[tracing::instrument(
        name = "Opt out a subscriber",
        skip(self),
        fields(subscriber_email = %email)
    )]
    pub async fn soft_delete(
        &self,
        email: &SubscriberEmail,
    ) -> Result<Option<Subscriber>, StoreError> {
        sqlx::query(
            r#"
            UPDATE emails
            SET opt_out = 1
            WHERE email = ?
            RETURNING id, email, confirmed_at, opt_out
            "#,
        )
        .bind(email.as_ref())
        .try_map(|row: SqliteRow| subscriber_from_row(&row))
        .fetch_optional(&self.db_pool)
        .await
        .map_err(log_failure)
    }

    /// Active subscribers in creation order.
    #[tracing::instrument(
        name = "Fetch a page of subscribers",
        skip(self, pagination),
        fields(
            page = pagination.page(),
            count = pagination.count()
        )
    )]
    pub async fn get_page(&self, pagination: &Pagination) -> Result<Vec<Subscriber>, StoreError> {
        sqlx::query(
            r#"
            SELECT id, email, confirmed_at, opt_out
            FROM emails
            WHERE opt_out = 0
            ORDER BY id ASC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(pagination.limit())
        .bind(pagination.offset())
        .try_map(|row: SqliteRow| subscriber_from_row(&row))
        .fetch_all(&self.db_pool)
        .await
        .map_err(log_failure)
    }
}

fn subscriber_from_row(row: &SqliteRow) -> Result<Subscriber, sqlx::Error> {
    let confirmed_at: Option<i64> = row.try_get("confirmed_at")?;
    let opt_out: Option<i64> = row.try_get("opt_out")?;

    Ok(Subscriber {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        confirmed_at: confirmed_at_from_seconds(confirmed_at)?,
        opted_out: opt_out.unwrap_or(0) != 0,
    })
}

// Zero and NULL both mean "never confirmed".
fn confirmed_at_from_seconds(seconds: Option<i64>) -> Result<Option<DateTime<Utc>>, sqlx::Error> {
    match seconds {
        None | Some(0) => Ok(None),
        Some(seconds) => DateTime::from_timestamp(seconds, 0)
            .map(Some)
            .ok_or_else(|| {
                sqlx::Error::Decode(format!("{} is not a valid confirmation time", seconds).into())
            }),
    }
}

fn log_failure(err: sqlx::Error) -> StoreError {
    let err = StoreError::from(err);

    if err.is_conflict() {
        tracing::warn!("Rejected duplicated subscriber: {:?}", err);
    } else {
        tracing::error!("Failed to execute query: {:?}", err);
    }

    err
}
