use anyhow::Result;
use sqlx::{migrate::MigrateDatabase, Sqlite, SqliteConnection, SqlitePool, Transaction};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::info;

/// DbConnection owns the SQLite pool and serializes ledger writes
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
    writer: Arc<Mutex<()>>,
}

/// A write transaction holding the single-writer lock until it is
/// committed or dropped. Dropping without commit rolls back.
pub struct WriteTransaction {
    tx: Transaction<'static, Sqlite>,
    _writer: OwnedMutexGuard<()>,
}

impl WriteTransaction {
    pub fn conn(&mut self) -> &mut SqliteConnection {
        &mut self.tx
    }

    pub async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }
}

impl DbConnection {
    /// Create a new database connection
    pub async fn new(url: &str) -> Result<Self> {
        // Create database if it doesn't exist
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            info!("Creating database at {}", url);
            Sqlite::create_database(url).await?
        }

        let pool = SqlitePool::connect(url).await?;

        Self::setup_schema(&pool).await?;

        Ok(Self {
            pool: Arc::new(pool),
            writer: Arc::new(Mutex::new(())),
        })
    }

    /// Initialize a test database with a unique name
    #[cfg(test)]
    pub async fn init_test() -> Result<Self> {
        let test_id = uuid::Uuid::new_v4().to_string();
        let db_url = format!("file:memdb_{}?mode=memory&cache=shared", test_id);

        Self::new(&db_url).await
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Begin a write transaction. Waits for any other writer to finish first.
    pub async fn begin_write(&self) -> Result<WriteTransaction> {
        let writer = self.writer.clone().lock_owned().await;
        let tx = self.pool.begin().await?;
        Ok(WriteTransaction {
            tx,
            _writer: writer,
        })
    }

    /// Set up the required database schema
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS subscriptions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                service_name TEXT NOT NULL,
                cost REAL NOT NULL CHECK (cost >= 0),
                category TEXT,
                canceled INTEGER NOT NULL DEFAULT 0,
                current_instance_id INTEGER REFERENCES subscription_instances (id)
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS subscription_instances (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                subscription_id INTEGER NOT NULL REFERENCES subscriptions (id),
                period_start TEXT NOT NULL,
                period_end TEXT NOT NULL,
                payment_status TEXT NOT NULL DEFAULT 'pending',
                paid_at TEXT,
                CHECK (period_start < period_end),
                CHECK ((payment_status = 'paid') = (paid_at IS NOT NULL))
            );
            "#,
        )
        .execute(pool)
        .await?;

        // Current-instance fallback scan and per-subscription history
        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_instances_subscription_period
            ON subscription_instances (subscription_id, period_start DESC, id DESC);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS reminders (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                subscription_id INTEGER NOT NULL REFERENCES subscriptions (id),
                send_date TEXT NOT NULL,
                sent INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_reminders_subscription
            ON reminders (subscription_id);
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}
