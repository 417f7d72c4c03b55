use crate::config::Config;
use crate::db::schema;
use crate::error::StoreError;
use crate::service::listener::{NoopListener, RpcServersListener};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{Connection, Executor, SqliteConnection};
use std::fmt::Display;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{Level, debug, error, info};

/// The operation currently holding the store lock.
#[derive(Debug, Clone, Copy)]
pub struct ActiveSession {
    pub operation: &'static str,
    pub started: Instant,
}

impl ActiveSession {
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Shared state, only touched while holding the store lock.
#[derive(Debug, Default)]
struct StoreState {
    is_open: bool,
    active: Option<ActiveSession>,
}

/// Thread-safe handle to the single database file.
///
/// Every operation leases a [`Cursor`]: the lease holds the store lock and a
/// freshly opened connection with an open transaction. Releasing the cursor
/// commits (or rolls back), closes the connection and frees the lock.
pub struct Store {
    options: SqliteConnectOptions,
    config: Config,
    listener: Arc<dyn RpcServersListener>,
    state: Mutex<StoreState>,
}

impl Store {
    pub fn new(config: Config) -> Self {
        let options = SqliteConnectOptions::new()
            .filename(&config.database_file)
            .create_if_missing(true)
            .busy_timeout(config.busy_timeout());
        Self {
            options,
            config,
            listener: Arc::new(NoopListener),
            state: Mutex::new(StoreState::default()),
        }
    }

    /// Replace the change listener for custom RPC servers.
    pub fn with_listener(mut self, listener: Arc<dyn RpcServersListener>) -> Self {
        self.listener = listener;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn path(&self) -> &Path {
        &self.config.database_file
    }

    pub async fn is_open(&self) -> bool {
        self.state.lock().await.is_open
    }

    /// The in-flight operation, if any. Waits for the lock, so from the
    /// caller's point of view this is always `None` between operations.
    pub async fn active_session(&self) -> Option<ActiveSession> {
        self.state.lock().await.active
    }

    /// Create tables, seed default rows, and mark the store open.
    ///
    /// Nothing stays connected afterwards; each later operation opens its own
    /// connection. On failure the store stays closed and `open` may be retried.
    pub async fn open(&self) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        if state.is_open {
            return Err(StoreError::AlreadyOpen);
        }
        debug!(path = %self.path().display(), "trying to open database...");

        let result = async {
            let mut conn = SqliteConnection::connect_with(&self.options).await?;
            conn.execute(sqlx::raw_sql("BEGIN")).await?;
            schema::init_tables(
                &mut conn,
                &self.config.trusted_rpc_servers,
                &self.config.local_rpc_server,
            )
            .await?;
            conn.execute(sqlx::raw_sql("COMMIT")).await?;
            conn.close().await
        }
        .await;

        match result {
            Ok(()) => {
                state.is_open = true;
                info!(path = %self.path().display(), "Database open");
                Ok(())
            }
            Err(e) => {
                let err = StoreError::from(e);
                self.report("open", "schema", &err);
                Err(err)
            }
        }
    }

    pub async fn close(&self) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        if !state.is_open {
            error!(path = %self.path().display(), "Database already closed");
            return Err(StoreError::AlreadyClosed);
        }
        // holding the lock means no cursor is outstanding
        state.active = None;
        state.is_open = false;
        info!(path = %self.path().display(), "Database closed");
        Ok(())
    }

    /// Lease a cursor for `operation`. Waits for any other lease to be released.
    ///
    /// Never call this while already holding a cursor from the same store: the
    /// second call waits on the lock the first one holds.
    pub async fn acquire_cursor(&self, operation: &'static str) -> Result<Cursor<'_>, StoreError> {
        let mut state = self.state.lock().await;
        if !state.is_open {
            return Err(StoreError::ClosedStore);
        }

        // on failure the guard drops here, releasing the lock
        let mut conn = match SqliteConnection::connect_with(&self.options).await {
            Ok(conn) => conn,
            Err(e) => {
                let err = StoreError::from(e);
                self.report(operation, "cursor", &err);
                return Err(err);
            }
        };
        if let Err(e) = conn.execute(sqlx::raw_sql("BEGIN")).await {
            let err = StoreError::from(e);
            self.report(operation, "cursor", &err);
            let _ = conn.close().await;
            return Err(err);
        }

        state.active = Some(ActiveSession {
            operation,
            started: Instant::now(),
        });
        Ok(Cursor {
            conn,
            session: Session { state, operation },
        })
    }

    /// Release `cursor`, committing when `outcome` is `Ok` and rolling back
    /// otherwise. Failures are reported through the diagnostics channel.
    pub(crate) async fn finish<T>(
        &self,
        cursor: Cursor<'_>,
        outcome: Result<T, StoreError>,
        entity: impl Display,
    ) -> Result<T, StoreError> {
        let operation = cursor.operation();
        let released = cursor.release(outcome.is_err()).await;
        let result = match (outcome, released) {
            (Ok(value), Ok(())) => Ok(value),
            (Err(e), _) | (Ok(_), Err(e)) => Err(e),
        };
        if let Err(e) = &result {
            self.report(operation, entity, e);
        }
        result
    }

    pub(crate) fn notify_rpc_servers_changed(&self) {
        self.listener.rpc_servers_changed();
    }

    fn report(&self, operation: &str, entity: impl Display, err: &StoreError) {
        if !self.config.log_storage_errors {
            return;
        }
        if err.diagnostic_level() == Level::ERROR {
            error!(operation, entity = %entity, error = %err, "storage operation failed");
        } else {
            debug!(operation, entity = %entity, error = %err, "lookup found nothing");
        }
    }
}

/// Lock ownership for one lease. Dropping it clears the active session.
struct Session<'s> {
    state: MutexGuard<'s, StoreState>,
    operation: &'static str,
}

impl Session<'_> {
    fn held_for(&self) -> Duration {
        self.state.active.map(|s| s.elapsed()).unwrap_or_default()
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        self.state.active = None;
    }
}

/// A leased connection inside an open transaction.
///
/// Must be finished with [`Cursor::release`]. A cursor dropped without release
/// closes its connection uncommitted, so the transaction is discarded.
pub struct Cursor<'s> {
    conn: SqliteConnection,
    session: Session<'s>,
}

impl Cursor<'_> {
    /// Executor for statements inside this lease.
    pub fn conn(&mut self) -> &mut SqliteConnection {
        &mut self.conn
    }

    pub fn operation(&self) -> &'static str {
        self.session.operation
    }

    /// Commit (or roll back), close the connection and release the lock.
    pub async fn release(self, rolling_back: bool) -> Result<(), StoreError> {
        let Cursor { mut conn, session } = self;

        let result = if !session.state.is_open {
            Err(StoreError::ClosedStore)
        } else {
            let end = if rolling_back { "ROLLBACK" } else { "COMMIT" };
            conn.execute(sqlx::raw_sql(end))
                .await
                .map(|_| ())
                .map_err(StoreError::from)
        };
        let closed = conn.close().await.map_err(StoreError::from);

        debug!(
            operation = session.operation,
            rolled_back = rolling_back,
            held_ms = session.held_for().as_millis() as u64,
            "cursor released"
        );
        drop(session);
        result.and(closed)
    }
}
