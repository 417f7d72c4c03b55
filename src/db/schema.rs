//! SQL DDL and default-row seeding for the store file.
//!
//! The column layout is an on-disk contract: files written by earlier
//! releases must keep opening, so changes here are additive only.

use crate::types::RpcServer;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

/// Every table the store manages. Table names never come from callers as strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    PublicRpcServers,
    CustomRpcServers,
    Masternodes,
}

impl Table {
    pub const ALL: [Table; 3] = [
        Table::PublicRpcServers,
        Table::CustomRpcServers,
        Table::Masternodes,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Table::PublicRpcServers => "PUBLIC_RPC_SERVERS",
            Table::CustomRpcServers => "CUSTOM_RPC_SERVERS",
            Table::Masternodes => "MASTERNODES",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SQLite schema:
/// - both RPC server tables keyed by INTEGER id (rowid alias, auto-assigned on insert)
/// - `MASTERNODES` keyed by name; booleans stored as INTEGER 0/1
/// - collateral columns flattened into the masternode row
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS PUBLIC_RPC_SERVERS(
    id INTEGER PRIMARY KEY, protocol TEXT, host TEXT,
    user TEXT, pass TEXT
);

CREATE TABLE IF NOT EXISTS CUSTOM_RPC_SERVERS(
    id INTEGER PRIMARY KEY, protocol TEXT, host TEXT,
    user TEXT, pass TEXT
);

CREATE TABLE IF NOT EXISTS MASTERNODES(
    name TEXT PRIMARY KEY, ip TEXT, port INTEGER, mnPrivKey TEXT,
    hwAcc INTEGER, isTestnet INTEGER, isHardware INTEGER,
    address TEXT, spath INTEGER, pubkey TEXT, txid TEXT, txidn INTEGER
);
"#;

/// Id reserved for the local wallet entry in `CUSTOM_RPC_SERVERS`.
pub const LOCAL_WALLET_ID: i64 = 0;

/// Create missing tables, then seed the default RPC rows.
pub async fn init_tables(
    conn: &mut SqliteConnection,
    trusted: &[RpcServer],
    local: &RpcServer,
) -> Result<(), sqlx::Error> {
    // one statement per call; sqlx::query does not run batches
    for stmt in SQLITE_INIT.split(';') {
        let s = stmt.trim();
        if s.is_empty() {
            continue;
        }
        sqlx::query(s).execute(&mut *conn).await?;
    }
    seed_rpc_servers(conn, trusted, local).await
}

/// Reset the public servers to exactly `trusted` (ids 0..n) and make sure the
/// local wallet row exists. An edited local wallet row is left untouched.
pub async fn seed_rpc_servers(
    conn: &mut SqliteConnection,
    trusted: &[RpcServer],
    local: &RpcServer,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM PUBLIC_RPC_SERVERS WHERE id >= ?")
        .bind(trusted.len() as i64)
        .execute(&mut *conn)
        .await?;

    if !trusted.is_empty() {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "INSERT OR REPLACE INTO PUBLIC_RPC_SERVERS (id, protocol, host, user, pass) ",
        );
        qb.push_values(trusted.iter().enumerate(), |mut row, (id, s)| {
            row.push_bind(id as i64)
                .push_bind(s.protocol.as_str())
                .push_bind(s.host.as_str())
                .push_bind(s.user.as_str())
                .push_bind(s.password.as_str());
        });
        qb.build().execute(&mut *conn).await?;
    }

    sqlx::query(
        "INSERT OR IGNORE INTO CUSTOM_RPC_SERVERS (id, protocol, host, user, pass) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(LOCAL_WALLET_ID)
    .bind(local.protocol.as_str())
    .bind(local.host.as_str())
    .bind(local.user.as_str())
    .bind(local.password.as_str())
    .execute(&mut *conn)
    .await?;

    Ok(())
}
