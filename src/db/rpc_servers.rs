use crate::db::models::DbRpcServer;
use crate::db::schema::{self, Table};
use crate::db::store::Store;
use crate::error::StoreError;
use crate::types::{RpcServer, RpcServerKind, RpcServerRecord};
use tracing::debug;

fn table_of(kind: RpcServerKind) -> Table {
    match kind {
        RpcServerKind::Public => Table::PublicRpcServers,
        RpcServerKind::Custom => Table::CustomRpcServers,
    }
}

/// CRUD over the public and custom RPC server tables.
///
/// Every successful change to the custom table notifies the store listener
/// after the transaction has committed.
#[derive(Clone, Copy)]
pub struct RpcServerRepository<'s> {
    store: &'s Store,
}

impl<'s> RpcServerRepository<'s> {
    pub fn new(store: &'s Store) -> Self {
        Self { store }
    }

    /// Delete every row of `table`. Clearing either RPC server table reseeds
    /// the default rows in the same transaction.
    pub async fn clear(&self, table: Table) -> Result<(), StoreError> {
        let mut cursor = self.store.acquire_cursor("clear_table").await?;
        let cfg = self.store.config();
        let outcome = async {
            let conn = cursor.conn();
            sqlx::query(&format!("DELETE FROM {}", table.as_str()))
                .execute(&mut *conn)
                .await?;
            if table != Table::Masternodes {
                schema::seed_rpc_servers(conn, &cfg.trusted_rpc_servers, &cfg.local_rpc_server)
                    .await?;
            }
            Ok::<(), StoreError>(())
        }
        .await;
        self.store.finish(cursor, outcome, table).await?;

        debug!(table = %table, "table cleared");
        if table == Table::CustomRpcServers {
            self.store.notify_rpc_servers_changed();
        }
        Ok(())
    }

    /// Insert a custom server and return its assigned id.
    pub async fn add(&self, server: &RpcServer) -> Result<i64, StoreError> {
        let mut cursor = self.store.acquire_cursor("add_rpc_server").await?;
        let outcome = sqlx::query(
            "INSERT INTO CUSTOM_RPC_SERVERS (protocol, host, user, pass) VALUES (?, ?, ?, ?)",
        )
        .bind(server.protocol.as_str())
        .bind(server.host.as_str())
        .bind(server.user.as_str())
        .bind(server.password.as_str())
        .execute(cursor.conn())
        .await
        .map(|done| done.last_insert_rowid())
        .map_err(StoreError::from);
        let id = self.store.finish(cursor, outcome, &server.host).await?;

        debug!(id, host = %server.host, "custom RPC server added");
        self.store.notify_rpc_servers_changed();
        Ok(id)
    }

    /// Overwrite the custom server `id`. Returns false (and notifies no one)
    /// when no such row exists.
    pub async fn edit(&self, id: i64, server: &RpcServer) -> Result<bool, StoreError> {
        let mut cursor = self.store.acquire_cursor("edit_rpc_server").await?;
        let outcome = sqlx::query(
            "UPDATE CUSTOM_RPC_SERVERS SET protocol = ?, host = ?, user = ?, pass = ? WHERE id = ?",
        )
        .bind(server.protocol.as_str())
        .bind(server.host.as_str())
        .bind(server.user.as_str())
        .bind(server.password.as_str())
        .bind(id)
        .execute(cursor.conn())
        .await
        .map(|done| done.rows_affected() > 0)
        .map_err(StoreError::from);
        let updated = self.store.finish(cursor, outcome, id).await?;

        if updated {
            self.store.notify_rpc_servers_changed();
        }
        Ok(updated)
    }

    /// All rows of the selected table, ordered by id.
    pub async fn list(&self, kind: RpcServerKind) -> Result<Vec<RpcServerRecord>, StoreError> {
        let table = table_of(kind);
        let mut cursor = self.store.acquire_cursor("list_rpc_servers").await?;
        let outcome = sqlx::query_as::<_, DbRpcServer>(&format!(
            "SELECT id, protocol, host, user, pass FROM {} ORDER BY id",
            table.as_str()
        ))
        .fetch_all(cursor.conn())
        .await
        .map_err(StoreError::from);
        let rows = self.store.finish(cursor, outcome, table).await?;

        Ok(rows.into_iter().map(|r| r.into_record(kind)).collect())
    }

    /// The single row `id` of the selected table.
    pub async fn get(&self, kind: RpcServerKind, id: i64) -> Result<RpcServerRecord, StoreError> {
        let table = table_of(kind);
        let mut cursor = self.store.acquire_cursor("get_rpc_server").await?;
        let outcome = sqlx::query_as::<_, DbRpcServer>(&format!(
            "SELECT id, protocol, host, user, pass FROM {} WHERE id = ?",
            table.as_str()
        ))
        .bind(id)
        .fetch_optional(cursor.conn())
        .await
        .map_err(StoreError::from)
        .and_then(|row| row.ok_or_else(|| StoreError::not_found("RPC server", id)));
        let row = self.store.finish(cursor, outcome, id).await?;

        Ok(row.into_record(kind))
    }

    /// Delete the custom server `id`. Returns false when no such row exists.
    pub async fn remove(&self, id: i64) -> Result<bool, StoreError> {
        let mut cursor = self.store.acquire_cursor("remove_rpc_server").await?;
        let outcome = sqlx::query("DELETE FROM CUSTOM_RPC_SERVERS WHERE id = ?")
            .bind(id)
            .execute(cursor.conn())
            .await
            .map(|done| done.rows_affected() > 0)
            .map_err(StoreError::from);
        let removed = self.store.finish(cursor, outcome, id).await?;

        if removed {
            self.store.notify_rpc_servers_changed();
        }
        Ok(removed)
    }
}
