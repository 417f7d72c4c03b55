use crate::db::models::DbMasternode;
use crate::db::store::Store;
use crate::error::StoreError;
use crate::types::{Masternode, MasternodeDraft};
use sqlx::SqliteConnection;
use tracing::debug;

const SELECT_COLUMNS: &str = "SELECT name, ip, port, mnPrivKey, hwAcc, isTestnet, isHardware, \
     address, spath, pubkey, txid, txidn FROM MASTERNODES";

/// CRUD over `MASTERNODES`, keyed by masternode name.
#[derive(Clone, Copy)]
pub struct MasternodeRepository<'s> {
    store: &'s Store,
}

impl<'s> MasternodeRepository<'s> {
    pub fn new(store: &'s Store) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<Masternode>, StoreError> {
        let mut cursor = self.store.acquire_cursor("list_masternodes").await?;
        let outcome = sqlx::query_as::<_, DbMasternode>(&format!("{SELECT_COLUMNS} ORDER BY name"))
            .fetch_all(cursor.conn())
            .await
            .map_err(StoreError::from)
            .and_then(|rows| rows.into_iter().map(Masternode::try_from).collect());
        self.store.finish(cursor, outcome, "MASTERNODES").await
    }

    pub async fn get(&self, name: &str) -> Result<Masternode, StoreError> {
        let mut cursor = self.store.acquire_cursor("get_masternode").await?;
        let outcome = sqlx::query_as::<_, DbMasternode>(&format!("{SELECT_COLUMNS} WHERE name = ?"))
            .bind(name)
            .fetch_optional(cursor.conn())
            .await
            .map_err(StoreError::from)
            .and_then(|row| row.ok_or_else(|| StoreError::not_found("masternode", name)))
            .and_then(Masternode::try_from);
        self.store.finish(cursor, outcome, name).await
    }

    /// Insert a new masternode. Fails if the name is already taken.
    pub async fn insert(&self, mn: &Masternode) -> Result<(), StoreError> {
        let mut cursor = self.store.acquire_cursor("insert_masternode").await?;
        let outcome = insert_row(cursor.conn(), mn).await;
        self.store.finish(cursor, outcome, &mn.name).await?;
        debug!(name = %mn.name, "masternode added");
        Ok(())
    }

    /// Complete `draft` from the configured template, then either rewrite the
    /// row currently stored as `previous` (possibly renaming it) or insert a new
    /// one. A `previous` name with no stored row also inserts.
    pub async fn upsert(
        &self,
        draft: MasternodeDraft,
        previous: Option<&str>,
    ) -> Result<Masternode, StoreError> {
        let mn = draft.complete(&self.store.config().default_masternode);
        let Some(previous) = previous else {
            self.insert(&mn).await?;
            return Ok(mn);
        };

        let mut cursor = self.store.acquire_cursor("upsert_masternode").await?;
        let outcome = async {
            let conn = cursor.conn();
            let updated = sqlx::query(
                "UPDATE MASTERNODES SET name = ?, ip = ?, port = ?, mnPrivKey = ?, hwAcc = ?, \
                 isTestnet = ?, isHardware = ?, address = ?, spath = ?, pubkey = ?, txid = ?, \
                 txidn = ? WHERE name = ?",
            )
            .bind(mn.name.as_str())
            .bind(mn.ip.as_str())
            .bind(i64::from(mn.port))
            .bind(mn.mn_priv_key.as_str())
            .bind(i64::from(mn.hw_acc))
            .bind(mn.is_testnet as i64)
            .bind(mn.is_hardware as i64)
            .bind(mn.collateral.address.as_str())
            .bind(i64::from(mn.collateral.spath))
            .bind(mn.collateral.pubkey.as_str())
            .bind(mn.collateral.txid.as_str())
            .bind(i64::from(mn.collateral.txidn))
            .bind(previous)
            .execute(&mut *conn)
            .await?
            .rows_affected();
            if updated == 0 {
                insert_row(conn, &mn).await?;
            }
            Ok::<(), StoreError>(())
        }
        .await;
        self.store.finish(cursor, outcome, previous).await?;

        debug!(previous, name = %mn.name, "masternode saved");
        Ok(mn)
    }

    /// Delete the masternode `name`. Returns false when it did not exist.
    pub async fn delete(&self, name: &str) -> Result<bool, StoreError> {
        let mut cursor = self.store.acquire_cursor("delete_masternode").await?;
        let outcome = sqlx::query("DELETE FROM MASTERNODES WHERE name = ?")
            .bind(name)
            .execute(cursor.conn())
            .await
            .map(|done| done.rows_affected() > 0)
            .map_err(StoreError::from);
        self.store.finish(cursor, outcome, name).await
    }
}

async fn insert_row(conn: &mut SqliteConnection, mn: &Masternode) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO MASTERNODES (name, ip, port, mnPrivKey, hwAcc, isTestnet, isHardware, \
         address, spath, pubkey, txid, txidn) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(mn.name.as_str())
    .bind(mn.ip.as_str())
    .bind(i64::from(mn.port))
    .bind(mn.mn_priv_key.as_str())
    .bind(i64::from(mn.hw_acc))
    .bind(mn.is_testnet as i64)
    .bind(mn.is_hardware as i64)
    .bind(mn.collateral.address.as_str())
    .bind(i64::from(mn.collateral.spath))
    .bind(mn.collateral.pubkey.as_str())
    .bind(mn.collateral.txid.as_str())
    .bind(i64::from(mn.collateral.txidn))
    .execute(conn)
    .await?;
    Ok(())
}
