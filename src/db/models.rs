use crate::error::StoreError;
use crate::types::{Collateral, Masternode, RpcServerKind, RpcServerRecord};
use sqlx::FromRow;

/// Row of either RPC server table.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DbRpcServer {
    pub id: i64,
    pub protocol: Option<String>,
    pub host: Option<String>,
    pub user: Option<String>,
    pub pass: Option<String>,
}

impl DbRpcServer {
    pub fn into_record(self, kind: RpcServerKind) -> RpcServerRecord {
        RpcServerRecord {
            id: self.id,
            protocol: self.protocol.unwrap_or_default(),
            host: self.host.unwrap_or_default(),
            user: self.user.unwrap_or_default(),
            password: self.pass.unwrap_or_default(),
            is_custom: kind.is_custom(),
        }
    }
}

/// Row of `MASTERNODES`, collateral columns flattened.
#[derive(Debug, Clone, PartialEq, FromRow)]
#[sqlx(rename_all = "camelCase")]
pub struct DbMasternode {
    pub name: String,
    pub ip: Option<String>,
    pub port: Option<i64>,
    pub mn_priv_key: Option<String>,
    pub hw_acc: Option<i64>,
    pub is_testnet: Option<i64>,
    pub is_hardware: Option<i64>,
    pub address: Option<String>,
    pub spath: Option<i64>,
    pub pubkey: Option<String>,
    pub txid: Option<String>,
    pub txidn: Option<i64>,
}

impl TryFrom<DbMasternode> for Masternode {
    type Error = StoreError;

    fn try_from(row: DbMasternode) -> Result<Self, Self::Error> {
        Ok(Masternode {
            name: row.name,
            ip: row.ip.unwrap_or_default(),
            port: narrow(row.port)?,
            mn_priv_key: row.mn_priv_key.unwrap_or_default(),
            hw_acc: narrow(row.hw_acc)?,
            is_testnet: row.is_testnet.unwrap_or(0) > 0,
            is_hardware: row.is_hardware.unwrap_or(0) > 0,
            collateral: Collateral {
                address: row.address.unwrap_or_default(),
                spath: narrow(row.spath)?,
                pubkey: row.pubkey.unwrap_or_default(),
                txid: row.txid.unwrap_or_default(),
                txidn: narrow(row.txidn)?,
            },
        })
    }
}

/// Convert a nullable INTEGER column into a narrower unsigned field.
fn narrow<T>(value: Option<i64>) -> Result<T, StoreError>
where
    T: TryFrom<i64> + Default,
    T::Error: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(v) => T::try_from(v).map_err(|e| sqlx::Error::Decode(Box::new(e)).into()),
        None => Ok(T::default()),
    }
}
