use crate::error::StoreError;
use crate::types::{Masternode, MasternodeTemplate, RpcServer};
use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;

pub static CONFIG: LazyLock<Config> =
    LazyLock::new(|| Config::from_env().expect("FATAL: invalid MNSTORE_* configuration"));

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite file holding every table.
    pub database_file: PathBuf,
    pub loglevel: String,
    /// Emit an `error!` event for every failed storage operation.
    pub log_storage_errors: bool,
    pub busy_timeout_secs: u64,
    /// Built-in public servers, seeded at ids 0.. in order.
    pub trusted_rpc_servers: Vec<RpcServer>,
    /// Local wallet entry kept at id 0 of the custom servers table.
    pub local_rpc_server: RpcServer,
    pub default_masternode: MasternodeTemplate,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_file: PathBuf::from("mnstore.db"),
            loglevel: "info".to_string(),
            log_storage_errors: true,
            busy_timeout_secs: 5,
            trusted_rpc_servers: vec![
                RpcServer::new("https", "rpc-ams.trusted-nodes.net:8080", "mnUser_ams", "ams-public"),
                RpcServer::new("https", "rpc-fra.trusted-nodes.net:8080", "mnUser_fra", "fra-public"),
                RpcServer::new("https", "rpc-nyc.trusted-nodes.net:8080", "mnUser_nyc", "nyc-public"),
            ],
            local_rpc_server: RpcServer::new("http", "127.0.0.1:51473", "rpcUser", "rpcPass"),
            default_masternode: Masternode::default(),
        }
    }
}

impl Config {
    /// Defaults overlaid with `MNSTORE_`-prefixed environment variables.
    pub fn from_env() -> Result<Self, StoreError> {
        let cfg = Figment::from(Serialized::defaults(Config::default()))
            .merge(Env::prefixed("MNSTORE_"))
            .extract()?;
        Ok(cfg)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_secs(self.busy_timeout_secs)
    }

    /// Same configuration pointed at another database file.
    pub fn with_database_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_file = path.into();
        self
    }
}
