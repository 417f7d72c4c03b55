use serde::{Deserialize, Serialize};

/// Which RPC server table a record lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RpcServerKind {
    Public,
    Custom,
}

impl RpcServerKind {
    pub fn is_custom(self) -> bool {
        matches!(self, RpcServerKind::Custom)
    }
}

/// Connection tuple for one RPC endpoint, as supplied by configuration or the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcServer {
    pub protocol: String,
    pub host: String,
    pub user: String,
    pub password: String,
}

impl RpcServer {
    pub fn new(
        protocol: impl Into<String>,
        host: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            protocol: protocol.into(),
            host: host.into(),
            user: user.into(),
            password: password.into(),
        }
    }
}

/// A stored RPC server row, tagged with its table of origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcServerRecord {
    pub id: i64,
    pub protocol: String,
    pub host: String,
    pub user: String,
    pub password: String,
    pub is_custom: bool,
}

impl RpcServerRecord {
    pub fn server(&self) -> RpcServer {
        RpcServer {
            protocol: self.protocol.clone(),
            host: self.host.clone(),
            user: self.user.clone(),
            password: self.password.clone(),
        }
    }
}
