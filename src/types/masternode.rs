use serde::{Deserialize, Serialize};

/// Collateral UTXO and the key path that controls it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Collateral {
    pub address: String,
    pub spath: u32,
    #[serde(rename = "pubKey")]
    pub pubkey: String,
    pub txid: String,
    pub txidn: u32,
}

/// A fully specified masternode record. `name` is its storage key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Masternode {
    pub name: String,
    pub ip: String,
    pub port: u16,
    pub mn_priv_key: String,
    pub hw_acc: u32,
    pub is_testnet: bool,
    pub is_hardware: bool,
    #[serde(default)]
    pub collateral: Collateral,
}

/// Fallback values used to complete a partially specified masternode.
pub type MasternodeTemplate = Masternode;

impl Default for Masternode {
    fn default() -> Self {
        Self {
            name: String::new(),
            ip: String::new(),
            port: 51472,
            mn_priv_key: String::new(),
            hw_acc: 0,
            is_testnet: false,
            is_hardware: true,
            collateral: Collateral::default(),
        }
    }
}

/// Caller-supplied masternode data where any field may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MasternodeDraft {
    pub name: Option<String>,
    pub ip: Option<String>,
    pub port: Option<u16>,
    pub mn_priv_key: Option<String>,
    pub hw_acc: Option<u32>,
    pub is_testnet: Option<bool>,
    pub is_hardware: Option<bool>,
    pub collateral: Option<Collateral>,
}

impl MasternodeDraft {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Fill every missing field from `template`.
    pub fn complete(self, template: &MasternodeTemplate) -> Masternode {
        Masternode {
            name: self.name.unwrap_or_else(|| template.name.clone()),
            ip: self.ip.unwrap_or_else(|| template.ip.clone()),
            port: self.port.unwrap_or(template.port),
            mn_priv_key: self
                .mn_priv_key
                .unwrap_or_else(|| template.mn_priv_key.clone()),
            hw_acc: self.hw_acc.unwrap_or(template.hw_acc),
            is_testnet: self.is_testnet.unwrap_or(template.is_testnet),
            is_hardware: self.is_hardware.unwrap_or(template.is_hardware),
            collateral: self
                .collateral
                .unwrap_or_else(|| template.collateral.clone()),
        }
    }
}

impl From<Masternode> for MasternodeDraft {
    fn from(mn: Masternode) -> Self {
        Self {
            name: Some(mn.name),
            ip: Some(mn.ip),
            port: Some(mn.port),
            mn_priv_key: Some(mn.mn_priv_key),
            hw_acc: Some(mn.hw_acc),
            is_testnet: Some(mn.is_testnet),
            is_hardware: Some(mn.is_hardware),
            collateral: Some(mn.collateral),
        }
    }
}
