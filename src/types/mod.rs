pub mod masternode;
pub mod rpc;

pub use masternode::{Collateral, Masternode, MasternodeDraft, MasternodeTemplate};
pub use rpc::{RpcServer, RpcServerKind, RpcServerRecord};
