pub mod config;
pub mod db;
pub mod error;
pub mod service;
pub mod types;

pub use db::{MasternodeRepository, RpcServerRepository, Store, Table};
pub use error::StoreError;
pub use service::listener::RpcServersListener;
