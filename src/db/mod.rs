//! Database module: the store, its schema, and the entity repositories.
//!
//! Layout:
//! - `store.rs`: lifecycle (open/close) and cursor leasing under one lock
//! - `schema.rs`: SQL DDL, the `Table` enum and default-row seeding
//! - `models.rs`: Rust structs mirroring DB rows and conversions
//! - `rpc_servers.rs` / `masternodes.rs`: repositories over the cursor protocol

pub mod masternodes;
pub mod models;
pub mod rpc_servers;
pub mod schema;
pub mod store;

pub use masternodes::MasternodeRepository;
pub use models::{DbMasternode, DbRpcServer};
pub use rpc_servers::RpcServerRepository;
pub use schema::{SQLITE_INIT, Table};
pub use store::{ActiveSession, Cursor, Store};

impl Store {
    pub fn rpc_servers(&self) -> RpcServerRepository<'_> {
        RpcServerRepository::new(self)
    }

    pub fn masternodes(&self) -> MasternodeRepository<'_> {
        MasternodeRepository::new(self)
    }
}
