pub mod listener;

pub use listener::{CountingListener, NoopListener, RpcServersListener};
