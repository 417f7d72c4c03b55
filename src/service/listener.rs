use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Observer told that the custom RPC server table changed.
///
/// Called after the mutating transaction has committed and the store lock has
/// been released. Implementations may read from the store again, but must not
/// block waiting on another store operation that is itself waiting on them.
pub trait RpcServersListener: Send + Sync {
    fn rpc_servers_changed(&self);
}

impl<F> RpcServersListener for F
where
    F: Fn() + Send + Sync,
{
    fn rpc_servers_changed(&self) {
        self()
    }
}

/// Listener that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopListener;

impl RpcServersListener for NoopListener {
    fn rpc_servers_changed(&self) {}
}

/// Listener that only counts notifications.
#[derive(Debug, Default, Clone)]
pub struct CountingListener {
    count: Arc<AtomicUsize>,
}

impl CountingListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl RpcServersListener for CountingListener {
    fn rpc_servers_changed(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}
