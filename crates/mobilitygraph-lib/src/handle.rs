use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::info;

use crate::db::load_entity_store;
use crate::error::Result;
use crate::graph::GraphBuildOptions;
use crate::routing::Router;

/// Shared, swappable reference to the active [`Router`].
///
/// Requests take an `Arc` snapshot with [`RouterHandle::current`] and keep
/// using it even if a rebuild swaps in a new router meanwhile. The lock is
/// only held for the pointer copy, never during routing.
#[derive(Debug)]
pub struct RouterHandle {
    active: RwLock<Arc<Router>>,
}

impl RouterHandle {
    pub fn new(router: Router) -> Self {
        Self {
            active: RwLock::new(Arc::new(router)),
        }
    }

    /// Snapshot of the router serving new requests.
    pub fn current(&self) -> Arc<Router> {
        let guard = self.active.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Swap in a fully built router, returning the previous one.
    pub fn replace(&self, router: Router) -> Arc<Router> {
        let mut guard = self.active.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, Arc::new(router))
    }

    /// Load `db_path`, build a new router off to the side, then swap it in.
    ///
    /// On error the active router is left untouched.
    pub fn rebuild_from(&self, db_path: &Path, options: &GraphBuildOptions) -> Result<()> {
        let store = load_entity_store(db_path)?;
        let router = Router::from_store(store, options);
        let nodes = router.graph().node_count();
        self.replace(router);
        info!(nodes, path = %db_path.display(), "router replaced");
        Ok(())
    }
}
