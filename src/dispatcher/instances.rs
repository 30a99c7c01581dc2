use super::Dispatcher;
use hashbrown::HashMap as FastHashMap;
use parking_lot::RwLock;
use std::sync::{Arc, OnceLock};

type InstanceMap = FastHashMap<String, Arc<Dispatcher>>;

static INSTANCES: OnceLock<RwLock<InstanceMap>> = OnceLock::new();

fn instances() -> &'static RwLock<InstanceMap> {
    INSTANCES.get_or_init(|| RwLock::new(FastHashMap::new()))
}

/// Returns the dispatcher cached under `key`, creating and caching it with
/// `create` when absent. Callers racing on one key all get the same instance.
pub(crate) fn get_or_insert_with(key: &str, create: impl FnOnce() -> Dispatcher) -> Arc<Dispatcher> {
    if let Some(existing) = lookup(key) {
        return existing;
    }

    let mut guard = instances().write();
    let entry = guard
        .entry(key.to_string())
        .or_insert_with(|| {
            tracing::debug!(instance_key = key, "dispatcher instance cached");
            Arc::new(create())
        });
    Arc::clone(entry)
}

pub(crate) fn lookup(key: &str) -> Option<Arc<Dispatcher>> {
    instances().read().get(key).cloned()
}

pub(crate) fn evict(key: &str) -> Option<Arc<Dispatcher>> {
    instances().write().remove(key)
}

pub(crate) fn clear() {
    instances().write().clear();
}

pub(crate) fn len() -> usize {
    instances().read().len()
}
