use std::sync::{Arc, Mutex};

use ghost_core::DmrId;
use ghost_entities::dmr::IdLookup;

/// Lookup that records every id it is asked to resolve
#[derive(Clone, Default)]
pub struct MockLookup {
    pub resolved: Arc<Mutex<Vec<DmrId>>>,
}

impl MockLookup {
    pub fn resolved_ids(&self) -> Vec<DmrId> {
        self.resolved.lock().unwrap().clone()
    }
}

impl IdLookup for MockLookup {
    fn resolve(&self, id: DmrId) -> String {
        self.resolved.lock().unwrap().push(id);
        format!("MOCK{}", id)
    }
}
