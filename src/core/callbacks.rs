use log::{debug, warn};
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::error::{Result, WirecamError};
use crate::types::CallbackId;

/// Hook run once per frame after the camera is committed
pub type UpdateCallback = Rc<dyn Fn() -> anyhow::Result<()>>;

/// Registered per-frame hooks
#[derive(Default)]
pub(crate) struct CallbackBus {
    callbacks: BTreeMap<CallbackId, UpdateCallback>,
    next_id: u64,
}

impl CallbackBus {
    pub fn register(&mut self, callback: UpdateCallback) -> CallbackId {
        let id = CallbackId(self.next_id);
        self.next_id += 1;
        self.callbacks.insert(id, callback);
        id
    }

    pub fn unregister(&mut self, id: CallbackId) -> Result<()> {
        if self.callbacks.remove(&id).is_some() {
            debug!("Wirecam: update callback unregistered {}", id);
            Ok(())
        } else {
            warn!("Wirecam: update callback not found {}", id);
            Err(WirecamError::CallbackNotFound(id))
        }
    }

    /// Callbacks to run this frame; the bus may change while they run
    pub fn snapshot(&self) -> Vec<(CallbackId, UpdateCallback)> {
        self.callbacks
            .iter()
            .map(|(id, callback)| (*id, Rc::clone(callback)))
            .collect()
    }

    pub fn ids(&self) -> Vec<CallbackId> {
        self.callbacks.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }
}
