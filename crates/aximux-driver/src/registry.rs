//! Process-wide instance registry
//!
//! A bounded table of attached mux instances. The registry owns nothing:
//! slots hold weak references, so a detached (or dropped) device is never
//! kept alive by its bookkeeping. All mutation goes through one lock; there
//! is no ambient global — callers own the registry and pass it where the
//! lifecycle needs it.

use crate::error::{MuxError, Result};
use crate::instance::MuxDevice;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::{Arc, Weak};
use tracing::warn;

/// Most instances a single registry tracks.
pub const MAX_INSTANCES: usize = 32;

/// Bounded table of attached mux instances.
///
/// Instance numbers come from a strictly increasing counter that resets
/// only once the table fully drains; a number is never reused while any
/// instance remains attached.
#[derive(Debug, Default)]
pub struct MuxRegistry {
    inner: Mutex<RegistryTable>,
}

#[derive(Debug, Default)]
struct RegistryTable {
    slots: BTreeMap<u32, Weak<MuxDevice>>,
    next_number: u32,
}

impl MuxRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a slot and publish a device under a fresh instance number.
    ///
    /// `build` runs under the registry lock with the assigned number; the
    /// finished device becomes visible to lookups in the same critical
    /// section, so readers never observe a half-attached instance.
    pub(crate) fn attach<F>(&self, build: F) -> Result<Arc<MuxDevice>>
    where
        F: FnOnce(u32) -> MuxDevice,
    {
        let mut table = self.inner.lock();

        if table.slots.len() >= MAX_INSTANCES {
            return Err(MuxError::Capacity {
                capacity: MAX_INSTANCES,
            });
        }

        let number = table.next_number;
        let device = Arc::new(build(number));
        table.slots.insert(number, Arc::downgrade(&device));
        table.next_number += 1;

        Ok(device)
    }

    /// Release the slot of `instance_number`.
    ///
    /// Idempotent: releasing an unknown or already-released number is a
    /// warning-level no-op, never an error.
    pub fn detach(&self, instance_number: u32) {
        let mut table = self.inner.lock();

        if table.slots.remove(&instance_number).is_none() {
            warn!("detach of unknown mux instance {instance_number}");
        }

        if table.slots.is_empty() {
            table.next_number = 0;
        }
    }

    /// Number of currently attached instances.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn count(&self) -> u32 {
        // Bounded by MAX_INSTANCES, far below u32::MAX.
        self.inner.lock().slots.len() as u32
    }

    /// Look up an attached instance by number.
    ///
    /// Returns `None` for unknown numbers and for instances whose last
    /// owner already dropped them.
    #[must_use]
    pub fn get(&self, instance_number: u32) -> Option<Arc<MuxDevice>> {
        self.inner.lock().slots.get(&instance_number)?.upgrade()
    }

    /// Instance numbers currently in use, ascending.
    #[must_use]
    pub fn instance_numbers(&self) -> Vec<u32> {
        self.inner.lock().slots.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MuxConfig;
    use crate::instance::MuxDevice;
    use crate::window::MemWindow;

    fn attach_one(registry: &MuxRegistry) -> Arc<MuxDevice> {
        let config = MuxConfig::from_toml_str(
            r#"
            [[port]]
            name = "sig"
            alternate_names = ["a", "b"]
            direction_control = ["hw_control"]
            "#,
        )
        .expect("config");
        MuxDevice::attach(Box::new(MemWindow::with_capability(4, 1)), &config, registry)
            .expect("attach")
    }

    #[test]
    fn numbers_increase_while_occupied() {
        let registry = MuxRegistry::new();
        let a = attach_one(&registry);
        let b = attach_one(&registry);
        assert_eq!(a.instance_number(), 0);
        assert_eq!(b.instance_number(), 1);

        // Freeing the first slot must not recycle its number mid-lifetime.
        a.detach(&registry);
        let c = attach_one(&registry);
        assert_eq!(c.instance_number(), 2);
        assert_eq!(registry.instance_numbers(), vec![1, 2]);
    }

    #[test]
    fn counter_resets_when_fully_drained() {
        let registry = MuxRegistry::new();
        let a = attach_one(&registry);
        let b = attach_one(&registry);
        a.detach(&registry);
        b.detach(&registry);
        assert_eq!(registry.count(), 0);

        let c = attach_one(&registry);
        assert_eq!(c.instance_number(), 0);
    }

    #[test]
    fn detach_is_idempotent() {
        let registry = MuxRegistry::new();
        let a = attach_one(&registry);
        let number = a.instance_number();
        a.detach(&registry);
        // Second release of the same number is a no-op.
        registry.detach(number);
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn lookup_follows_lifecycle() {
        let registry = MuxRegistry::new();
        let a = attach_one(&registry);
        let number = a.instance_number();

        let found = registry.get(number).expect("attached instance");
        assert_eq!(found.instance_number(), number);

        a.detach(&registry);
        assert!(registry.get(number).is_none());
    }

    #[test]
    fn dropped_device_is_not_resurrected() {
        let registry = MuxRegistry::new();
        let a = attach_one(&registry);
        let number = a.instance_number();
        drop(a);
        // Slot still counted until detach, but the weak reference is dead.
        assert_eq!(registry.count(), 1);
        assert!(registry.get(number).is_none());
        registry.detach(number);
        assert_eq!(registry.count(), 0);
    }
}
