// Layer 2: Third-party crate imports
use dashmap::DashMap;
use parking_lot::RwLock;
use uuid::Uuid;

// Layer 3: Internal module imports
use super::consumer::Consumer;
use crate::util::Address;

/// All consumers registered at one address.
///
/// Point-to-point delivery (`Bus::send`) always targets the
/// first-registered consumer — fan-out (`Bus::publish`) just iterates
/// every consumer instead.
#[derive(Default)]
pub(crate) struct ConsumerGroup {
    consumers: Vec<Consumer>,
}

impl ConsumerGroup {
    fn push(&mut self, consumer: Consumer) {
        self.consumers.push(consumer);
    }

    fn remove(&mut self, id: Uuid) -> Option<Consumer> {
        let index = self.consumers.iter().position(|c| c.id() == id)?;
        Some(self.consumers.remove(index))
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.consumers.is_empty()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Consumer> {
        self.consumers.iter()
    }

    /// Pick the first-registered consumer.
    pub(crate) fn pick(&self) -> Option<&Consumer> {
        self.consumers.first()
    }

    /// Take every consumer out of this group, leaving it empty. Used by
    /// [`Bus::close`](super::core::Bus::close) to tear the whole
    /// registry down.
    fn take_all(&mut self) -> Vec<Consumer> {
        std::mem::take(&mut self.consumers)
    }
}

/// Lock-free address -> consumer-group map.
///
/// Sharded internally by `dashmap`, so registering/removing a consumer at
/// one address never contends with operations on a different address.
pub(crate) type Registry = DashMap<Address, RwLock<ConsumerGroup>>;

pub(crate) fn register(registry: &Registry, address: Address, consumer: Consumer) {
    registry
        .entry(address)
        .or_default()
        .write()
        .push(consumer);
}

/// Remove and return the consumer with `id` at `address`, pruning the
/// address's entry entirely once its last consumer is gone.
pub(crate) fn unregister(registry: &Registry, address: &Address, id: Uuid) -> Option<Consumer> {
    let removed = registry.get(address).and_then(|group| group.write().remove(id));
    if let Some(group) = registry.get(address) {
        if group.read().is_empty() {
            drop(group);
            registry.remove(address);
        }
    }
    removed
}

/// Remove every address from the registry and return every consumer
/// that was registered anywhere, for [`Bus::close`](super::core::Bus::close).
pub(crate) fn drain_all(registry: &Registry) -> Vec<Consumer> {
    let addresses: Vec<Address> = registry.iter().map(|entry| entry.key().clone()).collect();
    let mut drained = Vec::new();
    for address in addresses {
        if let Some((_, group)) = registry.remove(&address) {
            drained.extend(group.write().take_all());
        }
    }
    drained
}
