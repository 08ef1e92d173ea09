//! Creation-ordered registry of contexts.
//!
//! Ids are handed out sequentially and never reused, so an id doubles as the
//! creation sequence number and [`created`](ContextRegistry::created) is
//! simply the number of ids issued. Removing an entry leaves a vacant slot
//! behind that is never reclaimed. Entries are boxed, so a vacant slot costs
//! one word whatever the size of `T`.

/// Identifier of a context within the registry that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(pub(crate) usize);

impl ContextId {
    /// Returns the creation sequence number of the context.
    pub fn index(self) -> usize {
        self.0
    }
}

type Slot<T> = Option<Box<T>>;

#[derive(Debug)]
pub struct ContextRegistry<T> {
    slots: Vec<Slot<T>>,
    len: usize,
}

impl<T> ContextRegistry<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            len: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            len: 0,
        }
    }

    pub fn insert(&mut self, value: T) -> ContextId {
        self.slots.push(Some(Box::new(value)));
        self.len += 1;
        ContextId(self.slots.len() - 1)
    }

    pub fn remove(&mut self, id: ContextId) -> Option<T> {
        let slot = self.slots.get_mut(id.0)?;
        let value = slot.take()?;
        self.len -= 1;
        Some(*value)
    }

    pub fn get(&self, id: ContextId) -> Option<&T> {
        self.slots.get(id.0).and_then(|slot| slot.as_deref())
    }

    pub fn get_mut(&mut self, id: ContextId) -> Option<&mut T> {
        self.slots.get_mut(id.0).and_then(|slot| slot.as_deref_mut())
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of entries ever inserted, removed ones included.
    pub fn created(&self) -> usize {
        self.slots.len()
    }

    /// Live entries in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (ContextId, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_deref().map(|value| (ContextId(idx), value)))
    }
}

impl<T> Default for ContextRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
