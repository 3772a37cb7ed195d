//! Keyed slot stores mapping logical identities to visual handles.
//!
//! One registry exists per entity class. A slot owns the handle it created:
//! the handle is destroyed before the slot is reused or the table cleared,
//! and no two live slots in one registry share a key.

use std::collections::BTreeMap;

use rescue_replay_core::{
    EntityKind, Event, Facing, ReplayError, SceneClass, SlotKey, VisualHandle, VisualSink,
    WorldPosition,
};

/// One live visual instance owned by a registry slot.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Slot {
    pub(crate) handle: VisualHandle,
    pub(crate) position: WorldPosition,
}

/// Ordered slot table for one entity class.
#[derive(Debug)]
pub(crate) struct Registry {
    kind: EntityKind,
    capacity: Option<usize>,
    slots: BTreeMap<SlotKey, Slot>,
}

impl Registry {
    pub(crate) fn unbounded(kind: EntityKind) -> Self {
        Self {
            kind,
            capacity: None,
            slots: BTreeMap::new(),
        }
    }

    pub(crate) fn bounded(kind: EntityKind, capacity: usize) -> Self {
        Self {
            kind,
            capacity: Some(capacity),
            slots: BTreeMap::new(),
        }
    }

    pub(crate) fn get(&self, key: SlotKey) -> Option<&Slot> {
        self.slots.get(&key)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&SlotKey, &Slot)> {
        self.slots.iter()
    }

    /// Creates a visual for an absent key or moves the existing one.
    ///
    /// The distinction is the registry's core correctness property: an entity
    /// present under the same key in consecutive frames is moved, never
    /// destroyed and recreated.
    pub(crate) fn upsert<S: VisualSink>(
        &mut self,
        key: SlotKey,
        class: SceneClass,
        position: WorldPosition,
        facing: Facing,
        sink: &mut S,
        out_events: &mut Vec<Event>,
    ) -> Result<VisualHandle, ReplayError> {
        if let Some(slot) = self.slots.get_mut(&key) {
            slot.position = position;
            sink.relocate(slot.handle, position);
            return Ok(slot.handle);
        }

        if let Some(capacity) = self.capacity {
            if self.slots.len() >= capacity {
                return Err(ReplayError::CapacityExceeded {
                    kind: self.kind,
                    max: capacity,
                });
            }
        }

        let handle = sink.spawn(class, key, position, facing);
        let _ = self.slots.insert(key, Slot { handle, position });
        out_events.push(Event::EntityCreated {
            kind: self.kind,
            key,
        });
        Ok(handle)
    }

    /// Moves an existing slot without emitting lifecycle events.
    ///
    /// Used by the per-tick interpolation, which repositions agents many
    /// times per logical step.
    pub(crate) fn relocate<S: VisualSink>(
        &mut self,
        key: SlotKey,
        position: WorldPosition,
        sink: &mut S,
    ) -> Option<VisualHandle> {
        let slot = self.slots.get_mut(&key)?;
        slot.position = position;
        sink.relocate(slot.handle, position);
        Some(slot.handle)
    }

    /// Destroys every live handle and clears the table.
    ///
    /// Calling this on an empty registry does nothing, so repeated resets
    /// never issue duplicate destroy calls.
    pub(crate) fn remove_all<S: VisualSink>(&mut self, sink: &mut S, out_events: &mut Vec<Event>) {
        for (key, slot) in std::mem::take(&mut self.slots) {
            sink.destroy(slot.handle);
            out_events.push(Event::EntityRemoved {
                kind: self.kind,
                key,
            });
        }
    }
}
