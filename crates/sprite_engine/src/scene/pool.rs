//! Slot-reusing entity container
//!
//! Deletion is logical: an entity is marked deleted and keeps its slot until
//! the next [`EntityPool::insert`] reclaims it. Insert scans from slot 0 for
//! the first free slot and only grows the pool when none is free, so a pool
//! under steady spawn/despawn traffic stops allocating.

use crate::render::{RenderContext, RenderError};

use super::behavior::UpdateContext;
use super::entity::Entity;

/// One pool slot
#[derive(Debug, Clone, Default)]
pub enum Slot {
    /// Never filled, or cleared
    #[default]
    Empty,
    /// Holds an entity, live or deleted
    Occupied(Entity),
}

impl Slot {
    /// Whether an insert may overwrite this slot
    pub fn is_free(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Occupied(entity) => entity.is_deleted(),
        }
    }

    /// The live entity in this slot, if any
    pub fn live(&self) -> Option<&Entity> {
        match self {
            Self::Occupied(entity) if !entity.is_deleted() => Some(entity),
            _ => None,
        }
    }

    fn live_mut(&mut self) -> Option<&mut Entity> {
        match self {
            Self::Occupied(entity) if !entity.is_deleted() => Some(entity),
            _ => None,
        }
    }
}

/// Ordered, growable set of entity slots
#[derive(Debug, Clone)]
pub struct EntityPool {
    name: String,
    slots: Vec<Slot>,
}

impl EntityPool {
    /// Empty pool
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_capacity(name, 0)
    }

    /// Empty pool with room for `capacity` slots before reallocating
    pub fn with_capacity(name: impl Into<String>, capacity: usize) -> Self {
        Self {
            name: name.into(),
            slots: Vec::with_capacity(capacity),
        }
    }

    /// Pool name, for logs
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Put `entity` in the first free slot, growing when none is free
    ///
    /// Returns the slot index.
    pub fn insert(&mut self, entity: Entity) -> usize {
        if let Some(index) = self.slots.iter().position(Slot::is_free) {
            self.slots[index] = Slot::Occupied(entity);
            return index;
        }
        self.slots.push(Slot::Occupied(entity));
        self.slots.len() - 1
    }

    /// Number of slots, free ones included
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the pool has no slots
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of live entities
    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.live().is_some()).count()
    }

    /// Slot at `index`
    pub fn slot(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index)
    }

    /// Entity at `index`, deleted or not
    pub fn get(&self, index: usize) -> Option<&Entity> {
        match self.slots.get(index)? {
            Slot::Occupied(entity) => Some(entity),
            Slot::Empty => None,
        }
    }

    /// Mutable entity at `index`, deleted or not
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Entity> {
        match self.slots.get_mut(index)? {
            Slot::Occupied(entity) => Some(entity),
            Slot::Empty => None,
        }
    }

    /// Live entities with their slot index, in slot order
    pub fn iter_live(&self) -> impl Iterator<Item = (usize, &Entity)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.live().map(|entity| (index, entity)))
    }

    /// Mutable live entities with their slot index, in slot order
    pub fn iter_live_mut(&mut self) -> impl Iterator<Item = (usize, &mut Entity)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(index, slot)| slot.live_mut().map(|entity| (index, entity)))
    }

    /// Mark the entity at `index` deleted; returns whether it was live
    pub fn remove(&mut self, index: usize) -> bool {
        match self.slots.get_mut(index).and_then(Slot::live_mut) {
            Some(entity) => {
                entity.mark_deleted();
                true
            }
            None => false,
        }
    }

    /// Empty every slot, keeping the allocation
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = Slot::Empty);
    }

    /// Update every live entity
    pub fn update_all(&mut self, ctx: &mut UpdateContext<'_>) {
        for (_, entity) in self.iter_live_mut() {
            entity.update(ctx);
        }
    }

    /// Draw every live entity; returns the number of draw calls
    pub fn draw_all(&mut self, ctx: &mut RenderContext<'_>) -> Result<usize, RenderError> {
        let mut drawn = 0;
        for (_, entity) in self.iter_live_mut() {
            if entity.draw(ctx)? {
                drawn += 1;
            }
        }
        Ok(drawn)
    }
}
