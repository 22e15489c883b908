use crate::archetypes::ArchetypeId;
use crate::entities::EntityId;

/// Marks a slot that does not currently map to a live entity,
/// and terminates the free list.
const NONE: u32 = u32::MAX;

#[derive(Copy, Clone)]
pub(crate) struct EntityMapping {
	generation: u32,
	archetype: u32,
	/// The entity's slot within its archetype,
	/// or the next free mapping when the slot is unused.
	index: u32,
}

/// Maps stable [entity ids](EntityId) to their current archetype and slot.
///
/// Free mappings are chained through their `index` field.
pub(crate) struct EntityMapper {
	mappings: Vec<EntityMapping>,
	free_head: u32,
	live: usize,
	/// Slots at or past this index are never handed out.
	limit: u32,
}

impl EntityMapper {
	pub fn new() -> Self {
		Self {
			mappings: Vec::new(),
			free_head: NONE,
			live: 0,
			limit: NONE,
		}
	}

	#[cfg(test)]
	pub(crate) fn with_limit(limit: u32) -> Self {
		Self { limit, ..Self::new() }
	}

	/// Allocates a new [EntityId] pointing at the given location.
	pub fn allocate(&mut self, archetype: ArchetypeId, index: u32) -> EntityId {
		if self.free_head != NONE {
			let slot = self.free_head;
			let mapping = &mut self.mappings[slot as usize];
			self.free_head = mapping.index;

			mapping.archetype = archetype.index;
			mapping.index = index;
			self.live += 1;
			return EntityId::new(slot, mapping.generation);
		}

		let slot = self.mappings.len();
		assert!(slot < self.limit as usize, "Ran out of entity ids");

		self.mappings.push(EntityMapping {
			generation: 1,
			archetype: archetype.index,
			index,
		});
		self.live += 1;
		EntityId::new(slot as u32, 1)
	}

	/// Invalidates `entity` and makes its slot available again.
	/// Does nothing if `entity` is not valid.
	pub fn recycle(&mut self, entity: EntityId) {
		if !self.is_valid(entity) {
			return;
		}

		self.live -= 1;
		let slot = entity.index();
		let mapping = &mut self.mappings[slot as usize];
		mapping.archetype = NONE;

		match mapping.generation.checked_add(1) {
			Some(generation) => {
				mapping.generation = generation;
				mapping.index = self.free_head;
				self.free_head = slot;
			},
			// The slot can't be told apart from its past lives anymore, keep it out of circulation.
			None => {
				mapping.index = NONE;
				tracing::warn!(slot, "entity slot exhausted its generations and was retired");
			},
		}
	}

	#[inline(always)]
	pub fn is_valid(&self, entity: EntityId) -> bool {
		self.resolve(entity).is_some()
	}

	/// Returns the archetype and slot `entity` currently lives in.
	#[inline]
	pub fn resolve(&self, entity: EntityId) -> Option<(ArchetypeId, u32)> {
		let mapping = self.mappings.get(entity.index() as usize)?;
		if mapping.generation != entity.generation() || mapping.archetype == NONE {
			return None;
		}

		Some((ArchetypeId { index: mapping.archetype }, mapping.index))
	}

	/// Updates the slot of an entity that moved within its archetype.
	pub fn set_index(&mut self, entity: EntityId, index: u32) {
		debug_assert!(self.is_valid(entity));
		self.mappings[entity.index() as usize].index = index;
	}

	/// Updates the location of an entity that moved to another archetype.
	pub fn set_location(&mut self, entity: EntityId, archetype: ArchetypeId, index: u32) {
		debug_assert!(self.is_valid(entity));
		let mapping = &mut self.mappings[entity.index() as usize];
		mapping.archetype = archetype.index;
		mapping.index = index;
	}

	/// The number of live entities.
	pub fn len(&self) -> usize {
		self.live
	}

	/// The number of mapping slots ever allocated.
	#[cfg(test)]
	pub fn capacity(&self) -> usize {
		self.mappings.len()
	}

	#[cfg(test)]
	pub(crate) fn set_generation(&mut self, slot: u32, generation: u32) {
		self.mappings[slot as usize].generation = generation;
	}
}
