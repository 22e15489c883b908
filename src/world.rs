use crate::archetypes::{Archetype, ArchetypeId, ArchetypeStore, Location};
use crate::components::{self, Bundle, Component, ComponentId, ComponentMeta};
use crate::data_structures::{ChunkPool, ChunkPoolStats};
use crate::entities::{EntityId, EntityMapper};
use crate::query::{Query, QuerySet};
use std::sync::atomic::{AtomicU32, Ordering};
use std::marker::PhantomData;
use std::ptr;

static NEXT_ID: AtomicU32 = AtomicU32::new(1);

/// A container for [entities](EntityId) and their associated [components](Component).
///
/// The world owns every archetype, the pool their chunks are taken from and the table mapping
/// entity ids to storage slots. It is the only thing that mutates them.
/// A world is meant to be used from one thread at a time.
pub struct World {
	id: u32,
	entities: EntityMapper,
	pub(crate) archetypes: ArchetypeStore,
	chunks: ChunkPool,
	// Components are type-erased, nothing proves they may cross threads.
	_not_send: PhantomData<*mut u8>,
}

impl World {
	pub fn new() -> Self {
		Self {
			id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
			entities: EntityMapper::new(),
			archetypes: ArchetypeStore::new(),
			chunks: ChunkPool::new(),
			_not_send: PhantomData,
		}
	}

	/// A process-wide unique identifier of this world.
	#[inline(always)]
	pub fn id(&self) -> u32 {
		self.id
	}

	/// Creates a new [entity](EntityId) holding the components in `bundle`.
	///
	/// Panics if the bundle names the same component twice
	/// or more than [MAX_ARCHETYPE_COMPONENTS](crate::MAX_ARCHETYPE_COMPONENTS) components.
	pub fn create_entity<B: Bundle>(&mut self, bundle: B) -> EntityId {
		let mut metas = Vec::new();
		B::metas(&mut metas);

		let (entity, archetype, index) = self.allocate_entity(&mut metas);
		let archetype = self.archetypes.get_mut(archetype);

		// SAFETY: the slot was just allocated and its components are uninitialized.
		unsafe {
			bundle.write(&mut |component| match archetype.row_index(component) {
				Some(row) => archetype.component_ptr(index, row),
				None => unreachable!("Bundle component {:?} is missing from its archetype", component),
			});
		}

		entity
	}

	/// Creates a new [entity](EntityId) by copying type-erased component values.
	///
	/// # Safety
	/// `data[i]` must point to an initialized value of the component described by `components[i]`.
	///
	/// Panics if any of `components` is not the metadata registered under its id.
	pub unsafe fn create_entity_raw(&mut self, components: &[&'static ComponentMeta], data: &[*const u8]) -> EntityId {
		assert_eq!(components.len(), data.len(), "Every component needs exactly one value");
		for meta in components {
			components::assert_registered(meta);
		}

		let mut metas = components.to_vec();
		let (entity, archetype, index) = self.allocate_entity(&mut metas);
		let archetype = self.archetypes.get_mut(archetype);

		for (meta, src) in components.iter().zip(data) {
			match archetype.row_index(meta.id()) {
				Some(row) => meta.copy(archetype.component_ptr(index, row), *src),
				None => unreachable!("Component {:?} is missing from its archetype", meta.id()),
			}
		}

		entity
	}

	/// Deletes an existing [entity](EntityId), destroying all of its components.
	/// Returns *false* if the entity is not alive.
	pub fn delete_entity(&mut self, entity: EntityId) -> bool {
		let Some((archetype, index)) = self.entities.resolve(entity) else {
			return false;
		};

		let archetype = self.archetypes.get_mut(archetype);
		// SAFETY: the mapping is valid, so `index` is a live slot.
		if let Some(moved) = unsafe { archetype.swap_remove(index, true, &mut self.chunks) } {
			self.entities.set_index(moved, index);
		}

		self.entities.recycle(entity);
		true
	}

	/// Add a new [component](Component) to the specified [entity](EntityId),
	/// moving the entity to a new archetype.
	/// If the entity already has a component of the same type, its value is replaced instead.
	///
	/// Returns *false* if the entity is not alive, in which case `value` is dropped.
	pub fn add_component<T: Component>(&mut self, entity: EntityId, value: T) -> bool {
		self.insert_component(entity, T::meta(), move |dst| unsafe { ptr::write(dst.cast::<T>(), value) })
	}

	/// Add a default-constructed [component](Component) to the specified [entity](EntityId).
	pub fn add_component_default<T: Component + Default>(&mut self, entity: EntityId) -> bool {
		self.add_component(entity, T::default())
	}

	/// Copies a type-erased component value onto the specified [entity](EntityId).
	///
	/// # Safety
	/// `data` must point to an initialized value of the component described by `meta`.
	///
	/// Panics if `meta` is not the metadata registered under its id.
	pub unsafe fn add_component_raw(&mut self, entity: EntityId, meta: &'static ComponentMeta, data: *const u8) -> bool {
		components::assert_registered(meta);
		self.insert_component(entity, meta, |dst| meta.copy(dst, data))
	}

	/// Remove a [component](Component) from the specified [entity](EntityId).
	/// The function will return *false* if the entity is not alive or doesn't have the component.
	pub fn remove_component<T: Component>(&mut self, entity: EntityId) -> bool {
		self.remove_component_id(entity, T::component_id())
	}

	/// Remove a component from the specified [entity](EntityId) by id.
	///
	/// Panics if `component` was never registered.
	pub fn remove_component_id(&mut self, entity: EntityId, component: ComponentId) -> bool {
		let meta = components::lookup(component);

		let Some((src, index)) = self.entities.resolve(entity) else {
			return false;
		};
		let Some(dst) = self.archetypes.acquire_without(src, meta.id()) else {
			return false;
		};

		// SAFETY: the target archetype has no component the source lacks.
		unsafe { self.migrate(entity, src, index, dst) };
		true
	}

	/// Gets a reference to a [component](Component) bound to a specific [entity](EntityId).
	pub fn get_component<T: Component>(&self, entity: EntityId) -> Option<&T> {
		let ptr = self.get_component_slow(entity, T::component_id())?;
		unsafe { Some(&*(ptr as *const T)) }
	}

	/// Gets a mutable reference to a [component](Component) bound to a specific [entity](EntityId).
	pub fn get_component_mut<T: Component>(&mut self, entity: EntityId) -> Option<&mut T> {
		let ptr = self.get_component_slow_mut(entity, T::component_id())?;
		unsafe { Some(&mut *(ptr as *mut T)) }
	}

	/// Retrieves a pointer to a component on the specified entity,
	/// or [None] if the entity is not alive or lacks the component.
	///
	/// Every call resolves the entity and searches its layout;
	/// use a [Query] to visit many entities.
	pub fn get_component_slow(&self, entity: EntityId, component: ComponentId) -> Option<*const u8> {
		let (archetype, index) = self.entities.resolve(entity)?;
		let archetype = self.archetypes.get(archetype);
		let row = archetype.row_index(component)?;
		unsafe { Some(archetype.component_ptr_const(index, row)) }
	}

	/// Mutable variant of [get_component_slow](World::get_component_slow).
	pub fn get_component_slow_mut(&mut self, entity: EntityId, component: ComponentId) -> Option<*mut u8> {
		let (archetype, index) = self.entities.resolve(entity)?;
		let archetype = self.archetypes.get_mut(archetype);
		let row = archetype.row_index(component)?;
		unsafe { Some(archetype.component_ptr(index, row)) }
	}

	pub fn has_component<T: Component>(&self, entity: EntityId) -> bool {
		match self.entities.resolve(entity) {
			Some((archetype, _)) => self.archetypes.get(archetype).contains(T::component_id()),
			None => false,
		}
	}

	#[inline(always)]
	pub fn is_alive(&self, entity: EntityId) -> bool {
		self.entities.is_valid(entity)
	}

	/// Enumerates every component of an entity, with a pointer to its value.
	/// Returns *false* if the entity is not alive.
	pub fn interrogate_entity(&self, entity: EntityId, mut callback: impl FnMut(&'static ComponentMeta, *const u8)) -> bool {
		let Some((archetype, index)) = self.entities.resolve(entity) else {
			return false;
		};

		let archetype = self.archetypes.get(archetype);
		for (row, layout) in archetype.layout().iter().enumerate() {
			callback(layout.meta(), unsafe { archetype.component_ptr_const(index, row) });
		}
		true
	}

	/// Computes where an entity is currently stored.
	pub fn locate(&self, entity: EntityId) -> Option<Location> {
		let (archetype, index) = self.entities.resolve(entity)?;
		Some(self.archetypes.get(archetype).locate(index))
	}

	pub fn archetype_of(&self, entity: EntityId) -> Option<ArchetypeId> {
		self.entities.resolve(entity).map(|(archetype, _)| archetype)
	}

	/// The archetype behind `id`, or [None] if this world never created it.
	pub fn archetype(&self, id: ArchetypeId) -> Option<&Archetype> {
		self.archetypes.try_get(id)
	}

	pub fn archetypes(&self) -> impl Iterator<Item = &Archetype> {
		self.archetypes.iter()
	}

	/// The number of archetypes, including the empty one.
	pub fn archetype_count(&self) -> usize {
		self.archetypes.len()
	}

	/// The number of live entities.
	pub fn entity_count(&self) -> usize {
		self.entities.len()
	}

	pub fn chunk_pool_stats(&self) -> ChunkPoolStats {
		self.chunks.stats()
	}

	/// Frees every chunk waiting for reuse. Returns how many were released.
	pub fn release_free_chunks(&mut self) -> usize {
		self.chunks.release_free_chunks()
	}

	/// Visits every chunk of every archetype containing all of `required`, which must be sorted.
	///
	/// For each chunk `callback` receives the number of entities, a pointer to their ids and
	/// one pointer per entry of `returned`, each to the first element of that component array.
	/// `returned` must only name components every matching archetype has.
	pub fn select_raw(
		&mut self, required: &[ComponentId], returned: &[ComponentId],
		mut callback: impl FnMut(usize, *const EntityId, &[*mut u8]),
	) {
		ecs_assert!(
			required.windows(2).all(|w| w[0] < w[1]),
			"Required components must be sorted and unique"
		);

		let mut offsets = Vec::with_capacity(returned.len());
		let mut pointers = Vec::with_capacity(returned.len());

		for index in 0..self.archetypes.len() {
			let archetype = self.archetypes.get_mut(ArchetypeId { index: index as u32 });
			if !archetype.matches(required) {
				continue;
			}

			offsets.clear();
			for component in returned {
				match archetype.row(*component) {
					Some(row) => offsets.push(row.offset()),
					None => panic!("Component {:?} is not part of every matching archetype", component),
				}
			}

			for chunk in archetype.chunks_mut() {
				let count = chunk.len();
				let base = chunk.payload_mut_ptr();

				pointers.clear();
				pointers.extend(offsets.iter().map(|offset| unsafe { base.add(*offset) }));
				callback(count, base as *const EntityId, &pointers);
			}
		}
	}

	/// Invokes `func` once for each entity holding the components in `Q`.
	pub fn select<'w, Q: QuerySet>(&'w mut self, func: impl FnMut(EntityId, Q::Items<'w>)) {
		Query::<Q>::new().select(self, func);
	}

	/// Invokes `func` once for each chunk holding entities with the components in `Q`.
	pub fn select_chunks<'w, Q: QuerySet>(&'w mut self, func: impl FnMut(&'w [EntityId], Q::Slices<'w>)) {
		Query::<Q>::new().select_chunks(self, func);
	}

	fn allocate_entity(&mut self, metas: &mut Vec<&'static ComponentMeta>) -> (EntityId, ArchetypeId, u32) {
		let archetype_id = self.archetypes.acquire(metas);
		let archetype = self.archetypes.get_mut(archetype_id);

		let entity = self.entities.allocate(archetype_id, archetype.len() as u32);
		let index = archetype.push(entity, &mut self.chunks);
		(entity, archetype_id, index)
	}

	fn insert_component(&mut self, entity: EntityId, meta: &'static ComponentMeta, write: impl FnOnce(*mut u8)) -> bool {
		let Some((src, index)) = self.entities.resolve(entity) else {
			return false;
		};

		let archetype = self.archetypes.get_mut(src);
		if let Some(row) = archetype.row_index(meta.id()) {
			unsafe {
				let ptr = archetype.component_ptr(index, row);
				meta.destroy(ptr);
				write(ptr);
			}
			return true;
		}

		let dst = self.archetypes.acquire_with(src, meta);
		let Some(row) = self.archetypes.get(dst).row_index(meta.id()) else {
			unreachable!("Component {:?} is missing from its target archetype", meta.id());
		};

		unsafe {
			let dst_index = self.migrate(entity, src, index, dst);
			write(self.archetypes.get_mut(dst).component_ptr(dst_index, row));
		}
		true
	}

	/// Moves a live entity from `src` to `dst`.
	///
	/// Components both archetypes share are relocated, components only `src` has are destroyed.
	/// Components only `dst` has are left uninitialized for the caller to construct.
	/// Returns the entity's new slot in `dst`.
	unsafe fn migrate(&mut self, entity: EntityId, src: ArchetypeId, index: u32, dst: ArchetypeId) -> u32 {
		let (source, target) = self.archetypes.get_pair_mut(src, dst);
		let dst_index = target.push(entity, &mut self.chunks);

		// Both layouts are sorted, walk them side by side.
		let mut target_row = 0;
		for source_row in 0..source.layout().len() {
			let component = source.layout()[source_row].component();
			while target_row < target.layout().len() && target.layout()[target_row].component() < component {
				target_row += 1;
			}

			let from = source.component_ptr(index, source_row);
			let meta = source.layout()[source_row].meta();
			let shared = matches!(target.layout().get(target_row), Some(row) if row.component() == component);
			if shared {
				meta.relocate(target.component_ptr(dst_index, target_row), from);
			} else {
				meta.destroy(from);
			}
		}

		// The old slot is now empty, close the hole without running any destructor.
		if let Some(moved) = source.swap_remove(index, false, &mut self.chunks) {
			self.entities.set_index(moved, index);
		}
		self.entities.set_location(entity, dst, dst_index);
		dst_index
	}
}

impl Default for World {
	fn default() -> Self {
		Self::new()
	}
}

impl Drop for World {
	fn drop(&mut self) {
		tracing::debug!(
			world = self.id,
			entities = self.entities.len(),
			archetypes = self.archetypes.len(),
			"dropping world"
		);
	}
}
