use crate::archetypes::{signature_hash, Archetype, ArchetypeId};
use crate::components::{ComponentId, ComponentMeta};
use std::hash::{BuildHasherDefault, Hash};
use crate::MAX_ARCHETYPE_COMPONENTS;
use nohash_hasher::NoHashHasher;
use std::collections::HashMap;

type Hasher = BuildHasherDefault<NoHashHasher<u64>>;

/// Owns every [Archetype] of a [World](crate::World).
/// Archetypes are created on first use and live as long as the store.
pub(crate) struct ArchetypeStore {
	vec: Vec<Archetype>,
	map: HashMap<u64, Vec<ArchetypeId>, Hasher>,
	transitions: HashMap<ArchetypeTransition, ArchetypeId, Hasher>,
}

#[derive(Copy, Clone, Eq, PartialEq)]
pub(crate) struct ArchetypeTransition {
	pub archetype: ArchetypeId,
	pub component: ComponentId,
	pub kind: ArchetypeTransitionKind,
}

#[repr(u64)]
#[derive(Copy, Clone, Hash, Eq, PartialEq)]
pub(crate) enum ArchetypeTransitionKind {
	Add = 0,
	Remove = 1,
}

impl ArchetypeStore {
	pub fn new() -> Self {
		let mut store = Self {
			vec: Vec::new(),
			map: HashMap::default(),
			transitions: HashMap::default(),
		};
		store.acquire(&mut Vec::new());
		store
	}

	/// Finds or creates the [archetype](Archetype) storing exactly `components`.
	/// `components` is sorted in place.
	pub fn acquire(&mut self, components: &mut Vec<&'static ComponentMeta>) -> ArchetypeId {
		ecs_assert!(
			components.len() <= MAX_ARCHETYPE_COMPONENTS,
			"An entity cannot have more than {} components",
			MAX_ARCHETYPE_COMPONENTS
		);

		components.sort_unstable_by_key(|meta| meta.id());
		if components.windows(2).any(|w| w[0].id() == w[1].id()) {
			panic!("An entity cannot include a component type multiple times");
		}

		let hash = signature_hash(components.iter().map(|meta| meta.id()));
		if let Some(candidates) = self.map.get(&hash) {
			let found = candidates.iter().find(|id| self.vec[id.index()].has_exactly(components));
			if let Some(id) = found {
				return *id;
			}
		}

		let id = ArchetypeId { index: self.vec.len() as u32 };
		let archetype = Archetype::new(id, components);

		tracing::debug!(
			archetype = id.index,
			components = components.len(),
			per_chunk = archetype.per_chunk(),
			hash = archetype.layout_hash(),
			"created archetype"
		);

		self.map.entry(hash).or_default().push(id);
		self.vec.push(archetype);
		id
	}

	/// The archetype of `source` plus `component`.
	/// `source` must not already contain `component`.
	pub fn acquire_with(&mut self, source: ArchetypeId, component: &'static ComponentMeta) -> ArchetypeId {
		let transition = ArchetypeTransition {
			archetype: source,
			component: component.id(),
			kind: ArchetypeTransitionKind::Add,
		};
		if let Some(archetype) = self.transitions.get(&transition) {
			return *archetype;
		}

		let src = &self.vec[source.index()];
		debug_assert!(!src.contains(component.id()));

		let mut components = Vec::with_capacity(src.layout().len() + 1);
		components.extend(src.layout().iter().map(|row| row.meta()));
		components.push(component);

		let archetype = self.acquire(&mut components);
		self.transitions.insert(transition, archetype);
		archetype
	}

	/// The archetype of `source` minus `component`,
	/// or [None] if `source` does not contain `component`.
	pub fn acquire_without(&mut self, source: ArchetypeId, component: ComponentId) -> Option<ArchetypeId> {
		let transition = ArchetypeTransition {
			archetype: source,
			component,
			kind: ArchetypeTransitionKind::Remove,
		};
		if let Some(archetype) = self.transitions.get(&transition) {
			return Some(*archetype);
		}

		let src = &self.vec[source.index()];
		if !src.contains(component) {
			return None;
		}

		let mut components: Vec<_> = src
			.layout()
			.iter()
			.filter(|row| row.component() != component)
			.map(|row| row.meta())
			.collect();

		let archetype = self.acquire(&mut components);
		self.transitions.insert(transition, archetype);
		Some(archetype)
	}

	#[inline(always)]
	pub fn get(&self, id: ArchetypeId) -> &Archetype {
		&self.vec[id.index()]
	}

	pub fn try_get(&self, id: ArchetypeId) -> Option<&Archetype> {
		self.vec.get(id.index())
	}

	#[inline(always)]
	pub fn get_mut(&mut self, id: ArchetypeId) -> &mut Archetype {
		&mut self.vec[id.index()]
	}

	/// Borrows two distinct archetypes mutably.
	pub fn get_pair_mut(&mut self, a: ArchetypeId, b: ArchetypeId) -> (&mut Archetype, &mut Archetype) {
		assert_ne!(a, b, "Cannot borrow the same archetype twice");
		if a.index() < b.index() {
			let (left, right) = self.vec.split_at_mut(b.index());
			(&mut left[a.index()], &mut right[0])
		} else {
			let (left, right) = self.vec.split_at_mut(a.index());
			(&mut right[0], &mut left[b.index()])
		}
	}

	#[inline(always)]
	pub fn len(&self) -> usize {
		self.vec.len()
	}

	pub fn iter(&self) -> impl Iterator<Item = &Archetype> {
		self.vec.iter()
	}
}

impl Hash for ArchetypeTransition {
	fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
		let kind = self.kind as u64;
		let archetype = (self.archetype.index as u64) << 33;
		let component = (self.component.value() as u64) << 1;
		state.write_u64(kind | archetype | component);
	}
}
