use crate::components::{ComponentId, ComponentSet};
use crate::archetypes::ArchetypeId;
use crate::query::QuerySet;
use crate::entities::EntityId;
use std::marker::PhantomData;
use crate::world::World;
use rayon::prelude::*;

#[derive(Debug)]
struct QueryMatch {
	archetype: ArchetypeId,
	/// Payload offset of each returned component array, in [QuerySet] order.
	offsets: Vec<usize>,
}

/// A cached selection of every entity holding the components accessed by `Q`
/// and the additional components named by `F`.
///
/// The query remembers which archetypes matched the last time it ran,
/// and only inspects archetypes created since then.
/// Using it with a different [World] starts over.
///
/// ```
/// # use chunk_ecs::prelude::*;
/// #[derive(Clone, Component)]
/// struct Position(f32);
///
/// #[derive(Clone, Component)]
/// struct Velocity(f32);
///
/// let mut world = World::new();
/// world.create_entity((Position(0.0), Velocity(1.0)));
///
/// let mut query = Query::<(&mut Position, &Velocity)>::new();
/// query.select(&mut world, |_, (position, velocity)| position.0 += velocity.0);
/// ```
pub struct Query<Q: QuerySet, F: ComponentSet = ()> {
	world: u32,
	required: Vec<ComponentId>,
	returned: Vec<ComponentId>,
	matches: Vec<QueryMatch>,
	next_archetype: usize,
	phantom: PhantomData<fn() -> (Q, F)>,
}

impl<Q: QuerySet, F: ComponentSet> Query<Q, F> {
	/// Panics if a component type appears more than once across `Q` and `F`.
	pub fn new() -> Self {
		let mut returned = Vec::new();
		Q::component_ids(&mut returned);

		let mut required = returned.clone();
		F::component_ids(&mut required);
		required.sort_unstable();

		if required.windows(2).any(|w| w[0] == w[1]) {
			panic!("A query cannot include a component type multiple times");
		}

		Self {
			world: 0,
			required,
			returned,
			matches: Vec::new(),
			next_archetype: 0,
			phantom: PhantomData,
		}
	}

	/// The components an archetype must contain to match, sorted.
	pub fn required(&self) -> &[ComponentId] {
		&self.required
	}

	/// The number of archetypes this query has matched so far.
	pub fn matched_archetypes(&self) -> usize {
		self.matches.len()
	}

	/// Brings the cached matches up to date with the archetypes of `world`.
	pub fn update(&mut self, world: &World) {
		if self.world != world.id() {
			self.world = world.id();
			self.matches.clear();
			self.next_archetype = 0;
		}

		let count = world.archetype_count();
		for index in self.next_archetype..count {
			let archetype = world.archetypes.get(ArchetypeId { index: index as u32 });
			if !archetype.matches(&self.required) {
				continue;
			}

			let offsets = self
				.returned
				.iter()
				.map(|component| match archetype.row(*component) {
					Some(row) => row.offset(),
					None => unreachable!("Matching archetype is missing component {:?}", component),
				})
				.collect();

			self.matches.push(QueryMatch { archetype: archetype.id(), offsets });
		}
		self.next_archetype = count;
	}

	/// Invokes `func` once for each non-empty chunk of every matching archetype,
	/// with the chunk's entity ids and one slice per accessed component.
	pub fn select_chunks<'w>(&mut self, world: &'w mut World, mut func: impl FnMut(&'w [EntityId], Q::Slices<'w>)) {
		let mut pointers = Vec::with_capacity(self.returned.len());
		self.select_raw_chunks(world, |count, base, offsets| {
			pointers.clear();
			pointers.extend(offsets.iter().map(|offset| unsafe { base.add(*offset) }));

			// SAFETY: the world stays mutably borrowed for 'w, and every chunk is visited once.
			unsafe {
				let entities = std::slice::from_raw_parts(base as *const EntityId, count);
				func(entities, Q::slices(&pointers, count));
			}
		});
	}

	/// Invokes `func` once for each matching entity.
	pub fn select<'w>(&mut self, world: &'w mut World, mut func: impl FnMut(EntityId, Q::Items<'w>)) {
		let mut pointers = Vec::with_capacity(self.returned.len());
		self.select_raw_chunks(world, |count, base, offsets| {
			pointers.clear();
			pointers.extend(offsets.iter().map(|offset| unsafe { base.add(*offset) }));

			let entities = base as *const EntityId;
			for i in 0..count {
				// SAFETY: each entity of each chunk is visited once.
				unsafe { func(*entities.add(i), Q::items(&pointers, i)) };
			}
		});
	}

	/// Like [select_chunks](Query::select_chunks), spreading chunks across the rayon thread pool.
	pub fn par_select_chunks<'w>(
		&mut self, world: &'w mut World, func: impl Fn(&'w [EntityId], Q::Slices<'w>) + Send + Sync,
	) where
		Q: Send,
	{
		let mut work = Vec::new();
		self.select_raw_chunks(world, |count, base, offsets| work.push((base as usize, count, offsets)));

		// Chunks never overlap, so each task owns its chunk exclusively.
		work.into_par_iter().for_each(|(base, count, offsets)| {
			let base = base as *mut u8;
			let pointers: Vec<_> = offsets.iter().map(|offset| unsafe { base.add(*offset) }).collect();
			unsafe {
				let entities = std::slice::from_raw_parts(base as *const EntityId, count);
				func(entities, Q::slices(&pointers, count));
			}
		});
	}

	fn select_raw_chunks<'q>(&'q mut self, world: &mut World, mut func: impl FnMut(usize, *mut u8, &'q [usize])) {
		self.update(world);

		for matched in &self.matches {
			let archetype = world.archetypes.get_mut(matched.archetype);
			for chunk in archetype.chunks_mut() {
				func(chunk.len(), chunk.payload_mut_ptr(), &matched.offsets);
			}
		}
	}
}

impl<Q: QuerySet, F: ComponentSet> Default for Query<Q, F> {
	fn default() -> Self {
		Self::new()
	}
}
