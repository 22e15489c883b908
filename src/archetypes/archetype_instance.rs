use crate::data_structures::{align_to, Chunk, ChunkPool, CHUNK_PAYLOAD_SIZE};
use crate::components::{ComponentId, ComponentMeta};
use crate::entities::EntityId;
use std::cmp::Ordering;
use std::mem::size_of;

const ENTITY_SIZE: usize = size_of::<EntityId>();

/// A handle to an [Archetype] owned by a [World](crate::World).
#[derive(Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Copy, Clone)]
pub struct ArchetypeId {
	pub(crate) index: u32,
}

impl ArchetypeId {
	/// The archetype of entities without any component.
	pub const EMPTY: ArchetypeId = ArchetypeId { index: 0 };

	#[inline(always)]
	pub const fn index(self) -> usize {
		self.index as usize
	}
}

/// Where a component array lives inside the chunks of an [Archetype].
#[derive(Debug, Copy, Clone)]
pub struct LayoutRow {
	meta: &'static ComponentMeta,
	offset: usize,
}

impl LayoutRow {
	#[inline(always)]
	pub fn component(&self) -> ComponentId {
		self.meta.id()
	}

	#[inline(always)]
	pub fn meta(&self) -> &'static ComponentMeta {
		self.meta
	}

	/// Byte offset of the component array from the start of the chunk payload.
	#[inline(always)]
	pub fn offset(&self) -> usize {
		self.offset
	}

	/// Distance in bytes between two consecutive components in the array.
	#[inline(always)]
	pub fn width(&self) -> usize {
		self.meta.size()
	}
}

/// The position of an entity inside the chunks of its [Archetype].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Location {
	pub archetype: ArchetypeId,
	pub chunk: usize,
	pub sub_index: usize,
}

/// Storage for every entity sharing one exact set of components.
///
/// Entities are packed: every chunk but the last one is full,
/// and deleting an entity moves the archetype's last entity into the hole.
pub struct Archetype {
	id: ArchetypeId,
	layout: Vec<LayoutRow>,
	layout_hash: u64,
	per_chunk: usize,
	count: usize,
	chunks: Vec<Box<Chunk>>,
}

impl Archetype {
	/// Creates an archetype for `components`, which must be sorted by id and free of duplicates.
	pub(crate) fn new(id: ArchetypeId, components: &[&'static ComponentMeta]) -> Self {
		debug_assert!(components.windows(2).all(|w| w[0].id() < w[1].id()));

		let order = layout_order(components);
		let per_chunk = entities_per_chunk(&order);
		ecs_assert!(per_chunk > 0, "Archetype components do not fit in a single chunk");

		let mut offset = ENTITY_SIZE * per_chunk;
		let mut layout = Vec::with_capacity(order.len());
		for meta in order {
			offset = align_to(offset, meta.alignment());
			layout.push(LayoutRow { meta, offset });
			offset += meta.size() * per_chunk;
		}
		ecs_assert!(offset <= CHUNK_PAYLOAD_SIZE);

		layout.sort_unstable_by_key(|row| row.component());
		let layout_hash = signature_hash(components.iter().map(|meta| meta.id()));

		Self {
			id,
			layout,
			layout_hash,
			per_chunk,
			count: 0,
			chunks: Vec::new(),
		}
	}

	#[inline(always)]
	pub fn id(&self) -> ArchetypeId {
		self.id
	}

	/// The component arrays of this archetype, sorted by [ComponentId].
	#[inline(always)]
	pub fn layout(&self) -> &[LayoutRow] {
		&self.layout
	}

	#[inline(always)]
	pub fn layout_hash(&self) -> u64 {
		self.layout_hash
	}

	/// How many entities fit in one chunk of this archetype.
	#[inline(always)]
	pub fn per_chunk(&self) -> usize {
		self.per_chunk
	}

	/// The number of entities stored in this archetype.
	#[inline(always)]
	pub fn len(&self) -> usize {
		self.count
	}

	#[inline(always)]
	pub fn is_empty(&self) -> bool {
		self.count == 0
	}

	pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
		self.chunks.iter().map(|chunk| &**chunk)
	}

	pub(crate) fn chunks_mut(&mut self) -> impl Iterator<Item = &mut Chunk> {
		self.chunks.iter_mut().map(|chunk| &mut **chunk)
	}

	#[inline(always)]
	pub fn chunk_count(&self) -> usize {
		self.chunks.len()
	}

	pub fn component_ids(&self) -> impl Iterator<Item = ComponentId> + '_ {
		self.layout.iter().map(|row| row.component())
	}

	/// Whether this archetype contains every component in `required`, which must be sorted.
	pub fn matches(&self, required: &[ComponentId]) -> bool {
		let mut rows = self.layout.iter();

		'required: for &component in required {
			for row in rows.by_ref() {
				match row.component().cmp(&component) {
					Ordering::Less => continue,
					Ordering::Equal => continue 'required,
					Ordering::Greater => return false,
				}
			}
			return false;
		}
		true
	}

	/// Whether this archetype stores exactly the components in `components`, which must be sorted.
	pub(crate) fn has_exactly(&self, components: &[&'static ComponentMeta]) -> bool {
		self.layout.len() == components.len()
			&& self.layout.iter().zip(components).all(|(row, meta)| row.component() == meta.id())
	}

	pub fn row_index(&self, component: ComponentId) -> Option<usize> {
		self.layout.binary_search_by_key(&component, |row| row.component()).ok()
	}

	pub fn row(&self, component: ComponentId) -> Option<&LayoutRow> {
		self.row_index(component).map(|index| &self.layout[index])
	}

	#[inline(always)]
	pub fn contains(&self, component: ComponentId) -> bool {
		self.row_index(component).is_some()
	}

	#[inline(always)]
	pub(crate) fn locate(&self, index: u32) -> Location {
		let index = index as usize;
		Location {
			archetype: self.id,
			chunk: index / self.per_chunk,
			sub_index: index % self.per_chunk,
		}
	}

	/// Appends `entity` to the archetype, taking a chunk from `pool` if the last one is full.
	/// The entity's components are left uninitialized.
	pub(crate) fn push(&mut self, entity: EntityId, pool: &mut ChunkPool) -> u32 {
		let full = match self.chunks.last() {
			Some(chunk) => chunk.len() == self.per_chunk,
			None => true,
		};
		if full {
			self.chunks.push(pool.allocate());
		}

		let index = self.count;
		let chunk_index = self.chunks.len() - 1;
		let chunk = &mut self.chunks[chunk_index];
		let sub_index = chunk.len();

		// SAFETY: `sub_index` is below `per_chunk` since the chunk isn't full.
		unsafe { chunk.entity_ptr(sub_index).write(entity) };
		chunk.set_len(sub_index + 1);

		self.count += 1;
		index as u32
	}

	/// Pointer to the component stored in `row` for the entity at `index`.
	///
	/// # Safety
	/// `index` must be lower than [len](Archetype::len) and `row` a valid layout index.
	#[inline]
	pub(crate) unsafe fn component_ptr(&mut self, index: u32, row: usize) -> *mut u8 {
		let location = self.locate(index);
		let row = &self.layout[row];
		let chunk = &mut self.chunks[location.chunk];
		chunk.payload_mut_ptr().add(row.offset + location.sub_index * row.width())
	}

	/// # Safety
	/// `index` must be lower than [len](Archetype::len) and `row` a valid layout index.
	#[inline]
	pub(crate) unsafe fn component_ptr_const(&self, index: u32, row: usize) -> *const u8 {
		let location = self.locate(index);
		let row = &self.layout[row];
		let chunk = &self.chunks[location.chunk];
		chunk.payload_ptr().add(row.offset + location.sub_index * row.width())
	}

	/// Removes the entity at `index`, moving the archetype's last entity into its place.
	/// Returns the id of the moved entity, if any.
	///
	/// When `destroy` is false the removed entity's components must already have been
	/// moved out or destroyed by the caller.
	/// An emptied chunk is handed back to `pool`.
	///
	/// # Safety
	/// `index` must be lower than [len](Archetype::len).
	pub(crate) unsafe fn swap_remove(&mut self, index: u32, destroy: bool, pool: &mut ChunkPool) -> Option<EntityId> {
		debug_assert!((index as usize) < self.count);

		let last = (self.count - 1) as u32;
		let hole = self.locate(index);
		let tail = self.locate(last);
		let (hole_base, tail_base) = self.payload_pair(hole.chunk, tail.chunk);

		if destroy {
			for row in &self.layout {
				row.meta.destroy(hole_base.add(row.offset + hole.sub_index * row.width()));
			}
		}

		let moved = if index != last {
			let hole_entity = (hole_base as *mut EntityId).add(hole.sub_index);
			let tail_entity = (tail_base as *mut EntityId).add(tail.sub_index);
			let moved = tail_entity.read();
			hole_entity.write(moved);

			for row in &self.layout {
				let width = row.width();
				let dst = hole_base.add(row.offset + hole.sub_index * width);
				let src = tail_base.add(row.offset + tail.sub_index * width);
				row.meta.relocate(dst, src);
			}
			Some(moved)
		} else {
			None
		};

		let tail_chunk = &mut self.chunks[tail.chunk];
		tail_chunk.set_len(tail.sub_index);
		self.count -= 1;

		if tail_chunk.is_empty() {
			if let Some(chunk) = self.chunks.pop() {
				pool.recycle(chunk);
			}
		}

		moved
	}

	fn payload_pair(&mut self, a: usize, b: usize) -> (*mut u8, *mut u8) {
		match a.cmp(&b) {
			Ordering::Equal => {
				let ptr = self.chunks[a].payload_mut_ptr();
				(ptr, ptr)
			},
			Ordering::Less => {
				let (left, right) = self.chunks.split_at_mut(b);
				(left[a].payload_mut_ptr(), right[0].payload_mut_ptr())
			},
			Ordering::Greater => {
				let (left, right) = self.chunks.split_at_mut(a);
				(right[0].payload_mut_ptr(), left[b].payload_mut_ptr())
			},
		}
	}
}

impl Drop for Archetype {
	fn drop(&mut self) {
		for chunk in self.chunks.iter_mut() {
			let count = chunk.len();
			let base = chunk.payload_mut_ptr();
			for row in &self.layout {
				for i in 0..count {
					// SAFETY: the first `count` slots of every row are initialized.
					unsafe { row.meta.destroy(base.add(row.offset + i * row.width())) };
				}
			}
			chunk.set_len(0);
		}
	}
}

/// The order component arrays are laid out in: decreasing alignment, which minimizes padding.
pub(crate) fn layout_order(components: &[&'static ComponentMeta]) -> Vec<&'static ComponentMeta> {
	let mut order = components.to_vec();
	order.sort_by(|a, b| b.alignment().cmp(&a.alignment()));
	order
}

/// Bytes used by `count` entities laid out in `order`, including alignment padding.
pub(crate) fn chunk_footprint(order: &[&'static ComponentMeta], count: usize) -> usize {
	let mut offset = ENTITY_SIZE * count;
	for meta in order {
		offset = align_to(offset, meta.alignment()) + meta.size() * count;
	}
	offset
}

/// The largest `n` for which [chunk_footprint] fits in a chunk payload.
///
/// Without padding the answer is `payload / stride`. Padding only ever adds bytes, so that
/// value is an upper bound; walk down from it until the padded layout fits. The padding of a
/// row is below its alignment, so only a handful of steps are ever taken.
pub(crate) fn entities_per_chunk(order: &[&'static ComponentMeta]) -> usize {
	let stride = ENTITY_SIZE + order.iter().map(|meta| meta.size()).sum::<usize>();
	let mut count = CHUNK_PAYLOAD_SIZE / stride;
	while count > 0 && chunk_footprint(order, count) > CHUNK_PAYLOAD_SIZE {
		count -= 1;
	}
	count
}

/// Hashes a set of component ids independently of their order.
///
/// Every id is mixed before being summed, so unlike a plain XOR
/// ids can't cancel each other out.
pub(crate) fn signature_hash(components: impl Iterator<Item = ComponentId>) -> u64 {
	let mut count = 0u64;
	let mut sum = 0u64;
	for component in components {
		sum = sum.wrapping_add(mix64(component.value() as u64 ^ 0x9e37_79b9_7f4a_7c15));
		count += 1;
	}
	mix64(sum ^ count)
}

fn mix64(mut x: u64) -> u64 {
	x ^= x >> 30;
	x = x.wrapping_mul(0xbf58_476d_1ce4_e5b9);
	x ^= x >> 27;
	x = x.wrapping_mul(0x94d0_49bb_1331_11eb);
	x ^ (x >> 31)
}
