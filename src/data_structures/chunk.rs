use crate::entities::EntityId;
use std::alloc::{alloc, handle_alloc_error, Layout};
use std::mem::{size_of, MaybeUninit};
use std::ptr::addr_of_mut;

/// Total size of a [Chunk] in bytes.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Size of the fixed header at the start of every [Chunk].
pub const CHUNK_HEADER_SIZE: usize = 64;

/// Bytes available for entity ids and component arrays in a single [Chunk].
pub const CHUNK_PAYLOAD_SIZE: usize = CHUNK_SIZE - CHUNK_HEADER_SIZE;

/// The largest component alignment a [Chunk] payload can satisfy.
pub const MAX_COMPONENT_ALIGNMENT: usize = 64;

#[repr(C, align(64))]
pub(crate) struct ChunkHeader {
	count: u32,
}

/// A fixed-size block of memory holding a struct-of-arrays slice of one archetype's entities.
///
/// The payload starts with an array of [entity ids](EntityId) followed by one array per component,
/// at the offsets described by the owning archetype's layout.
/// Only the first [len](Chunk::len) slots of every array are initialized.
#[repr(C, align(64))]
pub struct Chunk {
	header: ChunkHeader,
	payload: [MaybeUninit<u8>; CHUNK_PAYLOAD_SIZE],
}

const _: () = assert!(size_of::<Chunk>() == CHUNK_SIZE, "Chunk has an unexpected size");
const _: () = assert!(size_of::<ChunkHeader>() == CHUNK_HEADER_SIZE);

impl Chunk {
	/// Allocates a chunk with an empty header and an uninitialized payload.
	pub(crate) fn allocate() -> Box<Chunk> {
		let layout = Layout::new::<Chunk>();
		unsafe {
			let ptr = alloc(layout) as *mut Chunk;
			if ptr.is_null() {
				handle_alloc_error(layout);
			}

			addr_of_mut!((*ptr).header).write(ChunkHeader { count: 0 });
			Box::from_raw(ptr)
		}
	}

	/// The number of live entities stored in the chunk.
	#[inline(always)]
	pub fn len(&self) -> usize {
		self.header.count as usize
	}

	#[inline(always)]
	pub fn is_empty(&self) -> bool {
		self.header.count == 0
	}

	#[inline(always)]
	pub(crate) fn set_len(&mut self, len: usize) {
		self.header.count = len as u32;
	}

	/// The ids of the entities stored in the chunk.
	pub fn entities(&self) -> &[EntityId] {
		// SAFETY: the first `len` entity slots are always initialized.
		unsafe { std::slice::from_raw_parts(self.payload_ptr() as *const EntityId, self.len()) }
	}

	#[inline(always)]
	pub(crate) fn payload_ptr(&self) -> *const u8 {
		self.payload.as_ptr() as *const u8
	}

	#[inline(always)]
	pub(crate) fn payload_mut_ptr(&mut self) -> *mut u8 {
		self.payload.as_mut_ptr() as *mut u8
	}

	/// # Safety
	/// `index` must be lower than the owning archetype's capacity per chunk.
	#[inline(always)]
	pub(crate) unsafe fn entity_ptr(&mut self, index: usize) -> *mut EntityId {
		(self.payload_mut_ptr() as *mut EntityId).add(index)
	}
}

/// Rounds `value` up to the next multiple of `alignment`, which must be a power of two.
#[inline(always)]
pub const fn align_to(value: usize, alignment: usize) -> usize {
	(value + alignment - 1) & !(alignment - 1)
}
