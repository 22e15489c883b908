use crate::data_structures::Chunk;

/// Counters describing the activity of a [ChunkPool].
#[derive(Default, Debug, Copy, Clone, Eq, PartialEq)]
pub struct ChunkPoolStats {
	/// Chunks freshly allocated from the system allocator.
	pub allocated: usize,
	/// Chunks handed out again after being recycled.
	pub reused: usize,
	/// Chunks returned to the pool.
	pub recycled: usize,
	/// Chunks currently waiting in the pool.
	pub free: usize,
}

/// A recycling pool of [chunks](Chunk).
///
/// Chunks are handed to archetypes by value and handed back once they are empty,
/// so a chunk is never owned by two archetypes at once.
#[derive(Default)]
pub struct ChunkPool {
	free: Vec<Box<Chunk>>,
	stats: ChunkPoolStats,
}

impl ChunkPool {
	pub fn new() -> Self {
		Self::default()
	}

	/// Takes an empty chunk from the pool, allocating a new one if none is available.
	pub fn allocate(&mut self) -> Box<Chunk> {
		match self.free.pop() {
			Some(mut chunk) => {
				chunk.set_len(0);
				self.stats.reused += 1;
				self.stats.free = self.free.len();
				tracing::trace!(free = self.free.len(), "reused chunk");
				chunk
			},
			None => {
				self.stats.allocated += 1;
				tracing::trace!(allocated = self.stats.allocated, "allocated chunk");
				Chunk::allocate()
			},
		}
	}

	/// Returns a chunk to the pool.
	///
	/// Every live component in the chunk must have been destroyed or moved out already;
	/// anything left behind is forgotten without running its destructor.
	pub fn recycle(&mut self, mut chunk: Box<Chunk>) {
		debug_assert!(chunk.is_empty(), "Recycled chunks must not contain live entities");
		chunk.set_len(0);

		self.free.push(chunk);
		self.stats.recycled += 1;
		self.stats.free = self.free.len();
		tracing::trace!(free = self.free.len(), "recycled chunk");
	}

	/// Frees every chunk currently waiting in the pool.
	pub fn release_free_chunks(&mut self) -> usize {
		let released = self.free.len();
		self.free.clear();
		self.free.shrink_to_fit();
		self.stats.free = 0;
		released
	}

	pub fn stats(&self) -> ChunkPoolStats {
		self.stats
	}
}
