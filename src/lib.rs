extern crate self as chunk_ecs;

/// Checks an engine invariant.
/// With the `debug_only_assertions` feature the check is skipped in release builds.
macro_rules! ecs_assert {
	($($arg:tt)*) => {
		#[cfg(not(feature = "debug_only_assertions"))]
		assert!($($arg)*);
		#[cfg(feature = "debug_only_assertions")]
		debug_assert!($($arg)*);
	};
}

/// The largest number of components a single entity can hold.
pub const MAX_ARCHETYPE_COMPONENTS: usize = 32;

pub mod data_structures;
pub mod components;
pub mod archetypes;
pub mod entities;
pub mod query;
mod world;

pub use lazy_static::lazy_static;
pub use world::World;

pub mod prelude {
	pub use crate::world::World;
	pub use crate::components::*;
	pub use crate::entities::EntityId;
	pub use crate::query::{Query, QuerySet, QueryTerm};
	pub use crate::archetypes::{Archetype, ArchetypeId, Location};
	pub use crate::data_structures::{ChunkPoolStats, CHUNK_SIZE};
}

#[cfg(test)]
mod tests;
