//! [Archetypes](Archetype) are the storage of every entity sharing one exact set of
//! [components](crate::components::Component).
//!
//! An archetype stores its entities in fixed-size [chunks](crate::data_structures::Chunk),
//! each laid out as an array of entity ids followed by one array per component.

mod archetype_instance;
mod archetype_registry;

pub use archetype_instance::{Archetype, ArchetypeId, LayoutRow, Location};

pub(crate) use archetype_instance::*;
pub(crate) use archetype_registry::*;
