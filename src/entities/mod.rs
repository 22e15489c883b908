//! [Entities](EntityId) represent the individual "things" in your game or application.
//!
//! An entity doesn't store any data and has no associated behaviour;
//! instead, it identifies which pieces of data ([Components](crate::components::Component)) belong together.

mod entity_id;
mod entity_mapper;

pub use entity_id::*;
pub(crate) use entity_mapper::*;
