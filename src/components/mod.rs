//! [Components](Component) are the plain data attached to [entities](crate::entities::EntityId).

mod component_id;
mod component_set;
mod component_meta;
mod component_type;
mod component_registry;

pub use component_id::*;
pub use component_set::*;
pub use component_meta::*;
pub use component_type::*;
pub use component_registry::*;
pub use chunk_ecs_derive::Component;
