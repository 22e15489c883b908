use crate::components::{ComponentId, ComponentMeta};

/// A type that can be attached to an [entity](crate::entities::EntityId).
///
/// Usually implemented through #\[derive(Component)], which registers the type
/// with the global component registry on first use.
/// Components are cloned when copied in through a type-erased path
/// and moved bitwise whenever their entity changes chunk or archetype.
/// `Clone` and `Drop` implementations must not panic.
pub trait Component
where
	Self: 'static + Sized + Clone,
{
	/// The registered metadata of this component type.
	fn meta() -> &'static ComponentMeta;

	#[inline(always)]
	fn component_id() -> ComponentId {
		Self::meta().id()
	}
}
