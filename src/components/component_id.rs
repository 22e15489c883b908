//! A unique runtime identifier tied to a [Component](crate::components::Component) type.
//!
//! Developers shouldn't rely on [component ids](ComponentId), as they are not stable between program re-runs.
//! [Component ids](ComponentId) are totally ordered; archetype layouts and queries keep them sorted
//! so that component sets can be compared with a linear scan.

use std::sync::atomic::Ordering::Relaxed;
use std::sync::atomic::AtomicU32;
use crate::components::Component;
use std::fmt;

static NEXT_ID: AtomicU32 = AtomicU32::new(1);

/// A process-wide unique identifier for a component type.
#[derive(Hash, Eq, PartialEq, Ord, PartialOrd, Copy, Clone)]
pub struct ComponentId {
	value: u32,
}

impl ComponentId {
	/// Get the [ComponentId] of the type `T`.
	#[inline(always)]
	pub fn of<T: Component>() -> ComponentId {
		T::component_id()
	}

	/// Generates a new, never before used [ComponentId].
	pub fn allocate() -> ComponentId {
		let value = NEXT_ID.fetch_add(1, Relaxed);
		assert!(value != u32::MAX, "This is an insane number of components. Please seek help.");
		ComponentId { value }
	}

	#[inline(always)]
	pub const fn value(&self) -> u32 {
		self.value
	}

	#[cfg(test)]
	pub(crate) const fn from_value(value: u32) -> ComponentId {
		ComponentId { value }
	}
}

impl fmt::Debug for ComponentId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "ComponentId({})", self.value)
	}
}
