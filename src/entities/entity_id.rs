use std::fmt;

/// A unique handle to an entity.
///
/// The upper 32 bits hold the generation of the mapping slot the handle was issued for,
/// the lower 32 bits hold the index of that slot.
/// Once an entity is deleted its slot's generation moves on,
/// so the old handle never resolves again, even after the slot is reused.
#[derive(Default, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct EntityId(u64);

impl EntityId {
	/// A handle that never refers to a live entity.
	pub const NONE: EntityId = EntityId(0);

	#[inline(always)]
	pub(crate) const fn new(index: u32, generation: u32) -> Self {
		Self(((generation as u64) << 32) | index as u64)
	}

	/// The index of the mapping slot this handle refers to.
	#[inline(always)]
	pub const fn index(self) -> u32 {
		self.0 as u32
	}

	#[inline(always)]
	pub const fn generation(self) -> u32 {
		(self.0 >> 32) as u32
	}

	#[inline(always)]
	pub const fn to_bits(self) -> u64 {
		self.0
	}

	#[inline(always)]
	pub const fn from_bits(bits: u64) -> Self {
		Self(bits)
	}
}

impl fmt::Debug for EntityId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "EntityId({}v{})", self.index(), self.generation())
	}
}
