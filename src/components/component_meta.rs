use crate::components::ComponentId;
use std::mem::{align_of, size_of};
use std::ptr;

/// Copy-constructs the value at `src` into the uninitialized memory at `dst`.
pub type CopyFn = unsafe fn(dst: *mut u8, src: *const u8);

/// Moves the value at `src` into the uninitialized memory at `dst`.
/// `src` is left logically uninitialized and must not be destroyed afterwards.
pub type RelocateFn = unsafe fn(dst: *mut u8, src: *mut u8);

/// Runs the destructor of the value at `ptr` in place.
pub type DestroyFn = unsafe fn(ptr: *mut u8);

/// A type-erased description of a component type.
///
/// Storage code never sees the concrete type of a component;
/// it moves bytes around through the function pointers stored here.
/// A [ComponentMeta] is registered once and never mutated afterwards.
#[derive(Debug)]
pub struct ComponentMeta {
	id: ComponentId,
	name: &'static str,
	size: usize,
	alignment: usize,
	copy: CopyFn,
	relocate: RelocateFn,
	destroy: DestroyFn,
}

impl ComponentMeta {
	/// Builds the metadata of `T`.
	pub fn of<T: 'static + Clone>(id: ComponentId, name: &'static str) -> Self {
		Self {
			id,
			name,
			size: size_of::<T>(),
			alignment: align_of::<T>(),
			copy: copy_component::<T>,
			relocate: relocate_component::<T>,
			destroy: destroy_component::<T>,
		}
	}

	/// Builds a [ComponentMeta] from its raw parts.
	///
	/// # Safety
	/// - `copy`, `relocate` and `destroy` must treat their arguments as values of
	///   `size` bytes aligned to `alignment`.
	/// - None of the functions may panic or unwind.
	pub unsafe fn from_raw_parts(
		id: ComponentId, name: &'static str, size: usize, alignment: usize, copy: CopyFn, relocate: RelocateFn,
		destroy: DestroyFn,
	) -> Self {
		Self {
			id,
			name,
			size,
			alignment,
			copy,
			relocate,
			destroy,
		}
	}

	#[inline(always)]
	pub fn id(&self) -> ComponentId {
		self.id
	}

	#[inline(always)]
	pub fn name(&self) -> &'static str {
		self.name
	}

	#[inline(always)]
	pub fn size(&self) -> usize {
		self.size
	}

	#[inline(always)]
	pub fn alignment(&self) -> usize {
		self.alignment
	}

	/// # Safety
	/// `dst` must be valid, uninitialized storage for this component;
	/// `src` must point to an initialized value of this component.
	#[inline(always)]
	pub unsafe fn copy(&self, dst: *mut u8, src: *const u8) {
		(self.copy)(dst, src)
	}

	/// # Safety
	/// `dst` must be valid, uninitialized storage for this component;
	/// `src` must point to an initialized value of this component, which becomes uninitialized.
	#[inline(always)]
	pub unsafe fn relocate(&self, dst: *mut u8, src: *mut u8) {
		(self.relocate)(dst, src)
	}

	/// # Safety
	/// `ptr` must point to an initialized value of this component, which becomes uninitialized.
	#[inline(always)]
	pub unsafe fn destroy(&self, ptr: *mut u8) {
		(self.destroy)(ptr)
	}
}

unsafe fn copy_component<T: Clone>(dst: *mut u8, src: *const u8) {
	let value = (*src.cast::<T>()).clone();
	ptr::write(dst.cast::<T>(), value);
}

unsafe fn relocate_component<T>(dst: *mut u8, src: *mut u8) {
	ptr::copy_nonoverlapping(src.cast::<T>(), dst.cast::<T>(), 1);
}

unsafe fn destroy_component<T>(ptr: *mut u8) {
	ptr::drop_in_place(ptr.cast::<T>());
}
