use crate::components::{Component, ComponentId};
use paste::paste;

/// A single component access inside a [Query](crate::query::Query):
/// `&T` for shared access or `&mut T` for exclusive access.
pub trait QueryTerm {
	type Component: Component;
	/// What a chunk-wise callback receives for this term.
	type Slice<'w>;
	/// What a per-entity callback receives for this term.
	type Item<'w>;

	/// # Safety
	/// `ptr` must point to `count` initialized values of [Self::Component]
	/// that nothing else accesses for `'w`.
	unsafe fn slice<'w>(ptr: *mut u8, count: usize) -> Self::Slice<'w>;

	/// # Safety
	/// `ptr.add(index)` must point to an initialized value of [Self::Component]
	/// that nothing else accesses for `'w`.
	unsafe fn item<'w>(ptr: *mut u8, index: usize) -> Self::Item<'w>;
}

impl<T: Component> QueryTerm for &T {
	type Component = T;
	type Slice<'w> = &'w [T];
	type Item<'w> = &'w T;

	#[inline(always)]
	unsafe fn slice<'w>(ptr: *mut u8, count: usize) -> &'w [T] {
		std::slice::from_raw_parts(ptr as *const T, count)
	}

	#[inline(always)]
	unsafe fn item<'w>(ptr: *mut u8, index: usize) -> &'w T {
		&*(ptr as *const T).add(index)
	}
}

impl<T: Component> QueryTerm for &mut T {
	type Component = T;
	type Slice<'w> = &'w mut [T];
	type Item<'w> = &'w mut T;

	#[inline(always)]
	unsafe fn slice<'w>(ptr: *mut u8, count: usize) -> &'w mut [T] {
		std::slice::from_raw_parts_mut(ptr as *mut T, count)
	}

	#[inline(always)]
	unsafe fn item<'w>(ptr: *mut u8, index: usize) -> &'w mut T {
		&mut *(ptr as *mut T).add(index)
	}
}

/// The components a [Query](crate::query::Query) hands out.
///
/// Implemented for every [QueryTerm] and for tuples of up to twelve terms.
/// Pointers are always passed in declaration order.
pub trait QuerySet {
	type Slices<'w>;
	type Items<'w>;

	/// Pushes the id of every accessed component, in declaration order.
	fn component_ids(ids: &mut Vec<ComponentId>);

	/// # Safety
	/// See [QueryTerm::slice], for every pointer in `pointers`.
	unsafe fn slices<'w>(pointers: &[*mut u8], count: usize) -> Self::Slices<'w>;

	/// # Safety
	/// See [QueryTerm::item], for every pointer in `pointers`.
	unsafe fn items<'w>(pointers: &[*mut u8], index: usize) -> Self::Items<'w>;
}

impl<T: QueryTerm> QuerySet for T {
	type Slices<'w> = T::Slice<'w>;
	type Items<'w> = T::Item<'w>;

	fn component_ids(ids: &mut Vec<ComponentId>) {
		ids.push(<T::Component as Component>::component_id());
	}

	#[inline(always)]
	unsafe fn slices<'w>(pointers: &[*mut u8], count: usize) -> Self::Slices<'w> {
		T::slice(pointers[0], count)
	}

	#[inline(always)]
	unsafe fn items<'w>(pointers: &[*mut u8], index: usize) -> Self::Items<'w> {
		T::item(pointers[0], index)
	}
}

macro_rules! impl_query_sets {
    ($($t: ident),*) => {
        paste! {
            impl<$($t: QueryTerm),*> QuerySet for ($($t),*) {
                type Slices<'w> = ($($t::Slice<'w>),*);
                type Items<'w> = ($($t::Item<'w>),*);

                fn component_ids(ids: &mut Vec<ComponentId>) {
                    $(ids.push(<$t::Component as Component>::component_id());)*
                }

                #[inline(always)]
                unsafe fn slices<'w>(pointers: &[*mut u8], count: usize) -> Self::Slices<'w> {
                    let &[$([<$t:lower>]),*] = pointers else {
                        unreachable!("Expected one pointer per query term");
                    };
                    ($($t::slice([<$t:lower>], count)),*)
                }

                #[inline(always)]
                unsafe fn items<'w>(pointers: &[*mut u8], index: usize) -> Self::Items<'w> {
                    let &[$([<$t:lower>]),*] = pointers else {
                        unreachable!("Expected one pointer per query term");
                    };
                    ($($t::item([<$t:lower>], index)),*)
                }
            }
        }
    };
}

impl_query_sets!(T0, T1);
impl_query_sets!(T0, T1, T2);
impl_query_sets!(T0, T1, T2, T3);
impl_query_sets!(T0, T1, T2, T3, T4);
impl_query_sets!(T0, T1, T2, T3, T4, T5);
impl_query_sets!(T0, T1, T2, T3, T4, T5, T6);
impl_query_sets!(T0, T1, T2, T3, T4, T5, T6, T7);
impl_query_sets!(T0, T1, T2, T3, T4, T5, T6, T7, T8);
impl_query_sets!(T0, T1, T2, T3, T4, T5, T6, T7, T8, T9);
impl_query_sets!(T0, T1, T2, T3, T4, T5, T6, T7, T8, T9, T10);
impl_query_sets!(T0, T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11);
