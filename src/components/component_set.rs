use crate::components::{Component, ComponentId, ComponentMeta};
use paste::paste;

/// A set of [component](Component) values used to create an [entity](crate::entities::EntityId).
///
/// Implemented for every [Component] and for tuples of up to twelve components.
pub trait Bundle: 'static {
	/// Pushes the metadata of every component in the bundle, in declaration order.
	fn metas(metas: &mut Vec<&'static ComponentMeta>);

	/// Moves every component of the bundle into the storage returned by `dst`.
	///
	/// # Safety
	/// `dst` must return valid, uninitialized storage for each component id it is given.
	unsafe fn write(self, dst: &mut dyn FnMut(ComponentId) -> *mut u8);
}

/// A set of [component](Component) types.
/// It provides a unified way to name a list of components without carrying any values,
/// for example as an additional filter on a [Query](crate::query::Query).
pub trait ComponentSet {
	/// Pushes the id of every component in the set.
	fn component_ids(ids: &mut Vec<ComponentId>);
}

impl Bundle for () {
	fn metas(_: &mut Vec<&'static ComponentMeta>) {}
	unsafe fn write(self, _: &mut dyn FnMut(ComponentId) -> *mut u8) {}
}

impl ComponentSet for () {
	fn component_ids(_: &mut Vec<ComponentId>) {}
}

macro_rules! impl_component_sets {
    ($($t: ident),*) => {
        paste! {
            #[allow(unused_parens)]
            impl<$($t: Component),*> Bundle for ($($t),*) {
                fn metas(metas: &mut Vec<&'static ComponentMeta>) {
                    $(metas.push($t::meta());)*
                }

                unsafe fn write(self, dst: &mut dyn FnMut(ComponentId) -> *mut u8) {
                    let ($([<$t:lower>]),*) = self;
                    $(dst($t::component_id()).cast::<$t>().write([<$t:lower>]);)*
                }
            }

            #[allow(unused_parens)]
            impl<$($t: Component),*> ComponentSet for ($($t),*) {
                fn component_ids(ids: &mut Vec<ComponentId>) {
                    $(ids.push($t::component_id());)*
                }
            }
        }
    };
}

impl_component_sets!(T0);
impl_component_sets!(T0, T1);
impl_component_sets!(T0, T1, T2);
impl_component_sets!(T0, T1, T2, T3);
impl_component_sets!(T0, T1, T2, T3, T4);
impl_component_sets!(T0, T1, T2, T3, T4, T5);
impl_component_sets!(T0, T1, T2, T3, T4, T5, T6);
impl_component_sets!(T0, T1, T2, T3, T4, T5, T6, T7);
impl_component_sets!(T0, T1, T2, T3, T4, T5, T6, T7, T8);
impl_component_sets!(T0, T1, T2, T3, T4, T5, T6, T7, T8, T9);
impl_component_sets!(T0, T1, T2, T3, T4, T5, T6, T7, T8, T9, T10);
impl_component_sets!(T0, T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11);
