mod component;

use proc_macro::TokenStream;

/// Implements `chunk_ecs::components::Component` for a struct or enum.
///
/// The type is registered with the global component registry the first time its
/// metadata is requested, under its module-qualified name.
#[proc_macro_derive(Component)]
pub fn derive_component(input: TokenStream) -> TokenStream {
    let ast = syn::parse(input).unwrap();
    component::impl_component(&ast)
}
