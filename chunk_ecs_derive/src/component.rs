use quote::{format_ident, quote};
use proc_macro::TokenStream;
use syn::DeriveInput;

pub fn impl_component(ast: &DeriveInput) -> TokenStream {
    let name = &ast.ident;

    let name_str = name.to_string();
    let meta_name = format_ident!("__COMPONENT_META_OF_{}", name_str.to_uppercase());

    let gen = quote! {
        chunk_ecs::lazy_static! {
            static ref #meta_name: &'static chunk_ecs::components::ComponentMeta =
                chunk_ecs::components::register_component::<#name>(
                    concat!(module_path!(), "::", #name_str)
                );
        }

        impl chunk_ecs::components::Component for #name {
            #[inline(always)]
            fn meta() -> &'static chunk_ecs::components::ComponentMeta {
                *#meta_name
            }
        }
    };
    gen.into()
}
