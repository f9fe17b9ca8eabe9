//! `#[derive(Route)]`.

use proc_macro::TokenStream;
use quote::quote;
use syn::{Attribute, DeriveInput, LitStr, parse_macro_input};

/// Arguments of `#[route(...)]`.
#[derive(Default)]
struct RouteArgs {
    name: Option<LitStr>,
}

impl RouteArgs {
    fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut args = RouteArgs::default();
        for attr in attrs.iter().filter(|attr| attr.path().is_ident("route")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let lit: LitStr = meta.value()?.parse()?;
                    if lit.value().is_empty() {
                        return Err(meta.error("route name must not be empty"));
                    }
                    args.name = Some(lit);
                    Ok(())
                } else {
                    Err(meta.error("unknown route attribute; expected `name`"))
                }
            })?;
        }
        Ok(args)
    }
}

/// Implementation of `#[derive(Route)]`.
pub fn derive_route_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let args = match RouteArgs::from_attrs(&input.attrs) {
        Ok(args) => args,
        Err(err) => return err.to_compile_error().into(),
    };

    let route_name = args.name.map(|lit| {
        quote! {
            fn route_name(&self) -> &'static str {
                #lit
            }
        }
    });

    let expanded = quote! {
        impl #impl_generics ::wayfinder::Route for #name #ty_generics #where_clause {
            #route_name
        }
    };

    TokenStream::from(expanded)
}
