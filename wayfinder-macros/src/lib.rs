//! Procedural macros for Wayfinder.
//!
//! - `#[derive(Route)]` - Implements the `Route` marker trait

use proc_macro::TokenStream;

mod route;

/// Derive macro for implementing the `Route` trait.
///
/// The type must also implement `Clone`, `Debug` and `PartialEq`.
///
/// # Attributes
///
/// - `#[route(name = "...")]` on the type overrides the diagnostic name.
///   Without it, the name is the type path.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Clone, Debug, PartialEq, Route)]
/// #[route(name = "settings")]
/// enum SettingsRoute {
///     Overview,
///     Account { id: u64 },
/// }
/// ```
#[proc_macro_derive(Route, attributes(route))]
pub fn derive_route(input: TokenStream) -> TokenStream {
    route::derive_route_impl(input)
}
