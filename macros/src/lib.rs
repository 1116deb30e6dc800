//! Procedural macros for maybify
//!
//! These generate the reflection surface the wrapper intercepts, at build
//! time, so no runtime type inspection is needed.
//!
//! | Macro | Target | Purpose |
//! |-------|--------|---------|
//! | `#[derive(Fields)]` | struct | Readable members as `Value`s |
//! | `#[methods]` | inherent impl | Callable members as `Method`s |
//!
//! ## Example
//!
//! ```ignore
//! #[derive(Default, Fields)]
//! struct Builder {
//!     a: String,
//!     #[maybify(skip)]
//!     scratch: Vec<u8>,
//! }
//!
//! #[methods]
//! impl Builder {
//!     // reflected as "withA"
//!     fn with_a(&mut self, a: String) -> &mut Self { self.a = a; self }
//!
//!     #[maybify(rename = "toString")]
//!     fn render(&self) -> String { self.a.clone() }
//! }
//! ```

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput, ItemImpl};

mod common;
mod user;

/// Implement `maybify::Fields` for a struct.
///
/// # Field attributes
///
/// - `#[maybify(rename = "key")]` - reflect under `key` instead of the lowerCamelCase name
/// - `#[maybify(skip)]` - do not reflect the field
/// - `#[maybify(opaque)]` / `#[maybify(opaque = "kind")]` - reflect the field as a
///   member of unhandled kind; reading it through the wrapper fails
#[proc_macro_derive(Fields, attributes(maybify))]
pub fn derive_fields(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    user::expand_derive_fields(input).into()
}

/// Implement `maybify::Methods` for the self type of an inherent impl block.
///
/// Every method borrowing `self` is reflected under its lowerCamelCase name.
/// Method attributes: `#[maybify(rename = "key")]`, `#[maybify(skip)]`.
#[proc_macro_attribute]
pub fn methods(attr: TokenStream, item: TokenStream) -> TokenStream {
    if !attr.is_empty() {
        return syn::Error::new(
            proc_macro2::Span::call_site(),
            "#[methods] takes no arguments",
        )
        .to_compile_error()
        .into();
    }
    let item = parse_macro_input!(item as ItemImpl);
    user::expand_methods(item).into()
}
