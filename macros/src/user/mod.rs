//! User-facing macro implementations
//!
//! | Macro | Usage | Purpose |
//! |-------|-------|---------|
//! | `#[derive(Fields)]` | on struct | Reflect readable members |
//! | `#[methods]` | on inherent impl | Reflect callable members |

mod fields;
mod methods;

pub use fields::expand_derive_fields;
pub use methods::expand_methods;
