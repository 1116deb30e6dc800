// Common utilities shared between the user-facing macros
//
// This module contains:
// - naming: snake_case -> lowerCamelCase reflected keys
// - parse_utils: `#[maybify(...)]` member attribute parsing

mod naming;
mod parse_utils;

pub use naming::*;
pub use parse_utils::*;
