//! Common parsing utilities
//!
//! Shared handling of the `#[maybify(...)]` member attribute, used by both
//! `#[derive(Fields)]` and `#[methods]`.

use std::collections::HashSet;

use proc_macro2::Span;
use syn::{Attribute, LitStr};

/// Name of the inert helper attribute.
pub const ATTR: &str = "maybify";

// =============================================================================
// Member Attributes: `#[maybify(rename = "...", skip, opaque)]`
// =============================================================================

/// Options collected from every `#[maybify(...)]` on one member.
#[derive(Default)]
pub struct MemberAttrs {
    pub rename: Option<LitStr>,
    pub skip: bool,
    /// `Some(None)` for bare `opaque`, `Some(Some(kind))` for `opaque = "kind"`.
    pub opaque: Option<Option<LitStr>>,
}

impl MemberAttrs {
    pub fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = MemberAttrs::default();
        for attr in attrs.iter().filter(|a| a.path().is_ident(ATTR)) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    out.rename = Some(meta.value()?.parse()?);
                    Ok(())
                } else if meta.path.is_ident("skip") {
                    out.skip = true;
                    Ok(())
                } else if meta.path.is_ident("opaque") {
                    let kind = if meta.input.peek(syn::Token![=]) {
                        Some(meta.value()?.parse()?)
                    } else {
                        None
                    };
                    out.opaque = Some(kind);
                    Ok(())
                } else {
                    Err(meta.error("expected `rename = \"...\"`, `skip` or `opaque`"))
                }
            })?;
        }
        Ok(out)
    }

    /// The reflected key: the rename if given, else `default`.
    pub fn key(&self, default: String) -> String {
        self.rename.as_ref().map_or(default, LitStr::value)
    }
}

// =============================================================================
// Key Uniqueness
// =============================================================================

/// Reflected keys already taken within one item.
#[derive(Default)]
pub struct KeySet {
    seen: HashSet<String>,
}

impl KeySet {
    /// Record `key`, failing at `span` if an earlier member already took it.
    pub fn claim(&mut self, key: &str, span: Span) -> syn::Result<()> {
        if self.seen.insert(key.to_owned()) {
            Ok(())
        } else {
            Err(syn::Error::new(
                span,
                format!("duplicate reflected key '{key}'; use #[maybify(rename = \"...\")] or #[maybify(skip)]"),
            ))
        }
    }
}

/// Span of the member's key: the rename literal if given, else `fallback`.
pub fn key_span(attrs: &MemberAttrs, fallback: Span) -> Span {
    attrs.rename.as_ref().map_or(fallback, LitStr::span)
}

/// Drop `#[maybify(...)]` helpers so the re-emitted item compiles.
pub fn strip_member_attrs(attrs: &mut Vec<Attribute>) {
    attrs.retain(|a| !a.path().is_ident(ATTR));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_claim_of_a_key_fails() {
        let mut keys = KeySet::default();
        assert!(keys.claim("withA", Span::call_site()).is_ok());
        assert!(keys.claim("withB", Span::call_site()).is_ok());
        let err = keys.claim("withA", Span::call_site()).unwrap_err();
        assert!(err.to_string().contains("duplicate reflected key 'withA'"));
    }

    #[test]
    fn parses_member_options() {
        let attrs: Vec<Attribute> = vec![
            syn::parse_quote!(#[maybify(rename = "hdrs")]),
            syn::parse_quote!(#[maybify(opaque = "bigint")]),
        ];
        let parsed = MemberAttrs::parse(&attrs).unwrap();
        assert_eq!(parsed.key("headers".to_owned()), "hdrs");
        assert!(!parsed.skip);
        assert_eq!(parsed.opaque.flatten().map(|kind| kind.value()).as_deref(), Some("bigint"));
    }
}
