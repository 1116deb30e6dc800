//! Key naming for reflected members.

use syn::Ident;

/// Reflected key for a Rust identifier: `with_a` -> `withA`, `r#type` -> `type`.
pub fn reflected_name(ident: &Ident) -> String {
    to_lower_camel_case(ident.to_string().trim_start_matches("r#"))
}

/// Convert snake_case to lowerCamelCase. Leading underscores are kept.
pub fn to_lower_camel_case(s: &str) -> String {
    let body = s.trim_start_matches('_');
    let mut result = String::with_capacity(s.len());
    result.push_str(&s[..s.len() - body.len()]);

    let mut upper_next = false;
    for c in body.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            result.extend(c.to_uppercase());
            upper_next = false;
        } else {
            result.push(c);
        }
    }
    result
}

/// True iff `key` survives the `maybeFoo` round trip: upper-casing its
/// first character and lower-casing it back yields `key` again.
pub fn has_conditional_variant(key: &str) -> bool {
    let mut chars = key.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    let upper: String = first.to_uppercase().chain(chars).collect();
    let mut upper_chars = upper.chars();
    let Some(head) = upper_chars.next() else {
        return false;
    };
    head.is_uppercase() && head.to_lowercase().chain(upper_chars).eq(key.chars())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_snake_case() {
        assert_eq!(to_lower_camel_case("with_a"), "withA");
        assert_eq!(to_lower_camel_case("to_string"), "toString");
        assert_eq!(to_lower_camel_case("render"), "render");
        assert_eq!(to_lower_camel_case("_hidden_field"), "_hiddenField");
        assert_eq!(to_lower_camel_case("double__gap"), "doubleGap");
    }

    #[test]
    fn conditional_variants_need_a_lower_case_head() {
        assert!(has_conditional_variant("withA"));
        assert!(has_conditional_variant("toString"));
        assert!(has_conditional_variant("état"));
        assert!(!has_conditional_variant("_reset"));
        assert!(!has_conditional_variant("Shout"));
        assert!(!has_conditional_variant("2fa"));
        assert!(!has_conditional_variant("ßig"));
        assert!(!has_conditional_variant(""));
    }
}
