//! `#[methods]`: callable members of an inherent impl block.
//!
//! Each reflected method gets a shim of type `::maybify::Invoke<Self>` that
//! converts the dynamic arguments, calls the method on the target and maps
//! its return value:
//!
//! | Return type | Outcome |
//! |-------------|---------|
//! | `&Self`, `&mut Self`, `&Type`, `&mut Type` | `Outcome::Receiver` |
//! | none, `()` | `Outcome::Value(Value::Undefined)` |
//! | `Result<R, E>` | `Err` -> `Error::Method`, `Ok` by the rules for `R` |
//! | anything else | `Outcome::Value(Value::from(ret))` |

use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::{format_ident, quote};
use syn::{
    FnArg, GenericArgument, ImplItem, ImplItemFn, ItemImpl, PathArguments, ReturnType, Type,
};

use crate::common::{
    has_conditional_variant, key_span, reflected_name, strip_member_attrs, KeySet, MemberAttrs,
};

struct ReflectedMethod {
    key: String,
    span: Span,
    shim: TokenStream2,
}

pub fn expand_methods(mut item: ItemImpl) -> TokenStream2 {
    match collect(&mut item) {
        Ok(methods) => {
            let generated = generate(&item, &methods);
            quote! {
                #item
                #generated
            }
        }
        Err(err) => {
            // Still emit the impl so the error is the only diagnostic.
            strip_all(&mut item);
            let err = err.to_compile_error();
            quote! {
                #item
                #err
            }
        }
    }
}

fn strip_all(item: &mut ItemImpl) {
    for impl_item in &mut item.items {
        if let ImplItem::Fn(f) = impl_item {
            strip_member_attrs(&mut f.attrs);
        }
    }
}

// =============================================================================
// Collection
// =============================================================================

fn collect(item: &mut ItemImpl) -> syn::Result<Vec<ReflectedMethod>> {
    if let Some((_, path, _)) = &item.trait_ {
        return Err(syn::Error::new_spanned(
            path,
            "#[methods] applies to inherent impl blocks only",
        ));
    }

    let self_name = self_type_name(&item.self_ty);
    let mut methods = Vec::new();
    let mut keys = KeySet::default();
    let mut errors: Option<syn::Error> = None;

    for impl_item in &mut item.items {
        let ImplItem::Fn(f) = impl_item else {
            continue;
        };
        let attrs = MemberAttrs::parse(&f.attrs);
        strip_member_attrs(&mut f.attrs);
        let result = attrs
            .and_then(|attrs| reflect_method(f, &attrs, self_name.as_deref()))
            .and_then(|method| match method {
                Some(method) => keys.claim(&method.key, method.span).map(|()| Some(method)),
                None => Ok(None),
            });
        match result {
            Ok(Some(method)) => methods.push(method),
            Ok(None) => {}
            Err(err) => match &mut errors {
                Some(all) => all.combine(err),
                None => errors = Some(err),
            },
        }
    }

    match errors {
        Some(err) => Err(err),
        None => Ok(methods),
    }
}

fn reflect_method(
    f: &ImplItemFn,
    attrs: &MemberAttrs,
    self_name: Option<&str>,
) -> syn::Result<Option<ReflectedMethod>> {
    if attrs.skip {
        return Ok(None);
    }
    // Associated functions have no receiver to forward.
    let Some(FnArg::Receiver(receiver)) = f.sig.inputs.first() else {
        return Ok(None);
    };
    if !matches!(&*receiver.ty, Type::Reference(_)) {
        return Err(syn::Error::new_spanned(
            receiver,
            "reflected methods must borrow their receiver; mark with #[maybify(skip)]",
        ));
    }
    if !f.sig.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &f.sig.generics,
            "generic methods cannot be reflected; mark with #[maybify(skip)]",
        ));
    }
    if f.sig.asyncness.is_some() {
        return Err(syn::Error::new_spanned(
            f.sig.asyncness,
            "async methods cannot be reflected; mark with #[maybify(skip)]",
        ));
    }

    let key = attrs.key(reflected_name(&f.sig.ident));
    let span = key_span(attrs, f.sig.ident.span());
    if !has_conditional_variant(&key) {
        return Err(syn::Error::new(
            span,
            format!(
                "'{key}' has no conditional variant; reflected method names must start \
                 with a lower-case letter, or mark with #[maybify(skip)]"
            ),
        ));
    }
    let ident = &f.sig.ident;

    let mut bindings = Vec::new();
    let mut names = Vec::new();
    for (i, arg) in f.sig.inputs.iter().skip(1).enumerate() {
        let FnArg::Typed(pat_type) = arg else {
            continue;
        };
        if let Type::Reference(_) = &*pat_type.ty {
            return Err(syn::Error::new_spanned(
                &pat_type.ty,
                "reflected methods take owned arguments",
            ));
        }
        let ty = &pat_type.ty;
        let name = format_ident!("__arg{}", i);
        bindings.push(quote! { let #name: #ty = __args.take()?; });
        names.push(name);
    }

    let call = quote! { Self::#ident(__target, #(#names),*) };
    let body = match &f.sig.output {
        ReturnType::Default => unit_outcome(call),
        ReturnType::Type(_, ty) => match result_ok_type(ty) {
            Some(ok) => {
                let ok_outcome = outcome_for(ok, quote! { __ok }, self_name);
                quote! {
                    match #call {
                        ::core::result::Result::Ok(__ok) => #ok_outcome,
                        ::core::result::Result::Err(__err) => {
                            ::core::result::Result::Err(::maybify::Error::method(#key, __err))
                        }
                    }
                }
            }
            None => outcome_for(ty, call, self_name),
        },
    };

    let shim = quote! {
        ::maybify::Method::new(#key, |__target, __values| {
            #[allow(unused_mut, unused_variables)]
            let mut __args = ::maybify::Args::new(#key, __values);
            #(#bindings)*
            #body
        })
    };
    Ok(Some(ReflectedMethod { key, span, shim }))
}

// =============================================================================
// Return Mapping
// =============================================================================

fn unit_outcome(expr: TokenStream2) -> TokenStream2 {
    quote! {{
        let _ = #expr;
        ::core::result::Result::Ok(::maybify::Outcome::Value(::maybify::Value::Undefined))
    }}
}

fn outcome_for(ty: &Type, expr: TokenStream2, self_name: Option<&str>) -> TokenStream2 {
    if returns_receiver(ty, self_name) {
        return quote! {{
            let _ = #expr;
            ::core::result::Result::Ok(::maybify::Outcome::Receiver)
        }};
    }
    if let Type::Tuple(tuple) = ty {
        if tuple.elems.is_empty() {
            return unit_outcome(expr);
        }
    }
    quote! {
        ::core::result::Result::Ok(::maybify::Outcome::Value(::maybify::Value::from(#expr)))
    }
}

/// `&Self`, `&mut Self` or a reference to the impl's own type.
fn returns_receiver(ty: &Type, self_name: Option<&str>) -> bool {
    let Type::Reference(reference) = ty else {
        return false;
    };
    let Type::Path(path) = &*reference.elem else {
        return false;
    };
    let Some(last) = path.path.segments.last() else {
        return false;
    };
    last.ident == "Self" || self_name.is_some_and(|name| last.ident == name)
}

/// The `T` of `Result<T, E>` (or of a `Result<T>` alias).
fn result_ok_type(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let last = path.path.segments.last()?;
    if last.ident != "Result" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &last.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(ok) => Some(ok),
        _ => None,
    }
}

fn self_type_name(ty: &Type) -> Option<String> {
    match ty {
        Type::Path(path) => path.path.segments.last().map(|s| s.ident.to_string()),
        _ => None,
    }
}

// =============================================================================
// Generation
// =============================================================================

fn generate(item: &ItemImpl, methods: &[ReflectedMethod]) -> TokenStream2 {
    let self_ty = &item.self_ty;
    let (impl_generics, _, where_clause) = item.generics.split_for_impl();

    let arms = methods.iter().map(|m| {
        let key = &m.key;
        let shim = &m.shim;
        quote! { #key => ::core::option::Option::Some(#shim), }
    });
    let keys = methods.iter().map(|m| &m.key);

    quote! {
        impl #impl_generics ::maybify::Methods for #self_ty #where_clause {
            fn method(key: &str) -> ::core::option::Option<::maybify::Method<Self>> {
                match key {
                    #(#arms)*
                    _ => ::core::option::Option::None,
                }
            }

            fn method_names() -> &'static [&'static str] {
                &[#(#keys),*]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand(item: ItemImpl) -> String {
        expand_methods(item).to_string()
    }

    #[test]
    fn typed_reference_receivers_are_reflected() {
        let out = expand(syn::parse_quote! {
            impl Builder {
                fn touch(self: &mut Self) -> &mut Self { self }
                fn peek(self: &Self) -> u32 { 0 }
            }
        });
        assert!(!out.contains("compile_error"), "{out}");
        assert!(out.contains("\"touch\""));
        assert!(out.contains("\"peek\""));
    }

    #[test]
    fn owned_receivers_are_rejected() {
        let out = expand(syn::parse_quote! {
            impl Builder {
                fn finish(self) -> u32 { 0 }
            }
        });
        assert!(out.contains("must borrow their receiver"), "{out}");
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let out = expand(syn::parse_quote! {
            impl Builder {
                fn with_a(&mut self) {}
                #[maybify(rename = "withA")]
                fn set_a(&mut self) {}
            }
        });
        assert!(out.contains("duplicate reflected key 'withA'"), "{out}");
    }

    #[test]
    fn names_without_a_conditional_variant_are_rejected() {
        let out = expand(syn::parse_quote! {
            impl Builder {
                fn _reset(&mut self) {}
                #[maybify(rename = "Shout")]
                fn shout(&self) {}
            }
        });
        assert!(out.contains("'_reset' has no conditional variant"), "{out}");
        assert!(out.contains("'Shout' has no conditional variant"), "{out}");
    }

    #[test]
    fn skipped_names_are_not_checked() {
        let out = expand(syn::parse_quote! {
            impl Builder {
                #[maybify(skip)]
                fn _reset(&mut self) {}
                fn reset(&mut self) {}
            }
        });
        assert!(!out.contains("compile_error"), "{out}");
        assert!(!out.contains("maybify (skip)"), "{out}");
    }
}
