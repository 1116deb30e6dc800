//! `#[derive(Fields)]`: readable members of a struct.

use proc_macro2::TokenStream as TokenStream2;
use quote::{quote, ToTokens};
use syn::spanned::Spanned;
use syn::{Data, DeriveInput, Fields, Index, LitStr, Member};

use crate::common::{key_span, reflected_name, KeySet, MemberAttrs};

struct ReflectedField {
    key: String,
    member: Member,
    opaque: Option<LitStr>,
    is_opaque: bool,
    ty_name: String,
}

/// Generates `impl ::maybify::Fields`.
///
/// Named fields reflect under their lowerCamelCase name, tuple fields under
/// their index. Field values are cloned into `::maybify::Value`.
pub fn expand_derive_fields(input: DeriveInput) -> TokenStream2 {
    match try_expand(input) {
        Ok(tokens) => tokens,
        Err(err) => err.to_compile_error(),
    }
}

fn try_expand(input: DeriveInput) -> syn::Result<TokenStream2> {
    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let data = match &input.data {
        Data::Struct(data) => data,
        _ => {
            return Err(syn::Error::new_spanned(
                ident,
                "#[derive(Fields)] supports structs only",
            ));
        }
    };

    let mut fields = Vec::new();
    let mut keys = KeySet::default();
    let members: Vec<(Member, &syn::Field)> = match &data.fields {
        Fields::Named(named) => named
            .named
            .iter()
            .filter_map(|f| f.ident.clone().map(|id| (Member::Named(id), f)))
            .collect(),
        Fields::Unnamed(unnamed) => unnamed
            .unnamed
            .iter()
            .enumerate()
            .map(|(i, f)| (Member::Unnamed(Index::from(i)), f))
            .collect(),
        Fields::Unit => Vec::new(),
    };

    for (member, field) in members {
        let attrs = MemberAttrs::parse(&field.attrs)?;
        if attrs.skip {
            continue;
        }
        let default_key = match &member {
            Member::Named(id) => reflected_name(id),
            Member::Unnamed(index) => index.index.to_string(),
        };
        let key = attrs.key(default_key);
        keys.claim(&key, key_span(&attrs, field.span()))?;
        fields.push(ReflectedField {
            key,
            member,
            is_opaque: attrs.opaque.is_some(),
            opaque: attrs.opaque.flatten(),
            ty_name: field.ty.to_token_stream().to_string().replace(' ', ""),
        });
    }

    let arms = fields.iter().map(|f| {
        let key = &f.key;
        let member = &f.member;
        if f.is_opaque {
            let kind = f
                .opaque
                .as_ref()
                .map_or_else(|| f.ty_name.clone(), LitStr::value);
            quote! {
                #key => ::core::option::Option::Some(::maybify::Field::Opaque(#kind)),
            }
        } else {
            quote! {
                #key => ::core::option::Option::Some(::maybify::Field::Value(
                    ::maybify::Value::from(::core::clone::Clone::clone(&self.#member)),
                )),
            }
        }
    });
    let keys = fields.iter().map(|f| &f.key);

    Ok(quote! {
        impl #impl_generics ::maybify::Fields for #ident #ty_generics #where_clause {
            fn field(&self, key: &str) -> ::core::option::Option<::maybify::Field> {
                match key {
                    #(#arms)*
                    _ => ::core::option::Option::None,
                }
            }

            fn field_names(&self) -> &'static [&'static str] {
                &[#(#keys),*]
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand(input: DeriveInput) -> String {
        expand_derive_fields(input).to_string()
    }

    #[test]
    fn reflects_named_and_renamed_fields() {
        let out = expand(syn::parse_quote! {
            struct Request {
                url: String,
                #[maybify(rename = "hdrs")]
                headers: Vec<String>,
                #[maybify(skip)]
                secret: String,
            }
        });
        assert!(!out.contains("compile_error"), "{out}");
        assert!(out.contains("\"url\""));
        assert!(out.contains("\"hdrs\""));
        assert!(!out.contains("\"secret\""));
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let out = expand(syn::parse_quote! {
            struct Request {
                url: String,
                #[maybify(rename = "url")]
                link: String,
            }
        });
        assert!(out.contains("duplicate reflected key 'url'"), "{out}");
    }

    #[test]
    fn enums_are_rejected() {
        let out = expand(syn::parse_quote! {
            enum Mode { A, B }
        });
        assert!(out.contains("supports structs only"), "{out}");
    }
}
