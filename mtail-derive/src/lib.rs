//! Derives `serde::Serialize` for AST values paired with their program.
//!
//! `#[derive(Serialize)]` on an AST type `T` generates `impl Serialize for ProgramNode<'_, T>`.
//! Every field is serialized through `ProgramNode` as well, so node references are resolved and
//! written out as the nodes themselves. Fields holding plain data (strings, numbers, operator
//! tokens) must be marked `#[no_wrap]` to be serialized directly.
//!
//! Supported shapes are structs with named fields and enums whose variants are either unit
//! variants or newtype variants. That covers every type in the AST.

use proc_macro2::TokenStream;
use quote::{format_ident, quote, quote_spanned};
use syn::spanned::Spanned;
use syn::{
    AttrStyle, Data, DataEnum, DeriveInput, Field, Fields, FieldsNamed, Ident, LitStr, Meta,
    parse_macro_input,
};

#[proc_macro_derive(Serialize, attributes(no_wrap))]
pub fn derive_serialize_for_nodes(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input: DeriveInput = parse_macro_input!(input as DeriveInput);

    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    if !input.generics.params.is_empty() || input.generics.where_clause.is_some() {
        return Err(syn::Error::new(
            input.generics.span(),
            "generic items are not supported by this derive macro",
        ));
    }

    let name = &input.ident;
    let name_lit = LitStr::new(&name.to_string(), name.span());

    let serialize_body = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => generate_serialize_for_struct(&name_lit, fields),

            fields => {
                return Err(syn::Error::new(
                    fields.span(),
                    "only structs with named fields are supported",
                ));
            }
        },

        Data::Enum(data) => generate_serialize_for_enum(name, &name_lit, data)?,

        Data::Union(data) => {
            return Err(syn::Error::new(
                data.union_token.span(),
                "unions are not supported",
            ));
        }
    };

    Ok(quote! {
        #[cfg(feature = "serde")]
        impl ::serde::Serialize for crate::ProgramNode<'_, #name> {
            fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
            where
                S: ::serde::Serializer,
            {
                #serialize_body
            }
        }
    })
}

fn generate_serialize_for_struct(name_lit: &LitStr, fields: &FieldsNamed) -> TokenStream {
    let field_count = fields.named.len();

    let ser_fields = fields.named.iter().map(|field| {
        // named fields always have an identifier.
        let field_name = field.ident.as_ref().map(ToString::to_string).unwrap_or_default();
        let field_name_lit = LitStr::new(&field_name, field.span());
        let field_expr = generate_field_expr(field);

        quote_spanned! {field.span()=>
            <S::SerializeStruct as ::serde::ser::SerializeStruct>::serialize_field(
                &mut state,
                #field_name_lit,
                #field_expr,
            )?;
        }
    });

    quote! {
        let mut state = serializer.serialize_struct(#name_lit, #field_count)?;
        #(#ser_fields)*

        <S::SerializeStruct as ::serde::ser::SerializeStruct>::end(state)
    }
}

fn generate_serialize_for_enum(
    name: &Ident,
    name_lit: &LitStr,
    data: &DataEnum,
) -> syn::Result<TokenStream> {
    let arms = data
        .variants
        .iter()
        .enumerate()
        .map(|(idx, variant)| {
            let idx = u32::try_from(idx)
                .map_err(|_| syn::Error::new(variant.span(), "too many variants"))?;
            let variant_name = &variant.ident;
            let variant_name_lit = LitStr::new(&variant_name.to_string(), variant_name.span());

            Ok(match &variant.fields {
                Fields::Unit => quote! {
                    #name::#variant_name => serializer.serialize_unit_variant(
                        #name_lit,
                        #idx,
                        #variant_name_lit,
                    ),
                },

                Fields::Unnamed(fields) if fields.unnamed.len() == 1 => {
                    let binding = format_ident!("__field0");
                    let value = if has_no_wrap(&fields.unnamed[0]) {
                        quote! { #binding }
                    } else {
                        quote! { &crate::ProgramNode::new(#binding, self.program()) }
                    };

                    quote! {
                        #name::#variant_name(#binding) => serializer.serialize_newtype_variant(
                            #name_lit,
                            #idx,
                            #variant_name_lit,
                            #value,
                        ),
                    }
                }

                fields => {
                    return Err(syn::Error::new(
                        fields.span(),
                        "only unit and newtype variants are supported",
                    ));
                }
            })
        })
        .collect::<syn::Result<Vec<_>>>()?;

    Ok(quote! {
        match self.inner() {
            #(#arms)*
        }
    })
}

fn generate_field_expr(field: &Field) -> TokenStream {
    let name = &field.ident;

    if has_no_wrap(field) {
        quote_spanned! {field.span()=>
            &self.inner().#name
        }
    } else {
        quote_spanned! {field.span()=>
            &self.map(|inner| &inner.#name)
        }
    }
}

fn has_no_wrap(field: &Field) -> bool {
    field.attrs.iter().any(|attr| {
        matches!(attr.style, AttrStyle::Outer)
            && matches!(&attr.meta, Meta::Path(path) if path.is_ident("no_wrap"))
    })
}
