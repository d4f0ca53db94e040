use proc_macro::{self, TokenStream};
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    Data, DeriveInput, Fields, GenericParam, Generics, Index, ext::IdentExt, parse_macro_input,
    parse_quote,
};

/// Derive `HostType`, `IntoValue` and `FromValue` for a struct. Named fields
/// map to record labels, tuple struct fields to positions starting at 1.
#[proc_macro_derive(Record)]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

struct FieldInfo {
    /// Expression building the `FieldName`.
    name: TokenStream2,
    /// `self.<member>`
    member: TokenStream2,
    ty: syn::Type,
}

fn expand(input: DeriveInput) -> syn::Result<TokenStream2> {
    let ident = &input.ident;
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "Record can only be derived for structs",
        ));
    };

    let fields: Vec<FieldInfo> = match &data.fields {
        Fields::Named(named) => named
            .named
            .iter()
            .filter_map(|field| {
                let ident = field.ident.as_ref()?;
                let label = ident.unraw().to_string();
                Some(FieldInfo {
                    name: quote!(::structrec::FieldName::label(#label)),
                    member: quote!(#ident),
                    ty: field.ty.clone(),
                })
            })
            .collect(),
        Fields::Unnamed(unnamed) => unnamed
            .unnamed
            .iter()
            .enumerate()
            .map(|(i, field)| {
                let position = i as u32 + 1;
                let index = Index::from(i);
                FieldInfo {
                    name: quote!(::structrec::FieldName::Position(#position)),
                    member: quote!(#index),
                    ty: field.ty.clone(),
                }
            })
            .collect(),
        Fields::Unit => Vec::new(),
    };

    let names: Vec<_> = fields.iter().map(|field| &field.name).collect();
    let members: Vec<_> = fields.iter().map(|field| &field.member).collect();
    let types: Vec<_> = fields.iter().map(|field| &field.ty).collect();

    let construct = match &data.fields {
        Fields::Named(_) => quote! {
            Self { #( #members: ::structrec::host::field::<#types>(record, &#names, registry)?, )* }
        },
        Fields::Unnamed(_) => quote! {
            Self( #( ::structrec::host::field::<#types>(record, &#names, registry)?, )* )
        },
        Fields::Unit => quote!(Self),
    };

    let host_generics = with_bound(&input.generics, quote!(::structrec::HostType));
    let into_generics = with_bound(&input.generics, quote!(::structrec::IntoValue));
    let from_generics = with_bound(&input.generics, quote!(::structrec::FromValue));
    let (host_impl, ty_generics, host_where) = host_generics.split_for_impl();
    let (into_impl, _, into_where) = into_generics.split_for_impl();
    let (from_impl, _, from_where) = from_generics.split_for_impl();

    Ok(quote! {
        impl #host_impl ::structrec::HostType for #ident #ty_generics #host_where {
            fn host_type(registry: &::structrec::TypeRegistry) -> ::structrec::Type {
                ::structrec::Type::Record(::structrec::host::struct_type(
                    registry,
                    vec![ #( (#names, <#types as ::structrec::HostType>::host_type(registry)), )* ],
                ))
            }
        }

        impl #into_impl ::structrec::IntoValue for #ident #ty_generics #into_where {
            fn into_value(self, registry: &::structrec::TypeRegistry) -> ::structrec::Value {
                ::structrec::host::struct_value(
                    registry,
                    vec![ #( (
                        #names,
                        <#types as ::structrec::HostType>::host_type(registry),
                        ::structrec::IntoValue::into_value(self.#members, registry),
                    ), )* ],
                )
            }
        }

        impl #from_impl ::structrec::FromValue for #ident #ty_generics #from_where {
            #[allow(unused_variables)]
            fn from_value(
                value: &::structrec::Value,
                registry: &::structrec::TypeRegistry,
            ) -> ::std::result::Result<Self, ::structrec::TypeMismatchError> {
                let record = ::structrec::host::record_of::<Self>(value, registry)?;
                Ok(#construct)
            }
        }
    })
}

/// Require `bound` of every type parameter.
fn with_bound(generics: &Generics, bound: TokenStream2) -> Generics {
    let mut generics = generics.clone();
    for param in &mut generics.params {
        if let GenericParam::Type(ty) = param {
            ty.bounds.push(parse_quote!(#bound));
        }
    }
    generics
}
