//! shapewire-macros - Derive macros for shapewire shapes
//!
//! This crate provides `#[derive(Shape)]`, which generates the
//! `ShapeSchema`, `SerializeShape`, `SerializeStructure` and
//! `DeserializeShape` impls for a type bound to a static schema:
//!
//! - named-field structs become structures; field `i` is member `i`
//! - enums with single-field variants become unions
//! - enums with unit variants become string enums (`#[shape(value = "..")]`)
//!   or int enums (`#[shape(int = N)]`)
//!
//! Generated code refers to `::shapewire_core`, so the crate using the
//! derive depends on `shapewire-core` (directly or through `shapewire`).

use darling::util::Flag;
use darling::{FromDeriveInput, FromField, FromVariant, ast};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::{DeriveInput, GenericArgument, PathArguments, Type, parse_macro_input};

/// Options for the Shape derive macro
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(shape), supports(struct_named, enum_any))]
struct ShapeOpts {
    ident: syn::Ident,
    generics: syn::Generics,
    data: ast::Data<VariantOpts, FieldOpts>,

    /// Path of the static schema describing this type
    schema: syn::Path,
}

#[derive(Debug, FromField)]
#[darling(attributes(shape))]
struct FieldOpts {
    ident: Option<syn::Ident>,
    ty: Type,
}

#[derive(Debug, FromVariant)]
#[darling(attributes(shape))]
struct VariantOpts {
    ident: syn::Ident,
    fields: ast::Fields<FieldOpts>,

    /// Wire value of a string enum member
    #[darling(default)]
    value: Option<String>,

    /// Wire value of an int enum member
    #[darling(default)]
    int: Option<i32>,

    /// Catch-all variant holding values the schema does not know
    unknown: Flag,
}

impl VariantOpts {
    fn is_unit(&self) -> bool {
        self.fields.is_unit()
    }

    fn is_newtype(&self) -> bool {
        self.fields.is_tuple() && self.fields.len() == 1
    }
}

/// Derive shape serde impls bound to a static schema
///
/// # Example
///
/// ```ignore
/// use shapewire::prelude::*;
///
/// #[derive(Shape, Clone, PartialEq)]
/// #[shape(schema = "WIDGET")]
/// struct Widget {
///     name: String,
///     tags: Option<Vec<String>>,
/// }
///
/// #[derive(Shape, Debug, Clone, PartialEq)]
/// #[shape(schema = "CHOICE")]
/// enum Choice {
///     Text(String),
///     Number(i32),
///     #[shape(unknown)]
///     Unknown(String),
/// }
///
/// #[derive(Shape, Debug, Clone, PartialEq)]
/// #[shape(schema = "COLOR")]
/// enum Color {
///     #[shape(value = "red")]
///     Red,
///     #[shape(unknown)]
///     Unknown(String),
/// }
/// ```
///
/// `Option<T>` fields are skipped when `None` and left `None` when absent.
/// Other fields are always written; when absent on read they take the
/// member's `default` trait or fail with `MissingRequiredMember`.
/// Structures also get a `Debug` impl that redacts sensitive members, so
/// they must not derive `Debug` themselves.
#[proc_macro_derive(Shape, attributes(shape))]
pub fn derive_shape(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand(&input) {
        Ok(expanded) => TokenStream::from(expanded),
        Err(e) => TokenStream::from(e.write_errors()),
    }
}

fn expand(input: &DeriveInput) -> darling::Result<TokenStream2> {
    let opts = ShapeOpts::from_derive_input(input)?;

    let body = match &opts.data {
        ast::Data::Struct(fields) => expand_structure(&opts, &fields.fields),
        ast::Data::Enum(variants) => expand_enum(&opts, variants)?,
    };

    let name = &opts.ident;
    let schema_path = &opts.schema;
    let (impl_generics, ty_generics, where_clause) = opts.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::shapewire_core::ShapeSchema for #name #ty_generics #where_clause {
            fn schema() -> &'static ::shapewire_core::Schema {
                let schema: &'static ::shapewire_core::Schema = &#schema_path;
                schema
            }
        }

        #body
    })
}

fn expand_structure(opts: &ShapeOpts, fields: &[FieldOpts]) -> TokenStream2 {
    let name = &opts.ident;
    let name_str = name.unraw().to_string();
    let (impl_generics, ty_generics, where_clause) = opts.generics.split_for_impl();

    let mut writes = Vec::with_capacity(fields.len());
    let mut slots = Vec::with_capacity(fields.len());
    let mut reads = Vec::with_capacity(fields.len());
    let mut builds = Vec::with_capacity(fields.len());
    let mut debug_fields = Vec::with_capacity(fields.len());

    for (index, field) in fields.iter().enumerate() {
        let ident = &field.ident;
        let slot = format_ident!("__member_{}", index);
        let field_str = ident.as_ref().map(|i| i.unraw().to_string()).unwrap_or_default();

        match option_inner(&field.ty) {
            Some(inner) => {
                writes.push(quote! {
                    ::shapewire_core::members::write_optional(self.#ident.as_ref(), schema.member_at(#index)?, serializer)?;
                });
                slots.push(quote! { let mut #slot: ::std::option::Option<#inner> = ::std::option::Option::None; });
                reads.push(quote! {
                    #index => #slot = ::std::option::Option::Some(
                        <#inner as ::shapewire_core::DeserializeShape>::deserialize_shape(__member, __de)?,
                    ),
                });
                builds.push(quote! {
                    #ident: ::shapewire_core::members::optional(#slot, schema.member_at(#index)?, schema)?,
                });
            }
            None => {
                let ty = &field.ty;
                writes.push(quote! {
                    ::shapewire_core::SerializeShape::serialize_shape(&self.#ident, schema.member_at(#index)?, serializer)?;
                });
                slots.push(quote! { let mut #slot: ::std::option::Option<#ty> = ::std::option::Option::None; });
                reads.push(quote! {
                    #index => #slot = ::std::option::Option::Some(
                        <#ty as ::shapewire_core::DeserializeShape>::deserialize_shape(__member, __de)?,
                    ),
                });
                builds.push(quote! {
                    #ident: ::shapewire_core::members::required_or_default(#slot, schema.member_at(#index)?, schema)?,
                });
            }
        }

        debug_fields.push(quote! {
            .field(#field_str, &::shapewire_core::members::redacted_at(schema, #index, &self.#ident))
        });
    }

    quote! {
        impl #impl_generics ::shapewire_core::SerializeShape for #name #ty_generics #where_clause {
            fn serialize_shape(
                &self,
                schema: &'static ::shapewire_core::Schema,
                serializer: &mut dyn ::shapewire_core::ShapeSerializer,
            ) -> ::shapewire_core::ShapeResult<()> {
                serializer.write_struct(schema, self)
            }
        }

        impl #impl_generics ::shapewire_core::SerializeStructure for #name #ty_generics #where_clause {
            #[allow(unused_variables)]
            fn serialize_members(
                &self,
                serializer: &mut dyn ::shapewire_core::ShapeSerializer,
            ) -> ::shapewire_core::ShapeResult<()> {
                let schema = <Self as ::shapewire_core::ShapeSchema>::schema();
                #(#writes)*
                ::std::result::Result::Ok(())
            }
        }

        impl #impl_generics ::shapewire_core::DeserializeShape for #name #ty_generics #where_clause {
            fn deserialize_shape(
                schema: &'static ::shapewire_core::Schema,
                deserializer: &mut dyn ::shapewire_core::ShapeDeserializer,
            ) -> ::shapewire_core::ShapeResult<Self> {
                #(#slots)*
                deserializer.read_struct(schema, &mut |__member, __de| {
                    match __member.expect_member_index()? {
                        #(#reads)*
                        _ => {}
                    }
                    ::std::result::Result::Ok(())
                })?;
                ::std::result::Result::Ok(Self {
                    #(#builds)*
                })
            }
        }

        impl #impl_generics ::std::fmt::Debug for #name #ty_generics #where_clause {
            #[allow(unused_variables)]
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                let schema = <Self as ::shapewire_core::ShapeSchema>::schema();
                f.debug_struct(#name_str)
                    #(#debug_fields)*
                    .finish()
            }
        }
    }
}

fn expand_enum(opts: &ShapeOpts, variants: &[VariantOpts]) -> darling::Result<TokenStream2> {
    let mut errors = darling::Error::accumulator();

    let unknowns: Vec<&VariantOpts> = variants.iter().filter(|v| v.unknown.is_present()).collect();
    let known: Vec<&VariantOpts> = variants.iter().filter(|v| !v.unknown.is_present()).collect();

    if unknowns.len() > 1 {
        for extra in &unknowns[1..] {
            errors.push(darling::Error::custom("only one variant may be `#[shape(unknown)]`").with_span(&extra.ident));
        }
    }
    let unknown = unknowns.first().copied();
    if let Some(unknown) = unknown {
        if !unknown.is_newtype() {
            errors.push(
                darling::Error::custom("the `#[shape(unknown)]` variant must hold exactly one value")
                    .with_span(&unknown.ident),
            );
        }
    }
    if known.is_empty() {
        errors.push(darling::Error::custom("a shape enum needs at least one known variant").with_span(&opts.ident));
    }

    let kind = if known.iter().all(|v| v.is_unit()) {
        if known.iter().any(|v| v.int.is_some()) {
            EnumKind::Int
        } else {
            EnumKind::String
        }
    } else if known.iter().all(|v| v.is_newtype()) {
        EnumKind::Union
    } else {
        errors.push(
            darling::Error::custom("shape enum variants must be all unit variants or all single-value variants")
                .with_span(&opts.ident),
        );
        EnumKind::Union
    };

    for variant in &known {
        match kind {
            EnumKind::Union if variant.value.is_some() || variant.int.is_some() => {
                errors.push(darling::Error::custom("union variants take no wire value").with_span(&variant.ident));
            }
            EnumKind::Int if variant.int.is_none() => {
                errors.push(darling::Error::custom("int enum variants need `#[shape(int = N)]`").with_span(&variant.ident));
            }
            EnumKind::Int if variant.value.is_some() => {
                errors.push(
                    darling::Error::custom("int enum variants cannot also carry a string value").with_span(&variant.ident),
                );
            }
            _ => {}
        }
    }

    match kind {
        EnumKind::String => {
            let values: Vec<String> = known.iter().map(|v| string_value(v)).collect();
            if let Some(dup) = first_duplicate(&values) {
                errors.push(darling::Error::custom(format!("duplicate enum value `{dup}`")).with_span(&opts.ident));
            }
        }
        EnumKind::Int => {
            let values: Vec<i32> = known.iter().filter_map(|v| v.int).collect();
            if let Some(dup) = first_duplicate(&values) {
                errors.push(darling::Error::custom(format!("duplicate int enum value `{dup}`")).with_span(&opts.ident));
            }
        }
        EnumKind::Union => {}
    }

    errors.finish()?;

    Ok(match kind {
        EnumKind::Union => expand_union(opts, &known, unknown),
        EnumKind::String => expand_string_enum(opts, &known, unknown),
        EnumKind::Int => expand_int_enum(opts, &known, unknown),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EnumKind {
    Union,
    String,
    Int,
}

fn expand_union(opts: &ShapeOpts, known: &[&VariantOpts], unknown: Option<&VariantOpts>) -> TokenStream2 {
    let name = &opts.ident;
    let (impl_generics, ty_generics, where_clause) = opts.generics.split_for_impl();

    let mut writes = Vec::with_capacity(known.len() + 1);
    let mut reads = Vec::with_capacity(known.len());

    for (index, variant) in known.iter().enumerate() {
        let ident = &variant.ident;
        let ty = variant.fields.fields.first().map(|f| &f.ty);
        writes.push(quote! {
            Self::#ident(value) => ::shapewire_core::SerializeShape::serialize_shape(value, schema.member_at(#index)?, serializer),
        });
        reads.push(quote! {
            #index => Self::#ident(<#ty as ::shapewire_core::DeserializeShape>::deserialize_shape(__member, __de)?),
        });
    }

    let on_unknown = match unknown {
        Some(variant) => {
            let ident = &variant.ident;
            writes.push(quote! {
                Self::#ident(tag) => ::std::result::Result::Err(::shapewire_core::members::unknown_variant(schema, tag)),
            });
            quote! { ::std::result::Result::Ok(Self::#ident(__tag)) }
        }
        None => quote! {
            ::std::result::Result::Err(::shapewire_core::members::unknown_variant(schema, &__tag))
        },
    };

    quote! {
        impl #impl_generics ::shapewire_core::SerializeShape for #name #ty_generics #where_clause {
            fn serialize_shape(
                &self,
                schema: &'static ::shapewire_core::Schema,
                serializer: &mut dyn ::shapewire_core::ShapeSerializer,
            ) -> ::shapewire_core::ShapeResult<()> {
                serializer.write_struct(schema, self)
            }
        }

        impl #impl_generics ::shapewire_core::SerializeStructure for #name #ty_generics #where_clause {
            fn serialize_members(
                &self,
                serializer: &mut dyn ::shapewire_core::ShapeSerializer,
            ) -> ::shapewire_core::ShapeResult<()> {
                let schema = <Self as ::shapewire_core::ShapeSchema>::schema();
                match self {
                    #(#writes)*
                }
            }
        }

        impl #impl_generics ::shapewire_core::DeserializeShape for #name #ty_generics #where_clause {
            fn deserialize_shape(
                schema: &'static ::shapewire_core::Schema,
                deserializer: &mut dyn ::shapewire_core::ShapeDeserializer,
            ) -> ::shapewire_core::ShapeResult<Self> {
                let mut __value = ::std::option::Option::None;
                let __outcome = deserializer.read_union(schema, &mut |__member, __de| {
                    __value = ::std::option::Option::Some(match __member.expect_member_index()? {
                        #(#reads)*
                        __index => {
                            return ::std::result::Result::Err(::shapewire_core::ShapeError::InvalidSchema(
                                ::std::format!("{} has no union member at {}", schema.id(), __index),
                            ));
                        }
                    });
                    ::std::result::Result::Ok(())
                })?;
                match __outcome {
                    ::shapewire_core::UnionMember::Unknown(__tag) => #on_unknown,
                    ::shapewire_core::UnionMember::Known(_) => __value.ok_or_else(|| {
                        ::shapewire_core::ShapeError::Deserialization("union member was not read".to_string())
                    }),
                }
            }
        }
    }
}

fn expand_string_enum(opts: &ShapeOpts, known: &[&VariantOpts], unknown: Option<&VariantOpts>) -> TokenStream2 {
    let name = &opts.ident;
    let (impl_generics, ty_generics, where_clause) = opts.generics.split_for_impl();

    let idents: Vec<&syn::Ident> = known.iter().map(|v| &v.ident).collect();
    let values: Vec<String> = known.iter().map(|v| string_value(v)).collect();

    let (unknown_str, on_unknown) = match unknown {
        Some(variant) => {
            let ident = &variant.ident;
            (
                quote! { Self::#ident(value) => value.as_str(), },
                quote! { ::std::result::Result::Ok(Self::#ident(__other.to_string())) },
            )
        }
        None => (
            quote! {},
            quote! { ::std::result::Result::Err(::shapewire_core::members::unknown_variant(schema, __other)) },
        ),
    };

    quote! {
        impl #impl_generics #name #ty_generics #where_clause {
            /// Wire value of this enum member
            pub fn as_str(&self) -> &str {
                match self {
                    #(Self::#idents => #values,)*
                    #unknown_str
                }
            }

            /// Wire values of the known enum members, in declaration order
            pub fn values() -> &'static [&'static str] {
                &[#(#values),*]
            }
        }

        impl #impl_generics ::std::fmt::Display for #name #ty_generics #where_clause {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl #impl_generics ::shapewire_core::SerializeShape for #name #ty_generics #where_clause {
            fn serialize_shape(
                &self,
                schema: &'static ::shapewire_core::Schema,
                serializer: &mut dyn ::shapewire_core::ShapeSerializer,
            ) -> ::shapewire_core::ShapeResult<()> {
                serializer.write_string(schema, self.as_str())
            }
        }

        impl #impl_generics ::shapewire_core::DeserializeShape for #name #ty_generics #where_clause {
            fn deserialize_shape(
                schema: &'static ::shapewire_core::Schema,
                deserializer: &mut dyn ::shapewire_core::ShapeDeserializer,
            ) -> ::shapewire_core::ShapeResult<Self> {
                let __value = deserializer.read_string(schema)?;
                match __value.as_str() {
                    #(#values => ::std::result::Result::Ok(Self::#idents),)*
                    __other => #on_unknown,
                }
            }
        }
    }
}

fn expand_int_enum(opts: &ShapeOpts, known: &[&VariantOpts], unknown: Option<&VariantOpts>) -> TokenStream2 {
    let name = &opts.ident;
    let (impl_generics, ty_generics, where_clause) = opts.generics.split_for_impl();

    let idents: Vec<&syn::Ident> = known.iter().map(|v| &v.ident).collect();
    let values: Vec<i32> = known.iter().filter_map(|v| v.int).collect();

    let (unknown_value, on_unknown) = match unknown {
        Some(variant) => {
            let ident = &variant.ident;
            (
                quote! { Self::#ident(value) => *value, },
                quote! { ::std::result::Result::Ok(Self::#ident(__other)) },
            )
        }
        None => (
            quote! {},
            quote! {
                ::std::result::Result::Err(::shapewire_core::members::unknown_variant(schema, &__other.to_string()))
            },
        ),
    };

    quote! {
        impl #impl_generics #name #ty_generics #where_clause {
            /// Wire value of this int enum member
            pub fn value(&self) -> i32 {
                match self {
                    #(Self::#idents => #values,)*
                    #unknown_value
                }
            }

            /// Wire values of the known int enum members, in declaration order
            pub fn values() -> &'static [i32] {
                &[#(#values),*]
            }
        }

        impl #impl_generics ::shapewire_core::SerializeShape for #name #ty_generics #where_clause {
            fn serialize_shape(
                &self,
                schema: &'static ::shapewire_core::Schema,
                serializer: &mut dyn ::shapewire_core::ShapeSerializer,
            ) -> ::shapewire_core::ShapeResult<()> {
                serializer.write_integer(schema, self.value())
            }
        }

        impl #impl_generics ::shapewire_core::DeserializeShape for #name #ty_generics #where_clause {
            fn deserialize_shape(
                schema: &'static ::shapewire_core::Schema,
                deserializer: &mut dyn ::shapewire_core::ShapeDeserializer,
            ) -> ::shapewire_core::ShapeResult<Self> {
                match deserializer.read_integer(schema)? {
                    #(#values => ::std::result::Result::Ok(Self::#idents),)*
                    __other => #on_unknown,
                }
            }
        }
    }
}

/// Wire value of a string enum variant, defaulting to the variant name
fn string_value(variant: &VariantOpts) -> String {
    variant
        .value
        .clone()
        .unwrap_or_else(|| variant.ident.unraw().to_string())
}

/// Inner type of an `Option<T>` field
fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    if path.qself.is_some() {
        return None;
    }
    let segment = path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(inner) if args.args.len() == 1 => Some(inner),
        _ => None,
    }
}

fn first_duplicate<T: PartialEq + Clone>(values: &[T]) -> Option<T> {
    values
        .iter()
        .enumerate()
        .find(|(i, value)| values[..*i].contains(value))
        .map(|(_, value)| value.clone())
}
