//! # C Layout Derive
//!
//! `#[derive(CLayout)]` records a type's C shape and proves at compile time
//! that rustc laid it out the way the C algorithm would.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    Attribute, Data, DataEnum, DeriveInput, Fields, Ident, Index, LitStr, parse_macro_input,
    spanned::Spanned,
};

/// Derive `fc_layout::CLayout` for a `#[repr(C)]` struct or a fieldless
/// `#[repr(C)]` / `#[repr(i32)]` enum.
///
/// For structs, every field offset plus the size and alignment are asserted
/// against `fc_layout::c_struct_layout` inside a `const` block. For enums, the
/// size is asserted to be 4 bytes and variant *k* to have value *k*; the
/// derive also adds `VARIANT_COUNT`, `discriminant()` and `from_discriminant()`.
///
/// - Overriding the C name: `#[clayout(c_name = "fc_point")]`
///
/// # Example
///
/// ```
/// use fc_layout::CLayout;
///
/// #[derive(CLayout, Clone, Copy, PartialEq, Debug)]
/// #[repr(C)]
/// enum Color {
///     Red,
///     Green,
///     Blue,
/// }
///
/// assert_eq!(Color::Green.discriminant(), 1);
/// assert_eq!(Color::from_discriminant(2), Some(Color::Blue));
/// assert_eq!(Color::from_discriminant(3), None);
/// ```
#[proc_macro_derive(CLayout, attributes(clayout))]
pub fn derive_c_layout(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new(
            input.generics.span(),
            "CLayout cannot be derived for generic types",
        ));
    }

    let c_name = c_name(&input.attrs)?.unwrap_or_else(|| input.ident.to_string());

    match &input.data {
        Data::Struct(s) => {
            require_repr(&input.attrs, &input.ident, &["C"])?;
            Ok(expand_struct(&input.ident, &c_name, &s.fields))
        }
        Data::Enum(e) => {
            require_repr(&input.attrs, &input.ident, &["C", "i32"])?;
            expand_enum(&input.ident, &c_name, e)
        }
        Data::Union(_) => Err(syn::Error::new(
            input.ident.span(),
            "CLayout can only be derived for structs and enums",
        )),
    }
}

fn expand_struct(ident: &Ident, c_name: &str, fields: &Fields) -> TokenStream2 {
    let count = fields.len();

    let mut names = Vec::with_capacity(count);
    let mut members = Vec::with_capacity(count);
    let mut types = Vec::with_capacity(count);
    for (i, field) in fields.iter().enumerate() {
        match &field.ident {
            Some(name) => {
                names.push(name.to_string());
                members.push(quote!(#name));
            }
            None => {
                let index = Index::from(i);
                names.push(i.to_string());
                members.push(quote!(#index));
            }
        }
        types.push(&field.ty);
    }

    let indices = 0..count;
    let type_name = ident.to_string();

    quote! {
        const _: () = {
            const FIELDS: [::fc_layout::FieldLayout; #count] = [
                #(::fc_layout::FieldLayout::of::<#types>()),*
            ];
            const SHAPE: ::fc_layout::StructShape<#count> =
                match ::fc_layout::c_struct_layout(&FIELDS) {
                    Ok(shape) => shape,
                    Err(_) => panic!(concat!("`", #type_name, "` has no valid C layout")),
                };
            #(
                assert!(
                    ::core::mem::offset_of!(#ident, #members) == SHAPE.offsets[#indices],
                    concat!("field `", #names, "` of `", #type_name, "` is not at its C offset")
                );
            )*
            assert!(
                ::core::mem::size_of::<#ident>() == SHAPE.size,
                concat!("size of `", #type_name, "` differs from its C layout")
            );
            assert!(
                ::core::mem::align_of::<#ident>() == SHAPE.align,
                concat!("alignment of `", #type_name, "` differs from its C layout")
            );
        };

        // SAFETY: the const block above proves the shape at compile time.
        unsafe impl ::fc_layout::CLayout for #ident {
            const C_NAME: &'static str = #c_name;
            const SHAPE: ::fc_layout::TypeShape = ::fc_layout::TypeShape::Struct {
                fields: &[
                    #(
                        ::fc_layout::FieldDesc {
                            name: #names,
                            offset: ::core::mem::offset_of!(#ident, #members),
                            layout: ::fc_layout::FieldLayout::of::<#types>(),
                        }
                    ),*
                ],
                size: ::core::mem::size_of::<#ident>(),
                align: ::core::mem::align_of::<#ident>(),
            };
        }
    }
}

fn expand_enum(ident: &Ident, c_name: &str, data: &DataEnum) -> syn::Result<TokenStream2> {
    let mut variants = Vec::with_capacity(data.variants.len());
    for v in &data.variants {
        if !matches!(v.fields, Fields::Unit) {
            return Err(syn::Error::new(v.span(), "CLayout enums cannot carry fields"));
        }
        if let Some((_, expr)) = &v.discriminant {
            return Err(syn::Error::new(
                expr.span(),
                "explicit discriminants are not part of the layout contract; variants are numbered 0, 1, 2, ...",
            ));
        }
        variants.push(&v.ident);
    }

    let count = variants.len();
    let names: Vec<_> = variants.iter().map(ToString::to_string).collect();
    let values: Vec<i32> = (0..count)
        .map(|k| {
            i32::try_from(k).map_err(|_| syn::Error::new(ident.span(), "too many variants"))
        })
        .collect::<syn::Result<_>>()?;
    let type_name = ident.to_string();

    Ok(quote! {
        const _: () = {
            assert!(
                ::core::mem::size_of::<#ident>() == ::fc_layout::ENUM_REPR_SIZE,
                concat!("`", #type_name, "` is not represented as a 4-byte C int")
            );
            #(
                assert!(
                    #ident::#variants as i32 == #values,
                    concat!("variant `", #names, "` of `", #type_name, "` has the wrong value")
                );
            )*
        };

        impl #ident {
            /// Number of variants.
            pub const VARIANT_COUNT: usize = #count;

            /// The C integer value of this variant.
            #[inline]
            #[must_use]
            pub const fn discriminant(self) -> i32 {
                self as i32
            }

            /// The variant a C integer value denotes, if any.
            #[inline]
            #[must_use]
            pub const fn from_discriminant(value: i32) -> ::core::option::Option<Self> {
                match value {
                    #( #values => ::core::option::Option::Some(Self::#variants), )*
                    _ => ::core::option::Option::None,
                }
            }
        }

        // SAFETY: the const block above proves size and discriminants at compile time.
        unsafe impl ::fc_layout::CLayout for #ident {
            const C_NAME: &'static str = #c_name;
            const SHAPE: ::fc_layout::TypeShape = ::fc_layout::TypeShape::Enum {
                variants: &[#(#names),*],
            };
        }
    })
}

/// Ensure the type carries one of the accepted `#[repr(..)]` hints.
fn require_repr(attrs: &[Attribute], ident: &Ident, accepted: &[&str]) -> syn::Result<()> {
    let mut found = false;
    for attr in attrs {
        if !attr.path().is_ident("repr") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("align") || meta.path.is_ident("packed") {
                return Err(meta.error(
                    "CLayout does not support #[repr(align)] or #[repr(packed)]; the C layout uses natural alignment",
                ));
            }
            if accepted.iter().any(|a| meta.path.is_ident(a)) {
                found = true;
            }
            // Skip the arguments of hints we don't interpret.
            if meta.input.peek(syn::token::Paren) {
                meta.input.parse::<proc_macro2::Group>()?;
            }
            Ok(())
        })?;
    }

    if found {
        Ok(())
    } else {
        Err(syn::Error::new(
            ident.span(),
            format!(
                "CLayout requires #[repr({})] on `{ident}`",
                accepted.join(")] or #[repr(")
            ),
        ))
    }
}

/// Read `#[clayout(c_name = "...")]`, if present.
fn c_name(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    let mut name = None;
    for attr in attrs {
        if !attr.path().is_ident("clayout") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("c_name") {
                let lit: LitStr = meta.value()?.parse()?;
                name = Some(lit.value());
                Ok(())
            } else {
                Err(meta.error("unsupported clayout attribute"))
            }
        })?;
    }
    Ok(name)
}
