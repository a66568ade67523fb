use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Field, Fields, Type, parse_macro_input};

const MARKER_IDENTS: [&str; 5] = ["Ref", "Attr", "RefList", "RefMap", "ContextRef"];

pub fn expand(item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    match expand_input(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand_input(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input.ident,
                    "Referable can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "Referable can only be derived for structs",
            ));
        }
    };

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Referable cannot be derived for generic structs",
        ));
    }

    let base = parse_base(&input.attrs)?;

    let mut decls = Vec::new();
    for field in fields {
        if should_skip(field)? {
            continue;
        }
        let ident = field.ident.as_ref().expect("named fields checked above");
        let expr = field_expr(&field.ty);
        decls.push(quote! {
            ::graph_refs::FieldDecl::new(stringify!(#ident), #expr)
        });
    }

    let ident = &input.ident;
    let base_impl = base.map(|path| {
        quote! {
            fn base() -> ::core::option::Option<::graph_refs::TypeKey> {
                ::core::option::Option::Some(::graph_refs::TypeKey::of::<#path>())
            }
        }
    });

    Ok(quote! {
        impl ::graph_refs::Referable for #ident {
            fn own_fields() -> ::std::vec::Vec<::graph_refs::FieldDecl> {
                ::std::vec![
                    #(#decls),*
                ]
            }

            #base_impl
        }
    })
}

/// Maps a field's declared type to a runtime type-expression constructor.
///
/// Marker recognition here is purely syntactic (last path segment); the
/// generated call `<Ty as MarkerType>::type_expr()` fails to compile if the
/// ident does not actually name a graph-refs marker.
fn field_expr(ty: &Type) -> TokenStream2 {
    if let Some(segment) = last_path_segment(ty) {
        if MARKER_IDENTS.contains(&segment.ident.to_string().as_str()) {
            return quote! { <#ty as ::graph_refs::MarkerType>::type_expr() };
        }
        if segment.ident == "Option" {
            if let Some(inner) = single_type_argument(segment) {
                if let Some(inner_segment) = last_path_segment(inner) {
                    if MARKER_IDENTS.contains(&inner_segment.ident.to_string().as_str()) {
                        return quote! {
                            ::graph_refs::TypeExpr::optional(
                                <#inner as ::graph_refs::MarkerType>::type_expr(),
                            )
                        };
                    }
                }
            }
        }
    }
    quote! { ::graph_refs::TypeExpr::plain::<#ty>() }
}

fn last_path_segment(ty: &Type) -> Option<&syn::PathSegment> {
    match ty {
        Type::Path(type_path) => type_path.path.segments.last(),
        _ => None,
    }
}

fn single_type_argument(segment: &syn::PathSegment) -> Option<&Type> {
    match &segment.arguments {
        syn::PathArguments::AngleBracketed(args) if args.args.len() == 1 => {
            match args.args.first() {
                Some(syn::GenericArgument::Type(inner)) => Some(inner),
                _ => None,
            }
        }
        _ => None,
    }
}

fn parse_base(attrs: &[syn::Attribute]) -> syn::Result<Option<syn::Path>> {
    let mut base = None;
    for attr in attrs {
        if !attr.path().is_ident("referable") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("extends") {
                base = Some(meta.value()?.parse::<syn::Path>()?);
                Ok(())
            } else {
                Err(meta.error("unknown `referable` argument; expected `extends = Base`"))
            }
        })?;
    }
    Ok(base)
}

fn should_skip(field: &Field) -> syn::Result<bool> {
    let mut skip = false;
    for attr in &field.attrs {
        if !attr.path().is_ident("referable") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                skip = true;
                Ok(())
            } else {
                Err(meta.error("unknown `referable` argument; expected `skip`"))
            }
        })?;
    }
    Ok(skip)
}
