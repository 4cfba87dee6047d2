use darling::util::PathList;
use darling::{FromDeriveInput, FromField, ast};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{DeriveInput, Type, parse_macro_input};

#[derive(FromDeriveInput)]
#[darling(attributes(injectable), supports(struct_any))]
struct InjectableInput {
    ident: syn::Ident,
    generics: syn::Generics,
    data: ast::Data<(), InjectableField>,
    #[darling(default)]
    implements: PathList,
}

#[derive(FromField)]
struct InjectableField {
    ident: Option<syn::Ident>,
    ty: Type,
}

pub fn derive_injectable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let expanded = match InjectableInput::from_derive_input(&input) {
        Ok(parsed) => {
            generate_injectable_impl(&parsed).unwrap_or_else(syn::Error::into_compile_error)
        }
        Err(err) => err.write_errors(),
    };
    TokenStream::from(expanded)
}

fn generate_injectable_impl(input: &InjectableInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let Some(fields) = input.data.as_ref().take_struct() else {
        return Err(syn::Error::new_spanned(
            struct_name,
            "#[derive(Injectable)] can only be applied to structs",
        ));
    };

    // One constructor parameter per field, in declaration order
    let mut params = Vec::new();
    let mut bindings = Vec::new();
    for (index, field) in fields.iter().enumerate() {
        let inner = extract_arc_inner(&field.ty).ok_or_else(|| {
            syn::Error::new_spanned(
                &field.ty,
                "#[derive(Injectable)] only supports fields of type `Arc<T>`",
            )
        })?;
        let binding = format_ident!("__inject_arg{}", index);
        params.push(quote!(#binding: ::std::sync::Arc<#inner>));
        bindings.push(binding);
    }

    let construct = if fields.is_struct() {
        let names = fields.iter().map(|field| &field.ident);
        quote!(Self { #(#names: #bindings),* })
    } else if fields.is_tuple() {
        quote!(Self(#(#bindings),*))
    } else {
        quote!(Self)
    };

    let conversions = input.implements.iter().map(|path| {
        quote! {
            .implements::<dyn #path>(|this: ::std::sync::Arc<Self>| {
                this as ::std::sync::Arc<dyn #path>
            })
        }
    });

    Ok(quote! {
        impl #impl_generics ::inject::Injectable for #struct_name #ty_generics #where_clause {
            fn type_info() -> ::inject::TypeInfo {
                ::inject::TypeInfo::concrete::<Self>()
                    #(#conversions)*
                    .constructor(|#(#params),*| #construct)
                    .build()
            }
        }
    })
}

/// Extract the inner type from `Arc<T>` or `Arc<dyn Trait>`
fn extract_arc_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != "Arc" {
        return None;
    }
    let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        syn::GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}
