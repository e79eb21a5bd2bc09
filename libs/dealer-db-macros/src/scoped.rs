use heck::ToUpperCamelCase;
use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::{Data, DeriveInput, Fields, spanned::Spanned};

/// Configuration parsed from `#[scoped(...)]` attributes
#[derive(Default)]
struct ScopedConfig {
    tenant_col: Option<(String, Span)>,
    key_col: Option<(String, Span)>,
    singleton: Option<Span>,
}

pub fn expand_derive_tenant_scoped(input: &DeriveInput) -> syn::Result<TokenStream> {
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new(
            input.span(),
            "#[derive(TenantScoped)] can only be applied to structs",
        ));
    };

    let config = parse_scoped_attrs(input)?;

    let (tenant_col, tenant_span) = config.tenant_col.ok_or_else(|| {
        syn::Error::new(
            input.span(),
            "scoped: missing `tenant_col = \"column_name\"`",
        )
    })?;
    let (key_col, key_span) = config.key_col.ok_or_else(|| {
        syn::Error::new(input.span(), "scoped: missing `key_col = \"column_name\"`")
    })?;

    if tenant_col == key_col {
        return Err(syn::Error::new(
            key_span,
            "scoped: `key_col` must differ from `tenant_col`",
        ));
    }

    ensure_field(&data.fields, &tenant_col, tenant_span)?;
    ensure_field(&data.fields, &key_col, key_span)?;

    let span = input.ident.span();
    let entity_ident = syn::Ident::new("Entity", span);
    let tenant_variant = syn::Ident::new(&snake_to_upper_camel(&tenant_col), span);
    let key_variant = syn::Ident::new(&snake_to_upper_camel(&key_col), span);
    let tenant_field = syn::Ident::new(&tenant_col, span);

    let singleton_impl = config.singleton.map(|_| {
        quote! {
            impl ::dealer_db::secure::TenantSingleton for #entity_ident {}
        }
    });

    Ok(quote! {
        impl ::dealer_db::secure::TenantScopedEntity for #entity_ident {
            fn tenant_col() -> Self::Column {
                Self::Column::#tenant_variant
            }

            fn key_col() -> Self::Column {
                Self::Column::#key_variant
            }

            fn tenant_of(model: &Self::Model) -> ::dealer_db::uuid::Uuid {
                model.#tenant_field
            }
        }

        #singleton_impl
    })
}

fn ensure_field(fields: &Fields, name: &str, span: Span) -> syn::Result<()> {
    let found = fields
        .iter()
        .filter_map(|f| f.ident.as_ref())
        .any(|ident| ident == name);
    if found {
        Ok(())
    } else {
        Err(syn::Error::new(
            span,
            format!("scoped: struct has no field named `{name}`"),
        ))
    }
}

/// Parse all `#[scoped(...)]` attributes with duplicate detection
fn parse_scoped_attrs(input: &DeriveInput) -> syn::Result<ScopedConfig> {
    let mut config = ScopedConfig::default();

    for attr in &input.attrs {
        if !attr.path().is_ident("scoped") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            let span = meta.path.span();

            if meta.path.is_ident("singleton") {
                if config.singleton.is_some() {
                    return Err(meta.error("duplicate attribute 'singleton'"));
                }
                config.singleton = Some(span);
                return Ok(());
            }

            let key = meta
                .path
                .get_ident()
                .map(ToString::to_string)
                .unwrap_or_default();

            let slot = match key.as_str() {
                "tenant_col" => &mut config.tenant_col,
                "key_col" => &mut config.key_col,
                _ => {
                    return Err(meta.error(format!(
                        "Unknown attribute '{key}'. Valid attributes: tenant_col, key_col, singleton"
                    )));
                }
            };

            if slot.is_some() {
                return Err(meta.error(format!("duplicate attribute '{key}'")));
            }

            let value: syn::LitStr = meta.value()?.parse()?;
            if value.value().is_empty() {
                return Err(syn::Error::new(value.span(), "column name must not be empty"));
            }
            *slot = Some((value.value(), span));
            Ok(())
        })?;
    }

    Ok(config)
}

/// Convert `snake_case` to `UpperCamelCase` for enum variant names
fn snake_to_upper_camel(s: &str) -> String {
    s.to_upper_camel_case()
}
