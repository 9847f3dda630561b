//! 组件派生宏实现

use crate::utils::{arc_inner, field_member, is_attribute};
use proc_macro2::TokenStream;
use quote::quote;
use syn::spanned::Spanned;
use syn::{
    Attribute, Data, DeriveInput, Error, Expr, Field, Fields, LitStr, Member, Result, Type,
};

/// 结构体级参数
#[derive(Default)]
pub struct ComponentArgs {
    /// 自定义组件名称
    pub name: Option<String>,
    /// 类型级标记表达式
    pub markers: Vec<Expr>,
    /// 组件可以视作的 trait 对象类型
    pub capabilities: Vec<Type>,
}

impl ComponentArgs {
    fn from_attributes(attrs: &[Attribute]) -> Result<Self> {
        let mut args = Self::default();
        for attr in attrs.iter().filter(|attr| is_attribute(attr, "component")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let name: LitStr = meta.value()?.parse()?;
                    args.name = Some(name.value());
                } else if meta.path.is_ident("marker") {
                    args.markers.push(meta.value()?.parse()?);
                } else if meta.path.is_ident("capability") {
                    args.capabilities.push(meta.value()?.parse()?);
                } else {
                    return Err(meta.error("未知的组件参数，支持 name / marker / capability"));
                }
                Ok(())
            })?;
        }
        Ok(args)
    }
}

/// 字段的注入方式
pub enum FieldInjection {
    /// 从注册表取得的依赖
    Component,
    /// 配置属性
    Property { key: String, default: bool },
    /// 外部标记
    Marked { marker: Expr, default: bool },
    /// 可选参数，缺省时使用 `Default`
    Optional,
    /// 只能由调用方提供
    Context,
    /// 不参与注入，使用 `Default`
    Skipped,
}

impl FieldInjection {
    fn from_field(field: &Field) -> Result<Self> {
        let mut property = None;
        let mut marker = None;
        let mut optional = false;
        let mut context = false;
        let mut default = false;

        for attr in field.attrs.iter().filter(|attr| is_attribute(attr, "component")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("property") {
                    let key: LitStr = meta.value()?.parse()?;
                    property = Some(key.value());
                } else if meta.path.is_ident("marker") {
                    marker = Some(meta.value()?.parse::<Expr>()?);
                } else if meta.path.is_ident("optional") {
                    optional = true;
                } else if meta.path.is_ident("context") {
                    context = true;
                } else if meta.path.is_ident("default") {
                    default = true;
                } else {
                    return Err(meta.error(
                        "未知的字段参数，支持 property / marker / optional / context / default",
                    ));
                }
                Ok(())
            })?;
        }

        let kinds = usize::from(property.is_some())
            + usize::from(marker.is_some())
            + usize::from(optional)
            + usize::from(context);
        if kinds > 1 {
            return Err(Error::new(
                field.span(),
                "property / marker / optional / context 只能选择一个",
            ));
        }
        if default && (optional || context) {
            return Err(Error::new(field.span(), "default 不能与 optional 或 context 同时使用"));
        }

        Ok(match (property, marker) {
            (Some(key), _) => Self::Property { key, default },
            (_, Some(marker)) => Self::Marked { marker, default },
            _ if optional => Self::Optional,
            _ if context => Self::Context,
            _ if default => Self::Skipped,
            _ => Self::Component,
        })
    }
}

/// 单个字段生成的参数描述和初始化表达式
struct FieldPlan {
    member: Member,
    descriptor: Option<TokenStream>,
    init: TokenStream,
}

fn plan_field(field: &Field, member: Member, index: usize) -> Result<FieldPlan> {
    let ty = &field.ty;
    // `Arc<T>` 以 T 为参数类型，取出共享实例；其他类型按值克隆
    let (param_ty, init) = match arc_inner(ty) {
        Some(inner) => (inner, quote! { args.component::<#inner>(#index)? }),
        None => (ty, quote! { args.value::<#ty>(#index)? }),
    };

    let descriptor = match FieldInjection::from_field(field)? {
        FieldInjection::Skipped => {
            return Ok(FieldPlan {
                member,
                descriptor: None,
                init: quote! { ::std::default::Default::default() },
            });
        }
        FieldInjection::Component => {
            if arc_inner(ty).is_none() {
                return Err(Error::new(
                    ty.span(),
                    "依赖字段必须是 Arc<T>，配置值请使用 #[component(property = \"...\")]",
                ));
            }
            quote! { ::infrastructure_common::ParameterDescriptor::component::<#param_ty>() }
        }
        FieldInjection::Property { key, default } => {
            let descriptor =
                quote! { ::infrastructure_common::ParameterDescriptor::property::<#param_ty>(#key) };
            with_default(descriptor, param_ty, default)
        }
        FieldInjection::Marked { marker, default } => {
            let descriptor = quote! {
                ::infrastructure_common::ParameterDescriptor::marked::<#param_ty>(
                    ::infrastructure_common::Marker::new(#marker)
                )
            };
            with_default(descriptor, param_ty, default)
        }
        FieldInjection::Optional => {
            quote! { ::infrastructure_common::ParameterDescriptor::optional::<#param_ty>() }
        }
        FieldInjection::Context => {
            quote! { ::infrastructure_common::ParameterDescriptor::context::<#param_ty>() }
        }
    };

    Ok(FieldPlan {
        member,
        descriptor: Some(descriptor),
        init,
    })
}

fn with_default(descriptor: TokenStream, ty: &Type, default: bool) -> TokenStream {
    if default {
        quote! { #descriptor.with_default::<#ty>() }
    } else {
        descriptor
    }
}

/// 实现 #[derive(Component)] 宏
pub fn derive_component_impl(input: DeriveInput) -> Result<TokenStream> {
    let struct_name = &input.ident;
    if !input.generics.params.is_empty() {
        return Err(Error::new(
            input.generics.span(),
            "#[derive(Component)] 不支持泛型结构体",
        ));
    }
    let Data::Struct(data) = &input.data else {
        return Err(Error::new(input.span(), "#[derive(Component)] 只能用于结构体"));
    };

    let args = ComponentArgs::from_attributes(&input.attrs)?;

    let mut plans = Vec::new();
    let mut parameter_index = 0;
    for (position, field) in data.fields.iter().enumerate() {
        let plan = plan_field(field, field_member(field, position), parameter_index)?;
        if plan.descriptor.is_some() {
            parameter_index += 1;
        }
        plans.push(plan);
    }

    let construct = match &data.fields {
        Fields::Unit => quote! { Self },
        Fields::Named(_) | Fields::Unnamed(_) => {
            let inits = plans.iter().map(|plan| {
                let member = &plan.member;
                let init = &plan.init;
                quote! { #member: #init }
            });
            quote! { Self { #(#inits),* } }
        }
    };

    let descriptors: Vec<_> = plans.iter().filter_map(|plan| plan.descriptor.as_ref()).collect();
    let constructor = if descriptors.is_empty() {
        quote! { .default_constructor(|| #construct) }
    } else {
        quote! {
            .constructor(
                ::std::vec![#(#descriptors),*],
                |args: ::infrastructure_common::Arguments| ::std::result::Result::Ok(#construct),
            )
        }
    };

    let name = args.name.map(|name| quote! { .name(#name) });
    let markers = args.markers.iter().map(|marker| quote! { .marker(#marker) });
    let capabilities = args.capabilities.iter().map(|capability| {
        quote! {
            .capability::<#capability, _>(|this| this as ::std::sync::Arc<#capability>)
        }
    });

    Ok(quote! {
        impl ::infrastructure_common::Injectable for #struct_name {
            fn definition() -> ::infrastructure_common::ComponentDefinition {
                ::infrastructure_common::ComponentDefinition::builder::<Self>()
                    #name
                    #constructor
                    #(#markers)*
                    #(#capabilities)*
                    .build()
            }
        }
    })
}
