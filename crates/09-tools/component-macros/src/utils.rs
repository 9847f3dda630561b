//! 宏工具函数

use syn::{Field, GenericArgument, Index, Member, PathArguments, Type};

/// 若类型为 `Arc<T>`，返回 `T`
pub fn arc_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != "Arc" {
        return None;
    }
    match &segment.arguments {
        PathArguments::AngleBracketed(args) if args.args.len() == 1 => match args.args.first() {
            Some(GenericArgument::Type(inner)) => Some(inner),
            _ => None,
        },
        _ => None,
    }
}

/// 字段的成员访问名，具名字段用名称，元组字段用下标
pub fn field_member(field: &Field, index: usize) -> Member {
    match &field.ident {
        Some(ident) => Member::Named(ident.clone()),
        None => Member::Unnamed(Index::from(index)),
    }
}

/// 检查是否为指定名称的属性
pub fn is_attribute(attr: &syn::Attribute, name: &str) -> bool {
    attr.path().get_ident().is_some_and(|ident| ident == name)
}
