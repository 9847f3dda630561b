//! # Component Macros
//!
//! 这个 crate 提供从结构体字段生成组件定义的派生宏。
//!
//! ## 字段规则
//!
//! - `Arc<T>` 字段 - 依赖组件 `T`，从注册表取得
//! - `#[component(property = "key")]` - 配置属性，可加 `default` 在缺失时使用 `Default`
//! - `#[component(marker = expr)]` - 带外部标记的参数，可加 `default`
//! - `#[component(optional)]` - 可选参数，缺省时使用 `Default`
//! - `#[component(context)]` - 只能由调用方提供的参数
//! - `#[component(default)]` - 不参与注入，直接使用 `Default`
//!
//! ## 结构体参数
//!
//! - `name = "..."` - 自定义组件名称
//! - `marker = expr` - 类型级标记，可重复
//! - `capability = dyn Trait` - 组件可以视作的 trait 对象，可重复
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use component_macros::Component;
//! use std::sync::Arc;
//!
//! #[derive(Component)]
//! struct Repository;
//!
//! #[derive(Component)]
//! #[component(name = "user_service")]
//! struct UserService {
//!     repository: Arc<Repository>,
//!     #[component(property = "users.page_size", default)]
//!     page_size: usize,
//! }
//! ```
//!
//! 生成的代码引用 `infrastructure_common`，使用方需要依赖该 crate。

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod component;
mod utils;

/// 组件派生宏
///
/// 为结构体实现 `Injectable`，生成唯一的构造函数。
///
/// # 示例
///
/// ```rust,ignore
/// #[derive(Component)]
/// #[component(marker = CommandManager, capability = dyn PostConstructHandler)]
/// pub struct CommandManagerHook {
///     registry: Arc<RegistryHandle>,
/// }
/// ```
#[proc_macro_derive(Component, attributes(component))]
pub fn derive_component(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    component::derive_component_impl(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
