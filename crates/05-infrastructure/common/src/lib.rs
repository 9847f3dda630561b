//! # Infrastructure Common
//!
//! 这个 crate 提供了组件容器的公共数据模型和错误类型。
//!
//! ## 核心组件
//!
//! - [`ComponentDefinition`] - 组件定义：构造函数、标记和能力
//! - [`ParameterDescriptor`] - 构造参数描述
//! - [`Marker`] - 声明式标记
//! - [`DependencyError`] - 容器核心错误
//!
//! ## 设计原则
//!
//! - 显式元数据，不依赖运行时反射
//! - 以 [`TypeInfo`] 作为组件身份
//! - 通过能力转换代替运行时类型判断

pub mod component;
pub mod errors;
pub mod injection;
pub mod markers;
pub mod metadata;

pub use component::*;
pub use errors::*;
pub use injection::*;
pub use markers::*;
pub use metadata::*;
