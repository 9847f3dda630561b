//! # Dependency Injection Abstractions
//!
//! 依赖注入抽象层，定义组件注册、依赖树解析和构造期扩展点的核心接口。
//!
//! ## 核心接口
//!
//! - [`ComponentRegistry`] - 组件注册表接口
//! - [`DependencyTreeResolver`] - 依赖树解析器接口
//! - [`AutowiringHandler`] / [`PostConstructHandler`] - 按标记分派的处理器
//! - [`InstanceEnhancer`] - 实例增强接口
//! - [`ComponentDiscovery`] - 组件发现接口
//! - [`DiContainer`] - 容器接口

pub mod container;
pub mod discovery;
pub mod enhancer;
pub mod handlers;
pub mod registry;
pub mod resolver;

pub use container::*;
pub use discovery::*;
pub use enhancer::*;
pub use handlers::*;
pub use registry::*;
pub use resolver::*;
