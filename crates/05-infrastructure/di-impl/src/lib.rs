//! # 依赖注入具体实现
//!
//! 提供组件注册表、依赖树解析器、处理器分派、构造引擎以及负责启动流程的容器实现。

pub mod container;
pub mod definitions;
pub mod discovery;
pub mod dispatch;
pub mod engine;
pub mod registry;
pub mod resolver;

pub use container::{DiContainerBuilder, DiContainerImpl};
pub use definitions::DefinitionRegistry;
pub use discovery::StaticDiscovery;
pub use dispatch::{AutowiringDispatch, HandlerEntry, PostConstructDispatch};
pub use engine::ConstructionEngine;
pub use registry::DefaultComponentRegistry;
pub use resolver::DelegatingDependencyTreeResolver;
