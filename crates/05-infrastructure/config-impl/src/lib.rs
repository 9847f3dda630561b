//! # Configuration Implementation
//!
//! 配置的具体实现，提供各种配置源、按优先级叠加的配置环境以及配置属性注入。
//!
//! ## 主要组件
//!
//! - [`FileConfigProvider`] - TOML / JSON / YAML 文件配置提供者
//! - [`EnvironmentConfigProvider`] - 环境变量配置提供者
//! - [`InMemoryConfigProvider`] - 内存配置提供者
//! - [`ConfigurationEnvironment`] - 配置环境
//! - [`PropertyAutowiringHandler`] - `Property` 标记的注入值处理器

pub mod environment;
pub mod property;
pub mod providers;

pub use environment::*;
pub use property::*;
pub use providers::*;
