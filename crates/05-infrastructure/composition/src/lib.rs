//! # 基础设施组合层
//!
//! 将配置环境、日志和组件容器组合成一个可运行的应用。
//!
//! ## 主要功能
//!
//! - **应用构建器**: 使用构建者模式收集配置源、候选组件和处理器
//! - **日志初始化**: `tracing-subscriber` 的开发 / 生产预设
//! - **配置属性注入**: 自动注册 `Property` 标记的注入值处理器
//! - **生命周期管理**: 启动整个组件图并在关闭时释放所有实例
//!
//! ## 基本使用
//!
//! ```rust,no_run
//! use infrastructure_composition::{ApplicationBuilder, Component, LoggingConfig};
//! use std::sync::Arc;
//!
//! #[derive(Component)]
//! struct Repository;
//!
//! #[derive(Component)]
//! struct Service {
//!     repository: Arc<Repository>,
//!     #[component(property = "service.name")]
//!     name: String,
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let application = ApplicationBuilder::new()
//!         .with_logging(LoggingConfig::development())
//!         .add_config_file("config.toml")?
//!         .register::<Repository>()
//!         .register::<Service>()
//!         .build()?;
//!
//!     let service = application.get::<Service>()?;
//!     println!("服务名称: {}", service.name);
//!
//!     application.shutdown();
//!     Ok(())
//! }
//! ```

pub mod application;
mod bootstrapper;
pub mod builder;

pub use application::Application;
pub use bootstrapper::CONTAINER_SECTION;
pub use builder::{ApplicationBuilder, LoggingConfig};

// 派生宏
pub use component_macros::Component;

// 重新导出错误类型
pub use infrastructure_common::{InfrastructureError, InfrastructureResult};

#[cfg(test)]
mod tests;
