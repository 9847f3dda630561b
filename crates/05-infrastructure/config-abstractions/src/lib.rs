//! # Configuration Abstractions
//!
//! 配置抽象层，定义配置提供者和属性解析的核心接口。
//!
//! ## 核心接口
//!
//! - [`ConfigProvider`] - 配置提供者接口
//! - [`PropertyResolver`] - 属性解析接口

pub mod provider;

pub use provider::*;
