//! 错误类型定义

use crate::metadata::TypeInfo;
use thiserror::Error;

/// 装箱的底层错误，用于携带工厂函数或处理器返回的原因
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    #[error("配置文件格式不受支持: {path}")]
    UnsupportedFormat { path: String },

    #[error("配置解析失败: {source}")]
    ParseError { source: BoxError },

    #[error("配置序列化失败: {source}")]
    SerializationError {
        #[from]
        source: serde_json::Error,
    },

    #[error("配置键不存在: {key}")]
    KeyNotFound { key: String },

    #[error("配置类型转换失败: {key}, 原因: {message}")]
    TypeConversionError { key: String, message: String },
}

/// 依赖注入错误类型
///
/// 容器核心的所有失败都通过此类型向上传播，启动流程遇到任意一种都会立即终止。
#[derive(Error, Debug)]
pub enum DependencyError {
    #[error("组件未注册: {type_name}")]
    NotFound { type_name: String },

    #[error("检测到循环依赖: {}", .path.join(" -> "))]
    CircularDependency { path: Vec<String> },

    #[error("组件创建失败: {type_name}, 原因: {source}")]
    ConstructionFailed { type_name: String, source: BoxError },

    #[error("无法选择构造函数: {type_name} 有 {constructors} 个构造函数且没有无参构造函数")]
    AmbiguousConstructor { type_name: String, constructors: usize },

    #[error("内部不变量被破坏: {type_name}, {message}")]
    InvariantViolation { type_name: String, message: String },

    #[error("缺少组件定义: {type_name} (依赖方: {required_by})")]
    MissingDefinition { type_name: String, required_by: String },

    #[error("组件定义重复: {type_name}")]
    DuplicateDefinition { type_name: String },

    #[error("标记 {marker} 已由 {existing} 处理，拒绝注册 {incoming}")]
    DuplicateHandler {
        marker: String,
        existing: String,
        incoming: String,
    },

    #[error("处理器 {handler} 拒绝组件 {type_name}: {message}")]
    HandlerRejected {
        handler: String,
        type_name: String,
        message: String,
    },

    #[error("构造参数不匹配: {type_name} 第 {index} 个参数, 期望 {expected}")]
    ArgumentMismatch {
        type_name: String,
        index: usize,
        expected: String,
    },
}

impl DependencyError {
    /// 创建组件未注册错误
    pub fn not_found(type_info: &TypeInfo) -> Self {
        Self::NotFound {
            type_name: type_info.name.to_string(),
        }
    }

    /// 创建组件创建失败错误
    pub fn construction_failed(type_info: &TypeInfo, source: impl Into<BoxError>) -> Self {
        Self::ConstructionFailed {
            type_name: type_info.name.to_string(),
            source: source.into(),
        }
    }

    /// 创建不变量破坏错误
    pub fn invariant_violation(type_info: &TypeInfo, message: impl Into<String>) -> Self {
        Self::InvariantViolation {
            type_name: type_info.name.to_string(),
            message: message.into(),
        }
    }

    /// 创建处理器拒绝错误
    pub fn handler_rejected(
        handler: impl Into<String>,
        type_info: &TypeInfo,
        message: impl Into<String>,
    ) -> Self {
        Self::HandlerRejected {
            handler: handler.into(),
            type_name: type_info.name.to_string(),
            message: message.into(),
        }
    }

    /// 是否为循环依赖错误
    pub fn is_circular(&self) -> bool {
        matches!(self, Self::CircularDependency { .. })
    }

    /// 是否为组件未注册错误
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// 基础设施错误类型
#[derive(Error, Debug)]
pub enum InfrastructureError {
    #[error("配置错误: {source}")]
    ConfigError {
        #[from]
        source: ConfigError,
    },

    #[error("依赖注入错误: {source}")]
    DependencyError {
        #[from]
        source: DependencyError,
    },

    #[error("基础设施启动失败: {message}")]
    BootstrapFailed { message: String },

    #[error("基础设施关闭失败: {message}")]
    ShutdownFailed { message: String },
}

/// 结果类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type DependencyResult<T> = Result<T, DependencyError>;
pub type InfrastructureResult<T> = Result<T, InfrastructureError>;
