//! 应用构建器

use crate::application::Application;
use crate::bootstrapper::ApplicationBootstrapper;
use config_abstractions::ConfigProvider;
use config_impl::{EnvironmentConfigProvider, FileConfigProvider, InMemoryConfigProvider};
use di_abstractions::{
    AutowiringHandler, ComponentDiscovery, ContainerConfig, InstanceEnhancer, PostConstructHandler,
};
use infrastructure_common::{ComponentDefinition, InfrastructureError, InfrastructureResult, Injectable};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// 应用构建器
///
/// 使用建造者模式收集配置源、候选组件和处理器，`build` 时完成整个组件图的启动
pub struct ApplicationBuilder {
    /// 配置源列表
    pub(crate) config_sources: Vec<Box<dyn ConfigProvider>>,
    /// 组件发现器列表
    pub(crate) discoveries: Vec<Box<dyn ComponentDiscovery>>,
    /// 直接添加的候选组件
    pub(crate) definitions: Vec<ComponentDefinition>,
    /// 直接注册的注入值处理器
    pub(crate) autowiring_handlers: Vec<Arc<dyn AutowiringHandler>>,
    /// 直接注册的构造后处理器
    pub(crate) post_construct_handlers: Vec<Arc<dyn PostConstructHandler>>,
    /// 实例增强器
    pub(crate) enhancer: Option<Arc<dyn InstanceEnhancer>>,
    /// 显式指定的容器配置，优先于配置源中的 `container` 节
    pub(crate) container_config: Option<ContainerConfig>,
    /// 是否注册配置属性注入处理器
    pub(crate) property_injection: bool,
    /// 是否启用日志初始化
    logging_enabled: bool,
    /// 日志配置
    logging_config: LoggingConfig,
}

impl ApplicationBuilder {
    /// 创建新的应用构建器
    pub fn new() -> Self {
        Self {
            config_sources: Vec::new(),
            discoveries: Vec::new(),
            definitions: Vec::new(),
            autowiring_handlers: Vec::new(),
            post_construct_handlers: Vec::new(),
            enhancer: None,
            container_config: None,
            property_injection: true,
            logging_enabled: false, // 默认不启用日志初始化
            logging_config: LoggingConfig::default(),
        }
    }

    /// 添加配置文件，按扩展名识别 TOML、JSON 或 YAML
    pub fn add_config_file<P: AsRef<Path>>(mut self, path: P) -> InfrastructureResult<Self> {
        let path = path.as_ref();
        info!("添加配置文件: {}", path.display());
        let provider = FileConfigProvider::new(path)?;
        self.config_sources.push(Box::new(provider));
        Ok(self)
    }

    /// 添加环境变量配置源
    pub fn add_config_env_vars<S: Into<String>>(mut self, prefix: S) -> InfrastructureResult<Self> {
        let prefix = prefix.into();
        info!("添加环境变量配置源，前缀: {}", prefix);
        let provider = EnvironmentConfigProvider::new(prefix)?;
        self.config_sources.push(Box::new(provider));
        Ok(self)
    }

    /// 添加默认配置值，优先级最低
    #[must_use]
    pub fn with_default_config(mut self, defaults: serde_json::Value) -> Self {
        debug!("添加默认配置");
        let provider = InMemoryConfigProvider::from_value("defaults", defaults).with_priority(i32::MIN);
        self.config_sources.push(Box::new(provider));
        self
    }

    /// 添加自定义配置提供者
    #[must_use]
    pub fn add_config_provider<T: ConfigProvider + 'static>(mut self, provider: T) -> Self {
        info!("添加自定义配置提供者: {}", provider.name());
        self.config_sources.push(Box::new(provider));
        self
    }

    /// 添加组件发现器
    #[must_use]
    pub fn add_discovery<T: ComponentDiscovery + 'static>(mut self, discovery: T) -> Self {
        debug!("添加组件发现器: {}", discovery.name());
        self.discoveries.push(Box::new(discovery));
        self
    }

    /// 添加类型 `T` 作为候选组件
    #[must_use]
    pub fn register<T: Injectable>(mut self) -> Self {
        self.definitions.push(T::definition());
        self
    }

    /// 添加候选组件定义
    #[must_use]
    pub fn add_definition(mut self, definition: ComponentDefinition) -> Self {
        self.definitions.push(definition);
        self
    }

    /// 直接注册注入值处理器
    #[must_use]
    pub fn with_autowiring_handler(mut self, handler: Arc<dyn AutowiringHandler>) -> Self {
        self.autowiring_handlers.push(handler);
        self
    }

    /// 直接注册构造后处理器
    #[must_use]
    pub fn with_post_construct_handler(mut self, handler: Arc<dyn PostConstructHandler>) -> Self {
        self.post_construct_handlers.push(handler);
        self
    }

    /// 设置实例增强器
    #[must_use]
    pub fn with_enhancer(mut self, enhancer: Arc<dyn InstanceEnhancer>) -> Self {
        self.enhancer = Some(enhancer);
        self
    }

    /// 显式设置容器配置
    #[must_use]
    pub fn with_container_config(mut self, config: ContainerConfig) -> Self {
        self.container_config = Some(config);
        self
    }

    /// 启用或禁用配置属性注入
    #[must_use]
    pub fn enable_property_injection(mut self, enabled: bool) -> Self {
        self.property_injection = enabled;
        self
    }

    /// 配置日志
    #[must_use]
    pub fn with_logging(mut self, config: LoggingConfig) -> Self {
        self.logging_config = config;
        self.logging_enabled = true; // 启用日志初始化
        self
    }

    /// 构建应用并启动组件容器
    pub fn build(self) -> InfrastructureResult<Application> {
        // 只有在明确配置了日志时才初始化日志
        // 避免在测试环境中重复初始化
        if self.logging_enabled {
            self.logging_config.initialize()?;
        }

        info!("开始构建应用");
        let application = ApplicationBootstrapper::new(self).bootstrap()?;
        info!("应用构建完成");
        Ok(application)
    }
}

impl Default for ApplicationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 过滤指令，`RUST_LOG` 存在时以其为准
    pub filter: String,
    /// 是否显示目标
    pub show_target: bool,
    /// 是否显示线程ID
    pub show_thread_ids: bool,
    /// 是否显示文件名
    pub show_file: bool,
    /// 是否显示行号
    pub show_line_number: bool,
    /// 是否使用 JSON 格式
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            show_target: true,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// 创建开发环境日志配置
    pub fn development() -> Self {
        Self {
            filter: "debug".to_string(),
            show_target: true,
            show_thread_ids: true,
            show_file: true,
            show_line_number: true,
            json_format: false,
        }
    }

    /// 创建生产环境日志配置
    pub fn production() -> Self {
        Self {
            filter: "info".to_string(),
            show_target: false,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: true,
        }
    }

    /// 初始化全局日志订阅者
    ///
    /// 已有全局订阅者时返回 `BootstrapFailed`。
    pub fn initialize(&self) -> InfrastructureResult<()> {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.filter))
            .map_err(|e| InfrastructureError::BootstrapFailed {
                message: format!("日志过滤指令无效: {}", e),
            })?;
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(self.show_target)
            .with_thread_ids(self.show_thread_ids)
            .with_file(self.show_file)
            .with_line_number(self.show_line_number);

        let result = if self.json_format {
            subscriber.json().try_init()
        } else {
            subscriber.try_init()
        };
        result.map_err(|e| InfrastructureError::BootstrapFailed {
            message: format!("日志初始化失败: {}", e),
        })?;

        info!("日志系统初始化完成");
        Ok(())
    }
}
