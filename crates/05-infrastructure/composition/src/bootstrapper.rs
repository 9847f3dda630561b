//! 应用启动器

use crate::application::Application;
use crate::builder::ApplicationBuilder;
use config_impl::{ConfigurationEnvironment, PropertyAutowiringHandler};
use di_abstractions::{ContainerConfig, DiContainer, TypedComponentRegistry};
use di_impl::{DiContainerBuilder, DiContainerImpl};
use infrastructure_common::{InfrastructureResult, Injectable};
use std::sync::Arc;
use tracing::{debug, info};

/// 配置中容器配置所在的节
pub const CONTAINER_SECTION: &str = "container";

/// 应用启动器
///
/// 负责协调配置环境和组件容器的启动顺序
pub(crate) struct ApplicationBootstrapper {
    builder: ApplicationBuilder,
}

impl ApplicationBootstrapper {
    /// 创建启动器
    pub(crate) fn new(builder: ApplicationBuilder) -> Self {
        Self { builder }
    }

    /// 启动应用
    pub(crate) fn bootstrap(mut self) -> InfrastructureResult<Application> {
        info!("开始启动应用");

        // 第一步：初始化配置环境
        let environment = self.bootstrap_configuration();

        // 第二步：确定容器配置
        let config = self.container_config(&environment)?;

        // 第三步：组装并启动组件容器
        let mut container = self.assemble_container(config, environment.clone())?;
        let stats = container.bootstrap()?;

        info!("应用启动完成");
        Ok(Application::new(container, environment, stats))
    }

    fn bootstrap_configuration(&mut self) -> Arc<ConfigurationEnvironment> {
        info!("启动配置环境");
        let environment = ConfigurationEnvironment::new();
        for provider in std::mem::take(&mut self.builder.config_sources) {
            environment.add_provider(provider);
        }
        debug!("配置提供者查找顺序: {:?}", environment.provider_names());
        Arc::new(environment)
    }

    fn container_config(
        &mut self,
        environment: &ConfigurationEnvironment,
    ) -> InfrastructureResult<ContainerConfig> {
        if let Some(config) = self.builder.container_config.take() {
            debug!("使用显式指定的容器配置");
            return Ok(config);
        }
        let config = environment.get_or(CONTAINER_SECTION, ContainerConfig::default())?;
        debug!("容器配置: {:?}", config);
        Ok(config)
    }

    fn assemble_container(
        &mut self,
        config: ContainerConfig,
        environment: Arc<ConfigurationEnvironment>,
    ) -> InfrastructureResult<DiContainerImpl> {
        let mut builder = DiContainerBuilder::new().config(config);
        if let Some(enhancer) = self.builder.enhancer.take() {
            info!("使用实例增强器: {}", enhancer.name());
            builder = builder.enhancer(enhancer);
        }
        let mut container = builder.build();

        // 配置环境作为现成实例提供给组件
        container.registry().register_instance(environment);
        if self.builder.property_injection {
            container.add_definition(PropertyAutowiringHandler::definition());
        }

        for handler in std::mem::take(&mut self.builder.autowiring_handlers) {
            container.register_autowiring_handler(handler)?;
        }
        for handler in std::mem::take(&mut self.builder.post_construct_handlers) {
            container.register_post_construct_handler(handler)?;
        }
        for definition in std::mem::take(&mut self.builder.definitions) {
            container.add_definition(definition);
        }
        for discovery in std::mem::take(&mut self.builder.discoveries) {
            container.add_discovery(discovery);
        }
        Ok(container)
    }
}
