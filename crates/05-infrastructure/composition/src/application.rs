//! 应用句柄

use config_impl::ConfigurationEnvironment;
use di_abstractions::{ComponentRegistry, ContainerStats, DiContainer, TypedComponentRegistry};
use di_impl::DiContainerImpl;
use infrastructure_common::{
    ComponentInstance, ConfigResult, DependencyResult, InfrastructureResult, InjectedValue,
    TypeInfo,
};
use serde::de::DeserializeOwned;
use std::any::Any;
use std::sync::Arc;
use tracing::info;

/// 已启动的应用
///
/// 持有配置环境和组件容器，启动后的查找可以在多个线程中并发进行
pub struct Application {
    container: DiContainerImpl,
    environment: Arc<ConfigurationEnvironment>,
    stats: ContainerStats,
}

impl Application {
    pub(crate) fn new(
        container: DiContainerImpl,
        environment: Arc<ConfigurationEnvironment>,
        stats: ContainerStats,
    ) -> Self {
        Self {
            container,
            environment,
            stats,
        }
    }

    /// 获取 `T` 的实例
    pub fn get<T: Any + Send + Sync>(&self) -> DependencyResult<Arc<T>> {
        self.container.get::<T>()
    }

    /// 获取 `T` 的实例，不存在时返回 `None`
    pub fn get_nullable<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.container.registry().get_nullable_typed::<T>()
    }

    /// 是否已注册 `T`
    pub fn contains<T: Any + Send + Sync>(&self) -> bool {
        self.container.registry().contains_type::<T>()
    }

    /// 移除 `T` 的实例
    pub fn unregister<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.container.registry().unregister_type::<T>()
    }

    /// 使用调用方实参构造 `type_info` 对应的组件，已注册时返回现有实例
    pub fn instantiate(
        &self,
        type_info: &TypeInfo,
        supplied: &[Option<InjectedValue>],
    ) -> DependencyResult<ComponentInstance> {
        self.container.instantiate(type_info, supplied)
    }

    /// 读取配置值
    pub fn config<T: DeserializeOwned>(&self, key: &str) -> ConfigResult<T> {
        self.environment.get_typed(key)
    }

    /// 配置环境
    pub fn environment(&self) -> &Arc<ConfigurationEnvironment> {
        &self.environment
    }

    /// 组件注册表
    pub fn registry(&self) -> Arc<dyn ComponentRegistry> {
        self.container.registry()
    }

    /// 组件容器
    pub fn container(&self) -> &DiContainerImpl {
        &self.container
    }

    /// 启动统计信息
    pub fn stats(&self) -> &ContainerStats {
        &self.stats
    }

    /// 重新加载全部配置源
    ///
    /// 已构造的组件不受影响，只有之后构造的组件会读到新值。
    pub fn reload_configuration(&self) -> InfrastructureResult<()> {
        self.environment.reload()?;
        info!("配置已重新加载");
        Ok(())
    }

    /// 关闭应用，释放所有组件实例
    pub fn shutdown(mut self) {
        info!("关闭应用");
        self.container.shutdown();
    }
}

impl std::fmt::Debug for Application {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Application")
            .field("environment", &self.environment)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
