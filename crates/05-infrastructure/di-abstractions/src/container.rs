//! 依赖注入容器抽象接口
//!
//! 提供组件容器的启动、查找和关闭接口

use crate::discovery::ComponentDiscovery;
use crate::handlers::{AutowiringHandler, PostConstructHandler};
use crate::registry::ComponentRegistry;
use infrastructure_common::{ComponentDefinition, DependencyResult, Injectable};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// 依赖注入容器 trait
pub trait DiContainer: Send + Sync {
    /// 添加组件发现器
    fn add_discovery(&mut self, discovery: Box<dyn ComponentDiscovery>);

    /// 添加候选组件定义
    fn add_definition(&mut self, definition: ComponentDefinition);

    /// 添加类型 `T` 作为候选组件
    fn register<T: Injectable>(&mut self)
    where
        Self: Sized,
    {
        self.add_definition(T::definition());
    }

    /// 直接注册注入值处理器
    fn register_autowiring_handler(
        &self,
        handler: Arc<dyn AutowiringHandler>,
    ) -> DependencyResult<()>;

    /// 直接注册构造后处理器
    fn register_post_construct_handler(
        &self,
        handler: Arc<dyn PostConstructHandler>,
    ) -> DependencyResult<()>;

    /// 启动容器，构造所有候选组件
    fn bootstrap(&mut self) -> DependencyResult<ContainerStats>;

    /// 组件注册表
    fn registry(&self) -> Arc<dyn ComponentRegistry>;

    /// 最近一次启动的统计信息
    fn stats(&self) -> ContainerStats;

    /// 关闭容器，释放所有实例
    fn shutdown(&mut self);
}

/// 同一标记被多个处理器声明时的处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandlerConflictPolicy {
    /// 拒绝后注册的处理器
    #[default]
    Reject,
    /// 后注册的处理器替换先注册的
    Replace,
}

/// 容器配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// 处理器冲突策略
    pub handler_conflict_policy: HandlerConflictPolicy,
    /// 是否以 info 级别记录每个组件的依赖树
    pub log_dependency_trees: bool,
}

/// 容器统计信息
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContainerStats {
    /// 候选组件定义数量
    pub definitions: usize,
    /// 启动时构造的处理器组件数量
    pub handler_components: usize,
    /// 启动时构造的普通组件数量（包括作为依赖构造的）
    pub components_constructed: usize,
    /// 启动结束时注册表中的实例数量
    pub registered_instances: usize,
    /// 发现阶段耗时
    pub discovery_time: Duration,
    /// 处理器阶段耗时
    pub handler_phase_time: Duration,
    /// 组件阶段耗时
    pub component_phase_time: Duration,
}

impl ContainerStats {
    /// 总耗时
    pub fn total_time(&self) -> Duration {
        self.discovery_time + self.handler_phase_time + self.component_phase_time
    }
}
