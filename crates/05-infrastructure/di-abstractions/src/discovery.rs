//! 组件发现抽象接口
//!
//! 提供候选组件定义的来源

use infrastructure_common::{ComponentDefinition, DependencyResult};

/// 组件发现器 trait
pub trait ComponentDiscovery: Send + Sync {
    /// 发现候选组件定义
    ///
    /// 启动时调用一次，返回顺序即候选顺序。
    fn discover(&self) -> DependencyResult<Vec<ComponentDefinition>>;

    /// 获取发现器名称
    fn name(&self) -> &str;
}
