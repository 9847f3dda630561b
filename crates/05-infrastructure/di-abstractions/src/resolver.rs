//! 依赖树解析抽象接口
//!
//! 计算组件的构造顺序并检测循环依赖

use infrastructure_common::{ComponentDefinition, DependencyResult, TypeInfo};
use std::any::TypeId;
use std::sync::Arc;

/// 组件定义来源
pub trait DefinitionProvider: Send + Sync {
    /// 按类型查找定义
    fn definition(&self, type_id: TypeId) -> Option<Arc<ComponentDefinition>>;
}

/// 依赖树解析器 trait
pub trait DependencyTreeResolver: Send + Sync {
    /// 计算 `root` 的构造顺序
    ///
    /// 返回值不包含 `root` 本身和已注册的类型，依赖总是排在依赖方之前。
    /// 为空表示可以直接构造 `root`。
    fn resolve(&self, root: &TypeInfo) -> DependencyResult<Vec<TypeInfo>>;
}
