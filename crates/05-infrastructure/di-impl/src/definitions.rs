//! 组件定义存储

use di_abstractions::DefinitionProvider;
use infrastructure_common::{ComponentDefinition, DependencyError, DependencyResult};
use parking_lot::RwLock;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

#[derive(Default)]
struct Definitions {
    order: Vec<TypeId>,
    by_type: HashMap<TypeId, Arc<ComponentDefinition>>,
}

/// 候选组件定义表
///
/// 保持发现顺序，同一类型只允许一个定义。
#[derive(Default)]
pub struct DefinitionRegistry {
    inner: RwLock<Definitions>,
}

impl DefinitionRegistry {
    /// 创建空定义表
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加定义，类型重复时返回 [`DependencyError::DuplicateDefinition`]
    pub fn insert(&self, definition: ComponentDefinition) -> DependencyResult<Arc<ComponentDefinition>> {
        let type_info = definition.type_info();
        let mut inner = self.inner.write();
        if inner.by_type.contains_key(&type_info.id) {
            return Err(DependencyError::DuplicateDefinition {
                type_name: type_info.name.to_string(),
            });
        }
        debug!("添加组件定义: {} ({})", definition.name(), type_info.name);
        let definition = Arc::new(definition);
        inner.order.push(type_info.id);
        inner.by_type.insert(type_info.id, Arc::clone(&definition));
        Ok(definition)
    }

    /// 按发现顺序返回全部定义
    pub fn candidates(&self) -> Vec<Arc<ComponentDefinition>> {
        let inner = self.inner.read();
        inner
            .order
            .iter()
            .filter_map(|type_id| inner.by_type.get(type_id).cloned())
            .collect()
    }

    /// 定义数量
    pub fn len(&self) -> usize {
        self.inner.read().order.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DefinitionProvider for DefinitionRegistry {
    fn definition(&self, type_id: TypeId) -> Option<Arc<ComponentDefinition>> {
        self.inner.read().by_type.get(&type_id).cloned()
    }
}

impl std::fmt::Debug for DefinitionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefinitionRegistry")
            .field("definitions", &self.len())
            .finish()
    }
}
