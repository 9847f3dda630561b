//! 默认组件注册表

use dashmap::DashMap;
use di_abstractions::ComponentRegistry;
use infrastructure_common::{ComponentInstance, TypeInfo};
use std::any::TypeId;
use tracing::debug;

/// 基于并发哈希表的组件注册表
///
/// 启动完成后可以被多个线程同时读取。
#[derive(Default)]
pub struct DefaultComponentRegistry {
    instances: DashMap<TypeId, (TypeInfo, ComponentInstance)>,
}

impl DefaultComponentRegistry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self::default()
    }
}

impl ComponentRegistry for DefaultComponentRegistry {
    fn contains(&self, type_id: TypeId) -> bool {
        self.instances.contains_key(&type_id)
    }

    fn get_nullable(&self, type_id: TypeId) -> Option<ComponentInstance> {
        self.instances
            .get(&type_id)
            .map(|entry| ComponentInstance::clone(&entry.value().1))
    }

    fn register(&self, type_info: TypeInfo, instance: ComponentInstance) {
        if self
            .instances
            .insert(type_info.id, (type_info, instance))
            .is_some()
        {
            debug!("覆盖已注册的组件实例: {}", type_info.name);
        } else {
            debug!("注册组件实例: {}", type_info.name);
        }
    }

    fn unregister(&self, type_id: TypeId) -> Option<ComponentInstance> {
        self.instances.remove(&type_id).map(|(_, (type_info, instance))| {
            debug!("移除组件实例: {}", type_info.name);
            instance
        })
    }

    fn registered_types(&self) -> Vec<TypeInfo> {
        self.instances.iter().map(|entry| entry.value().0).collect()
    }

    fn len(&self) -> usize {
        self.instances.len()
    }

    fn clear(&self) {
        self.instances.clear();
    }
}

impl std::fmt::Debug for DefaultComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultComponentRegistry")
            .field("instances", &self.instances.len())
            .finish()
    }
}
