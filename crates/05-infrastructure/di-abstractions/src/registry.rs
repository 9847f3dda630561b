//! 组件注册表抽象接口

use infrastructure_common::{ComponentInstance, DependencyError, DependencyResult, TypeInfo};
use std::any::{Any, TypeId};
use std::ops::Deref;
use std::sync::Arc;

/// 组件注册表 trait
///
/// 按类型身份保存已完成构造的实例，每个类型最多一个实例。
pub trait ComponentRegistry: Send + Sync {
    /// 是否已注册该类型的实例
    fn contains(&self, type_id: TypeId) -> bool;

    /// 获取实例，不存在时返回 [`DependencyError::NotFound`]
    fn get(&self, type_info: &TypeInfo) -> DependencyResult<ComponentInstance> {
        self.get_nullable(type_info.id)
            .ok_or_else(|| DependencyError::not_found(type_info))
    }

    /// 获取实例，不存在时返回 `None`
    fn get_nullable(&self, type_id: TypeId) -> Option<ComponentInstance>;

    /// 注册实例，已存在时直接覆盖
    fn register(&self, type_info: TypeInfo, instance: ComponentInstance);

    /// 移除实例
    fn unregister(&self, type_id: TypeId) -> Option<ComponentInstance>;

    /// 所有已注册的类型
    fn registered_types(&self) -> Vec<TypeInfo>;

    /// 已注册实例数量
    fn len(&self) -> usize;

    /// 是否为空
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 清空全部实例
    fn clear(&self);
}

/// 注册表的类型化便捷接口
pub trait TypedComponentRegistry: ComponentRegistry {
    /// 获取 `T` 的实例
    fn get_typed<T: Any + Send + Sync>(&self) -> DependencyResult<Arc<T>> {
        let type_info = TypeInfo::of::<T>();
        self.get(&type_info)?.downcast::<T>().map_err(|_| {
            DependencyError::invariant_violation(&type_info, "注册的实例类型与键不一致")
        })
    }

    /// 获取 `T` 的实例，不存在或类型不符时返回 `None`
    fn get_nullable_typed<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.get_nullable(TypeId::of::<T>())
            .and_then(|instance| instance.downcast::<T>().ok())
    }

    /// 是否已注册 `T`
    fn contains_type<T: Any + Send + Sync>(&self) -> bool {
        self.contains(TypeId::of::<T>())
    }

    /// 注册 `T` 的实例
    fn register_instance<T: Any + Send + Sync>(&self, instance: Arc<T>) {
        self.register(TypeInfo::of::<T>(), instance);
    }

    /// 移除 `T` 的实例
    fn unregister_type<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.unregister(TypeId::of::<T>())
            .and_then(|instance| instance.downcast::<T>().ok())
    }
}

impl<R: ComponentRegistry + ?Sized> TypedComponentRegistry for R {}

/// 注册表句柄
///
/// 容器把自身的注册表以此类型注册为组件，需要查找其他组件的处理器可以依赖它。
#[derive(Clone)]
pub struct RegistryHandle(Arc<dyn ComponentRegistry>);

impl RegistryHandle {
    /// 包装注册表
    pub fn new(registry: Arc<dyn ComponentRegistry>) -> Self {
        Self(registry)
    }

    /// 底层注册表
    pub fn registry(&self) -> &Arc<dyn ComponentRegistry> {
        &self.0
    }
}

impl Deref for RegistryHandle {
    type Target = dyn ComponentRegistry;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl std::fmt::Debug for RegistryHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryHandle")
            .field("instances", &self.0.len())
            .finish()
    }
}
