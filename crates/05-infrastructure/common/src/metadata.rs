//! 元数据定义
//!
//! 提供类型和声明式标记（marker）的元数据信息

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// 类型信息
///
/// 类型身份只由 `id` 决定，`name` 仅用于诊断输出。
#[derive(Debug, Clone, Copy)]
pub struct TypeInfo {
    /// 类型ID
    pub id: TypeId,
    /// 完整类型名称（包含模块路径）
    pub name: &'static str,
}

impl TypeInfo {
    /// 从类型获取类型信息
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// 获取简短的类型名称（不包含模块路径）
    pub fn short_name(&self) -> &'static str {
        let base = self.name.split('<').next().unwrap_or(self.name);
        let start = base.rfind("::").map_or(0, |index| index + 2);
        &self.name[start..]
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl Hash for TypeInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// 标记种类
///
/// 标记的种类就是标记载荷的类型，处理器按种类注册。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerKind(TypeInfo);

impl MarkerKind {
    /// 获取标记载荷类型对应的种类
    pub fn of<M: Any + Send + Sync>() -> Self {
        Self(TypeInfo::of::<M>())
    }

    /// 种类ID
    pub fn id(&self) -> TypeId {
        self.0.id
    }

    /// 种类名称
    pub fn name(&self) -> &'static str {
        self.0.short_name()
    }
}

impl fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.name())
    }
}

/// 声明式标记
///
/// 附加在组件类型或构造参数上，用于选择构造阶段的特殊处理。
#[derive(Clone)]
pub struct Marker {
    kind: MarkerKind,
    payload: Arc<dyn Any + Send + Sync>,
}

impl Marker {
    /// 用标记载荷创建标记
    pub fn new<M: Any + Send + Sync>(payload: M) -> Self {
        Self {
            kind: MarkerKind::of::<M>(),
            payload: Arc::new(payload),
        }
    }

    /// 标记种类
    pub fn kind(&self) -> MarkerKind {
        self.kind
    }

    /// 是否为指定载荷类型的标记
    pub fn is<M: Any + Send + Sync>(&self) -> bool {
        self.kind.id() == TypeId::of::<M>()
    }

    /// 以具体载荷类型读取标记
    pub fn downcast_ref<M: Any + Send + Sync>(&self) -> Option<&M> {
        self.payload.downcast_ref::<M>()
    }
}

impl fmt::Debug for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Marker").field(&self.kind.name()).finish()
    }
}
