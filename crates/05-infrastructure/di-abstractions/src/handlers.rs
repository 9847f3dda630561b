//! 构造期扩展点
//!
//! 两类按标记分派的处理器：为带标记的构造参数提供值，以及在带标记的组件创建后执行逻辑。

use infrastructure_common::{
    ComponentDefinition, ComponentInstance, DependencyResult, InjectedValue, Marker, MarkerKind,
    ParameterDescriptor,
};

/// 注入值处理器
pub trait AutowiringHandler: Send + Sync {
    /// 支持的标记种类
    fn supported_markers(&self) -> Vec<MarkerKind>;

    /// 为带标记的参数提供值
    ///
    /// 返回 `None` 表示无法提供，由构造引擎回退到零值。
    fn value_for(&self, marker: &Marker, parameter: &ParameterDescriptor) -> Option<InjectedValue>;

    /// 处理器名称
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// 构造后处理器
pub trait PostConstructHandler: Send + Sync {
    /// 支持的标记种类
    fn supported_markers(&self) -> Vec<MarkerKind>;

    /// 组件实例注册后调用
    ///
    /// 对每个匹配的类型级标记调用一次；返回错误会使该实例被移除。
    fn on_created(
        &self,
        instance: &ComponentInstance,
        definition: &ComponentDefinition,
    ) -> DependencyResult<()>;

    /// 处理器名称
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
