//! 实例增强抽象接口
//!
//! 构造引擎通过增强器调用工厂函数，增强器可以替换为代理或包装实现

use infrastructure_common::{Arguments, BoxError, ComponentDefinition, ComponentInstance, Constructor};

/// 实例增强器 trait
pub trait InstanceEnhancer: Send + Sync {
    /// 创建（可能被增强的）实例
    ///
    /// 返回的实例必须与定义的类型一致。
    fn create_enhanced(
        &self,
        definition: &ComponentDefinition,
        constructor: &Constructor,
        arguments: Arguments,
    ) -> Result<ComponentInstance, BoxError>;

    /// 增强器名称
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// 直接调用工厂函数，不做任何增强
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectInstantiation;

impl InstanceEnhancer for DirectInstantiation {
    fn create_enhanced(
        &self,
        _definition: &ComponentDefinition,
        constructor: &Constructor,
        arguments: Arguments,
    ) -> Result<ComponentInstance, BoxError> {
        constructor.invoke(arguments)
    }
}
