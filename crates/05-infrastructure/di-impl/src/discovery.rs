//! 静态组件发现

use di_abstractions::ComponentDiscovery;
use infrastructure_common::{ComponentDefinition, DependencyResult, Injectable};

/// 由代码显式列出的候选组件
///
/// ```ignore
/// let discovery = StaticDiscovery::new("commands")
///     .with::<HelpCommand>()
///     .with::<StatusCommand>();
/// ```
#[derive(Debug, Clone)]
pub struct StaticDiscovery {
    name: String,
    definitions: Vec<ComponentDefinition>,
}

impl StaticDiscovery {
    /// 创建空的发现器
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            definitions: Vec::new(),
        }
    }

    /// 添加可注入类型
    #[must_use]
    pub fn with<T: Injectable>(mut self) -> Self {
        self.definitions.push(T::definition());
        self
    }

    /// 添加组件定义
    #[must_use]
    pub fn with_definition(mut self, definition: ComponentDefinition) -> Self {
        self.definitions.push(definition);
        self
    }
}

impl ComponentDiscovery for StaticDiscovery {
    fn discover(&self) -> DependencyResult<Vec<ComponentDefinition>> {
        Ok(self.definitions.clone())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
