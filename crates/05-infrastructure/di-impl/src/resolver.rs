//! 依赖树解析器实现

use di_abstractions::{ComponentRegistry, DefinitionProvider, DependencyTreeResolver};
use infrastructure_common::{DependencyError, DependencyResult, TypeInfo};
use std::any::TypeId;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// 遍历栈上的一层：类型及其尚未检查的依赖
struct Frame {
    type_info: TypeInfo,
    remaining: std::vec::IntoIter<TypeInfo>,
}

/// 委托注册表和定义表的依赖树解析器
///
/// 用显式栈深度优先遍历所选构造函数的依赖参数，跳过已注册的类型。
/// 依赖出现在当前栈上即为循环依赖。
pub struct DelegatingDependencyTreeResolver {
    registry: Arc<dyn ComponentRegistry>,
    definitions: Arc<dyn DefinitionProvider>,
}

impl DelegatingDependencyTreeResolver {
    /// 创建解析器
    pub fn new(registry: Arc<dyn ComponentRegistry>, definitions: Arc<dyn DefinitionProvider>) -> Self {
        Self {
            registry,
            definitions,
        }
    }

    fn frame(&self, type_info: TypeInfo, required_by: Option<&TypeInfo>) -> DependencyResult<Frame> {
        let definition = self.definitions.definition(type_info.id).ok_or_else(|| {
            DependencyError::MissingDefinition {
                type_name: type_info.name.to_string(),
                required_by: required_by
                    .map_or_else(|| "<root>".to_string(), |parent| parent.name.to_string()),
            }
        })?;
        Ok(Frame {
            type_info,
            remaining: definition.dependencies()?.into_iter(),
        })
    }

    /// 后序遍历，依赖总在依赖方之前，根在最后
    fn walk(&self, root: TypeInfo) -> DependencyResult<Vec<TypeInfo>> {
        let mut stack = vec![self.frame(root, None)?];
        let mut visited: HashSet<TypeId> = HashSet::new();
        let mut order = Vec::new();

        while let Some(top) = stack.last_mut() {
            let current = top.type_info;
            let Some(dependency) = top.remaining.next() else {
                stack.pop();
                visited.insert(current.id);
                order.push(current);
                continue;
            };

            if self.registry.contains(dependency.id) || visited.contains(&dependency.id) {
                continue;
            }
            if let Some(start) = stack.iter().position(|frame| frame.type_info == dependency) {
                let path = stack[start..]
                    .iter()
                    .map(|frame| &frame.type_info)
                    .chain(std::iter::once(&dependency))
                    .map(|type_info| type_info.short_name().to_string())
                    .collect();
                return Err(DependencyError::CircularDependency { path });
            }
            let frame = self.frame(dependency, Some(&current))?;
            stack.push(frame);
        }
        Ok(order)
    }
}

impl DependencyTreeResolver for DelegatingDependencyTreeResolver {
    fn resolve(&self, root: &TypeInfo) -> DependencyResult<Vec<TypeInfo>> {
        if self.registry.contains(root.id) {
            return Ok(Vec::new());
        }

        let mut order = self.walk(*root)?;
        order.pop();

        debug!(
            "依赖树 {}: [{}]",
            root.short_name(),
            order
                .iter()
                .map(TypeInfo::short_name)
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(order)
    }
}
