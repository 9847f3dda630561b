//! 处理器分派
//!
//! 按标记种类把注入值请求和构造后回调委托给已注册的处理器

use di_abstractions::{AutowiringHandler, HandlerConflictPolicy, PostConstructHandler};
use infrastructure_common::{
    ComponentDefinition, ComponentInstance, DependencyError, DependencyResult, InjectedValue,
    Marker, MarkerKind, ParameterDescriptor,
};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

/// 标记种类到处理器的映射项
pub struct HandlerEntry<H: ?Sized> {
    /// 处理器名称
    pub name: String,
    /// 处理器
    pub handler: Arc<H>,
}

impl<H: ?Sized> Clone for HandlerEntry<H> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            handler: Arc::clone(&self.handler),
        }
    }
}

/// 处理器表，一个种类最多对应一个处理器
struct HandlerTable<H: ?Sized> {
    policy: HandlerConflictPolicy,
    entries: RwLock<HashMap<MarkerKind, HandlerEntry<H>>>,
}

impl<H: ?Sized> HandlerTable<H> {
    fn new(policy: HandlerConflictPolicy) -> Self {
        Self {
            policy,
            entries: RwLock::new(HashMap::new()),
        }
    }

    fn register(&self, name: &str, kinds: Vec<MarkerKind>, handler: Arc<H>) -> DependencyResult<()> {
        let mut entries = self.entries.write();

        // 先检查全部种类，避免部分注册
        if self.policy == HandlerConflictPolicy::Reject {
            if let Some((kind, existing)) = kinds
                .iter()
                .find_map(|kind| entries.get(kind).map(|existing| (kind, existing)))
            {
                return Err(DependencyError::DuplicateHandler {
                    marker: kind.to_string(),
                    existing: existing.name.clone(),
                    incoming: name.to_string(),
                });
            }
        }

        for kind in kinds {
            let entry = HandlerEntry {
                name: name.to_string(),
                handler: Arc::clone(&handler),
            };
            match entries.insert(kind, entry) {
                Some(replaced) => warn!("处理器 {} 替换了 {} 对 {} 的处理", name, replaced.name, kind),
                None => debug!("注册处理器 {} -> {}", kind, name),
            }
        }
        Ok(())
    }

    fn handler(&self, kind: MarkerKind) -> Option<Arc<H>> {
        self.entries
            .read()
            .get(&kind)
            .map(|entry| Arc::clone(&entry.handler))
    }

    fn supports(&self, kind: MarkerKind) -> bool {
        self.entries.read().contains_key(&kind)
    }

    fn kinds(&self) -> HashSet<MarkerKind> {
        self.entries.read().keys().copied().collect()
    }

    fn entries(&self) -> Vec<(MarkerKind, HandlerEntry<H>)> {
        self.entries
            .read()
            .iter()
            .map(|(kind, entry)| (*kind, entry.clone()))
            .collect()
    }
}

/// 注入值处理器分派
pub struct AutowiringDispatch {
    table: HandlerTable<dyn AutowiringHandler>,
}

impl AutowiringDispatch {
    /// 创建分派器
    pub fn new(policy: HandlerConflictPolicy) -> Self {
        Self {
            table: HandlerTable::new(policy),
        }
    }

    /// 为处理器声明的每个种类注册处理器
    pub fn register(&self, handler: Arc<dyn AutowiringHandler>) -> DependencyResult<()> {
        let name = handler.name().to_string();
        self.table
            .register(&name, handler.supported_markers(), handler)
    }

    /// 是否有处理器支持该种类
    pub fn supports(&self, kind: MarkerKind) -> bool {
        self.table.supports(kind)
    }

    /// 请求带标记参数的值，没有处理器或处理器无法提供时返回 `None`
    pub fn value_for(&self, marker: &Marker, parameter: &ParameterDescriptor) -> Option<InjectedValue> {
        let handler = self.table.handler(marker.kind())?;
        handler.value_for(marker, parameter)
    }

    /// 已注册的种类与处理器名称
    pub fn registered(&self) -> Vec<(MarkerKind, String)> {
        self.table
            .entries()
            .into_iter()
            .map(|(kind, entry)| (kind, entry.name))
            .collect()
    }
}

/// 构造后处理器分派
pub struct PostConstructDispatch {
    table: HandlerTable<dyn PostConstructHandler>,
}

impl PostConstructDispatch {
    /// 创建分派器
    pub fn new(policy: HandlerConflictPolicy) -> Self {
        Self {
            table: HandlerTable::new(policy),
        }
    }

    /// 为处理器声明的每个种类注册处理器
    pub fn register(&self, handler: Arc<dyn PostConstructHandler>) -> DependencyResult<()> {
        let name = handler.name().to_string();
        self.table
            .register(&name, handler.supported_markers(), handler)
    }

    /// 是否有处理器支持该种类
    pub fn supports(&self, kind: MarkerKind) -> bool {
        self.table.supports(kind)
    }

    /// 对实例的每个有处理器的类型级标记调用一次处理器
    ///
    /// 返回调用次数，第一个失败立即返回。
    pub fn dispatch(
        &self,
        instance: &ComponentInstance,
        definition: &ComponentDefinition,
    ) -> DependencyResult<usize> {
        self.dispatch_except(instance, definition, &HashSet::new())
    }

    /// 同 [`dispatch`](Self::dispatch)，但跳过 `handled` 中的种类
    pub fn dispatch_except(
        &self,
        instance: &ComponentInstance,
        definition: &ComponentDefinition,
        handled: &HashSet<MarkerKind>,
    ) -> DependencyResult<usize> {
        let mut invoked = 0;
        for marker in definition.markers() {
            if handled.contains(&marker.kind()) {
                continue;
            }
            let Some(handler) = self.table.handler(marker.kind()) else {
                continue;
            };
            debug!("执行构造后处理器 {} -> {}", marker.kind(), definition.name());
            handler.on_created(instance, definition)?;
            invoked += 1;
        }
        Ok(invoked)
    }

    /// 当前有处理器的种类
    pub fn kinds(&self) -> HashSet<MarkerKind> {
        self.table.kinds()
    }

    /// 已注册的种类与处理器名称
    pub fn registered(&self) -> Vec<(MarkerKind, String)> {
        self.table
            .entries()
            .into_iter()
            .map(|(kind, entry)| (kind, entry.name))
            .collect()
    }
}
