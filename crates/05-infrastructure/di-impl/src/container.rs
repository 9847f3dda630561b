//! 组件容器
//!
//! 按 候选注册 -> 处理器阶段 -> 组件阶段 的顺序启动整个组件图

use crate::definitions::DefinitionRegistry;
use crate::dispatch::{AutowiringDispatch, PostConstructDispatch};
use crate::engine::ConstructionEngine;
use crate::registry::DefaultComponentRegistry;
use crate::resolver::DelegatingDependencyTreeResolver;
use di_abstractions::{
    AutowiringHandler, ComponentDiscovery, ComponentRegistry, ContainerConfig, ContainerStats,
    DefinitionProvider, DependencyTreeResolver, DiContainer, DirectInstantiation,
    InstanceEnhancer, PostConstructHandler, RegistryHandle, TypedComponentRegistry,
};
use infrastructure_common::{
    ComponentDefinition, ComponentInstance, DependencyError, DependencyResult, InjectedValue,
    Injectable, MarkerKind, TypeInfo,
};
use std::any::{Any, TypeId};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// 具体的依赖注入容器实现
pub struct DiContainerImpl {
    config: ContainerConfig,
    registry: Arc<DefaultComponentRegistry>,
    definitions: Arc<DefinitionRegistry>,
    autowiring: Arc<AutowiringDispatch>,
    post_construct: Arc<PostConstructDispatch>,
    resolver: DelegatingDependencyTreeResolver,
    engine: ConstructionEngine,
    discoveries: Vec<Box<dyn ComponentDiscovery>>,
    pending: Vec<ComponentDefinition>,
    wired_handlers: HashSet<TypeId>,
    stats: ContainerStats,
}

impl DiContainerImpl {
    /// 使用默认配置创建容器
    pub fn new() -> Self {
        DiContainerBuilder::new().build()
    }

    /// 容器配置
    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// 已知的组件定义
    pub fn definition(&self, type_id: TypeId) -> Option<Arc<ComponentDefinition>> {
        self.definitions.definition(type_id)
    }

    /// 获取 `T` 的实例
    pub fn get<T: Any + Send + Sync>(&self) -> DependencyResult<Arc<T>> {
        self.registry.get_typed::<T>()
    }

    /// 使用调用方实参构造组件
    ///
    /// 依赖树中尚未注册的类型按默认方式构造，`supplied` 只用于 `type_info` 本身。
    /// 该类型已注册时直接返回现有实例，不会重新构造，`supplied` 被忽略。
    pub fn instantiate(
        &self,
        type_info: &TypeInfo,
        supplied: &[Option<InjectedValue>],
    ) -> DependencyResult<ComponentInstance> {
        if let Some(existing) = self.registry.get_nullable(type_info.id) {
            debug!("组件 {} 已注册，返回现有实例", type_info.short_name());
            return Ok(existing);
        }
        let definition = self.require_definition(type_info, "<caller>")?;
        self.construct_tree(type_info)?;
        self.engine.instantiate(&definition, supplied)
    }

    fn require_definition(
        &self,
        type_info: &TypeInfo,
        required_by: &str,
    ) -> DependencyResult<Arc<ComponentDefinition>> {
        self.definitions
            .definition(type_info.id)
            .ok_or_else(|| DependencyError::MissingDefinition {
                type_name: type_info.name.to_string(),
                required_by: required_by.to_string(),
            })
    }

    /// 构造依赖树中尚未注册的元素，返回构造的类型
    fn construct_tree(&self, root: &TypeInfo) -> DependencyResult<Vec<TypeId>> {
        let tree = self.resolver.resolve(root)?;
        if self.config.log_dependency_trees {
            info!(
                "组件 {} 的依赖树: [{}]",
                root.short_name(),
                tree.iter().map(TypeInfo::short_name).collect::<Vec<_>>().join(" -> ")
            );
        }

        let mut constructed = Vec::with_capacity(tree.len());
        for element in &tree {
            if self.registry.contains(element.id) {
                continue;
            }
            let definition = self.require_definition(element, root.name)?;
            self.engine.instantiate(&definition, &[])?;
            constructed.push(element.id);
        }
        Ok(constructed)
    }

    /// 构造并注册组件及其尚未注册的依赖，已注册时直接返回现有实例
    fn create_and_register(
        &self,
        definition: &ComponentDefinition,
        built: &mut HashSet<TypeId>,
    ) -> DependencyResult<ComponentInstance> {
        if let Some(existing) = self.registry.get_nullable(definition.type_id()) {
            return Ok(existing);
        }

        let type_info = definition.type_info();
        built.extend(self.construct_tree(&type_info)?);
        let instance = self.engine.instantiate(definition, &[])?;
        built.insert(type_info.id);
        Ok(instance)
    }

    fn collect_definitions(&mut self) -> DependencyResult<()> {
        for definition in std::mem::take(&mut self.pending) {
            self.definitions.insert(definition)?;
        }
        for discovery in std::mem::take(&mut self.discoveries) {
            let found = discovery.discover()?;
            debug!("发现器 {} 提供了 {} 个组件定义", discovery.name(), found.len());
            for definition in found {
                self.definitions.insert(definition)?;
            }
        }
        Ok(())
    }

    fn wire_handlers(
        &mut self,
        candidates: &[Arc<ComponentDefinition>],
        built: &mut HashSet<TypeId>,
    ) -> DependencyResult<usize> {
        // 处理器阶段构造的每个类型在构造时已有处理器的标记种类
        let mut handled_at_creation: Vec<(TypeId, HashSet<MarkerKind>)> = Vec::new();
        let mut wired = 0;
        for definition in candidates {
            if self.wired_handlers.contains(&definition.type_id()) {
                continue;
            }
            let autowiring = definition.has_capability::<dyn AutowiringHandler>();
            let post_construct = definition.has_capability::<dyn PostConstructHandler>();
            if !autowiring && !post_construct {
                continue;
            }

            let handled = self.post_construct.kinds();
            let before = built.clone();
            let instance = self.create_and_register(definition, built)?;
            handled_at_creation.extend(
                built
                    .difference(&before)
                    .map(|type_id| (*type_id, handled.clone())),
            );
            let type_info = definition.type_info();
            if autowiring {
                let handler = definition
                    .cast::<dyn AutowiringHandler>(&instance)
                    .ok_or_else(|| cast_failed(&type_info, "AutowiringHandler"))?;
                self.autowiring.register(handler)?;
            }
            if post_construct {
                let handler = definition
                    .cast::<dyn PostConstructHandler>(&instance)
                    .ok_or_else(|| cast_failed(&type_info, "PostConstructHandler"))?;
                self.post_construct.register(handler)?;
            }
            info!("处理器组件就绪: {}", definition.name());
            self.wired_handlers.insert(type_info.id);
            wired += 1;
        }

        for (type_id, handled) in handled_at_creation {
            self.run_late_hooks(type_id, &handled)?;
        }
        Ok(wired)
    }

    /// 为处理器阶段提前构造的实例补执行之后才注册的构造后处理器
    fn run_late_hooks(&self, type_id: TypeId, handled: &HashSet<MarkerKind>) -> DependencyResult<()> {
        let (Some(instance), Some(definition)) =
            (self.registry.get_nullable(type_id), self.definitions.definition(type_id))
        else {
            return Ok(());
        };
        match self.post_construct.dispatch_except(&instance, &definition, handled) {
            Ok(0) => Ok(()),
            Ok(hooks) => {
                debug!("组件 {} 补执行了 {} 个构造后处理器", definition.name(), hooks);
                Ok(())
            }
            Err(err) => {
                self.registry.unregister(type_id);
                Err(err)
            }
        }
    }
}

fn cast_failed(type_info: &TypeInfo, capability: &str) -> DependencyError {
    DependencyError::invariant_violation(type_info, format!("实例无法转换为 {capability}"))
}

fn register_handle(registry: &Arc<DefaultComponentRegistry>) {
    registry.register_instance(Arc::new(RegistryHandle::new(registry.clone())));
}

impl Drop for DiContainerImpl {
    fn drop(&mut self) {
        // 注册表持有指向自身的句柄，清空以释放全部实例
        self.registry.clear();
    }
}

impl Default for DiContainerImpl {
    fn default() -> Self {
        Self::new()
    }
}

impl DiContainer for DiContainerImpl {
    fn add_discovery(&mut self, discovery: Box<dyn ComponentDiscovery>) {
        debug!("添加组件发现器: {}", discovery.name());
        self.discoveries.push(discovery);
    }

    fn add_definition(&mut self, definition: ComponentDefinition) {
        self.pending.push(definition);
    }

    fn register_autowiring_handler(
        &self,
        handler: Arc<dyn AutowiringHandler>,
    ) -> DependencyResult<()> {
        info!("注册注入值处理器: {}", handler.name());
        self.autowiring.register(handler)
    }

    fn register_post_construct_handler(
        &self,
        handler: Arc<dyn PostConstructHandler>,
    ) -> DependencyResult<()> {
        info!("注册构造后处理器: {}", handler.name());
        self.post_construct.register(handler)
    }

    fn bootstrap(&mut self) -> DependencyResult<ContainerStats> {
        info!("开始启动组件容器");
        let mut stats = ContainerStats::default();
        // 关闭后再次启动时注册表句柄已被清除
        if !self.registry.contains_type::<RegistryHandle>() {
            register_handle(&self.registry);
        }

        let started = Instant::now();
        self.collect_definitions()?;
        let candidates = self.definitions.candidates();
        stats.definitions = candidates.len();
        stats.discovery_time = started.elapsed();

        let mut built = HashSet::new();
        let started = Instant::now();
        let wired = self.wire_handlers(&candidates, &mut built)?;
        stats.handler_components = built.len();
        stats.handler_phase_time = started.elapsed();
        debug!("处理器阶段完成: {} 个处理器组件", wired);

        let started = Instant::now();
        for definition in &candidates {
            // 本轮已构造过的类型可能已被其他组件消费并移除，不再重建
            if built.contains(&definition.type_id()) {
                continue;
            }
            self.create_and_register(definition, &mut built)?;
        }
        stats.components_constructed = built.len() - stats.handler_components;
        stats.component_phase_time = started.elapsed();
        stats.registered_instances = self.registry.len();

        info!(
            "组件容器启动完成: {} 个定义, {} 个处理器组件, {} 个组件, 耗时 {:?}",
            stats.definitions,
            stats.handler_components,
            stats.components_constructed,
            stats.total_time()
        );
        self.stats = stats.clone();
        Ok(stats)
    }

    fn registry(&self) -> Arc<dyn ComponentRegistry> {
        self.registry.clone()
    }

    fn stats(&self) -> ContainerStats {
        self.stats.clone()
    }

    fn shutdown(&mut self) {
        info!("关闭组件容器，释放 {} 个实例", self.registry.len());
        self.registry.clear();
        self.wired_handlers.clear();
    }
}

/// 容器构建器实现
pub struct DiContainerBuilder {
    config: ContainerConfig,
    enhancer: Arc<dyn InstanceEnhancer>,
    discoveries: Vec<Box<dyn ComponentDiscovery>>,
    pending: Vec<ComponentDefinition>,
}

impl DiContainerBuilder {
    /// 创建构建器
    pub fn new() -> Self {
        Self {
            config: ContainerConfig::default(),
            enhancer: Arc::new(DirectInstantiation),
            discoveries: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// 设置容器配置
    #[must_use]
    pub fn config(mut self, config: ContainerConfig) -> Self {
        self.config = config;
        self
    }

    /// 设置实例增强器
    #[must_use]
    pub fn enhancer(mut self, enhancer: Arc<dyn InstanceEnhancer>) -> Self {
        self.enhancer = enhancer;
        self
    }

    /// 添加组件发现器
    #[must_use]
    pub fn discovery(mut self, discovery: impl ComponentDiscovery + 'static) -> Self {
        self.discoveries.push(Box::new(discovery));
        self
    }

    /// 添加候选组件
    #[must_use]
    pub fn register<T: Injectable>(mut self) -> Self {
        self.pending.push(T::definition());
        self
    }

    /// 构建容器
    pub fn build(self) -> DiContainerImpl {
        let registry = Arc::new(DefaultComponentRegistry::new());
        let definitions = Arc::new(DefinitionRegistry::new());
        let policy = self.config.handler_conflict_policy;
        let autowiring = Arc::new(AutowiringDispatch::new(policy));
        let post_construct = Arc::new(PostConstructDispatch::new(policy));

        let resolver = DelegatingDependencyTreeResolver::new(registry.clone(), definitions.clone());
        let engine = ConstructionEngine::new(
            registry.clone(),
            autowiring.clone(),
            post_construct.clone(),
            self.enhancer,
        );
        register_handle(&registry);

        info!(
            "构建组件容器: 处理器冲突策略 {:?}, {} 个候选组件, {} 个发现器",
            policy,
            self.pending.len(),
            self.discoveries.len()
        );
        DiContainerImpl {
            config: self.config,
            registry,
            definitions,
            autowiring,
            post_construct,
            resolver,
            engine,
            discoveries: self.discoveries,
            pending: self.pending,
            wired_handlers: HashSet::new(),
            stats: ContainerStats::default(),
        }
    }
}

impl Default for DiContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
