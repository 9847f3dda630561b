//! 容器整体行为的集中集成测试

use di_abstractions::{
    AutowiringHandler, ComponentRegistry, DiContainer, InstanceEnhancer, RegistryHandle,
    TypedComponentRegistry,
};
use di_impl::{DiContainerBuilder, StaticDiscovery};
use infrastructure_common::{
    Arguments, BoxError, ComponentDefinition, ComponentInstance, Constructor, DependencyError,
    InjectedValue, Injectable, Marker, MarkerKind, ParameterDescriptor, TypeInfo,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct Base;

impl Injectable for Base {
    fn definition() -> ComponentDefinition {
        ComponentDefinition::builder::<Self>()
            .default_constructor(|| Base)
            .build()
    }
}

struct Left {
    base: Arc<Base>,
}

impl Injectable for Left {
    fn definition() -> ComponentDefinition {
        ComponentDefinition::builder::<Self>()
            .constructor(vec![ParameterDescriptor::component::<Base>()], |args| {
                Ok(Left {
                    base: args.component(0)?,
                })
            })
            .build()
    }
}

struct Right {
    base: Arc<Base>,
}

impl Injectable for Right {
    fn definition() -> ComponentDefinition {
        ComponentDefinition::builder::<Self>()
            .constructor(vec![ParameterDescriptor::component::<Base>()], |args| {
                Ok(Right {
                    base: args.component(0)?,
                })
            })
            .build()
    }
}

struct Top {
    left: Arc<Left>,
    right: Arc<Right>,
}

impl Injectable for Top {
    fn definition() -> ComponentDefinition {
        ComponentDefinition::builder::<Self>()
            .constructor(
                vec![
                    ParameterDescriptor::component::<Left>(),
                    ParameterDescriptor::component::<Right>(),
                ],
                |args| {
                    Ok(Top {
                        left: args.component(0)?,
                        right: args.component(1)?,
                    })
                },
            )
            .build()
    }
}

/// 环境变量风格的外部标记
struct Env(&'static str);

/// 把标记中的名称转为大写作为注入值
struct EnvHandler;

impl AutowiringHandler for EnvHandler {
    fn supported_markers(&self) -> Vec<MarkerKind> {
        vec![MarkerKind::of::<Env>()]
    }

    fn value_for(&self, marker: &Marker, _parameter: &ParameterDescriptor) -> Option<InjectedValue> {
        let name = marker.downcast_ref::<Env>()?.0;
        Some(Arc::new(name.to_uppercase()))
    }
}

struct Endpoints {
    primary: String,
    fallback: String,
}

impl Injectable for Endpoints {
    fn definition() -> ComponentDefinition {
        ComponentDefinition::builder::<Self>()
            .constructor(
                vec![
                    ParameterDescriptor::marked::<String>(Marker::new(Env("primary"))),
                    ParameterDescriptor::marked::<String>(Marker::new(Env("fallback"))),
                ],
                |args| {
                    Ok(Endpoints {
                        primary: args.value(0)?,
                        fallback: args.value(1)?,
                    })
                },
            )
            .build()
    }
}

struct Retrying {
    attempts: u32,
    base: Arc<Base>,
}

impl Injectable for Retrying {
    fn definition() -> ComponentDefinition {
        ComponentDefinition::builder::<Self>()
            .constructor(
                vec![
                    ParameterDescriptor::optional::<u32>(),
                    ParameterDescriptor::component::<Base>(),
                ],
                |args| {
                    Ok(Retrying {
                        attempts: args.value(0)?,
                        base: args.component(1)?,
                    })
                },
            )
            .build()
    }
}

/// 统计工厂调用次数的增强器
#[derive(Default)]
struct CountingEnhancer {
    calls: AtomicUsize,
}

impl InstanceEnhancer for CountingEnhancer {
    fn create_enhanced(
        &self,
        _definition: &ComponentDefinition,
        constructor: &Constructor,
        arguments: Arguments,
    ) -> Result<ComponentInstance, BoxError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        constructor.invoke(arguments)
    }
}

#[test]
fn diamond_shares_single_base() -> anyhow::Result<()> {
    let mut container = DiContainerBuilder::new()
        .register::<Top>()
        .register::<Left>()
        .register::<Right>()
        .register::<Base>()
        .build();
    container.bootstrap()?;

    let top = container.get::<Top>()?;
    assert!(Arc::ptr_eq(&top.left.base, &top.right.base));
    assert!(Arc::ptr_eq(&top.left, &container.get::<Left>()?));
    assert!(Arc::ptr_eq(&top.right, &container.get::<Right>()?));
    Ok(())
}

#[test]
fn enhancer_sees_every_construction_once() -> anyhow::Result<()> {
    let enhancer = Arc::new(CountingEnhancer::default());
    let mut container = DiContainerBuilder::new()
        .enhancer(enhancer.clone())
        .discovery(StaticDiscovery::new("graph").with::<Top>().with::<Left>())
        .discovery(StaticDiscovery::new("leaves").with::<Right>().with::<Base>())
        .build();

    let stats = container.bootstrap()?;
    assert_eq!(enhancer.calls.load(Ordering::SeqCst), 4);
    assert_eq!(stats.definitions, 4);
    assert_eq!(stats.components_constructed, 4);
    // 注册表句柄也是实例
    assert_eq!(stats.registered_instances, 5);
    Ok(())
}

#[test]
fn repeated_bootstrap_reuses_instances() -> anyhow::Result<()> {
    let mut container = DiContainerBuilder::new()
        .register::<Left>()
        .register::<Base>()
        .build();
    container.bootstrap()?;
    let left = container.get::<Left>()?;

    let stats = container.bootstrap()?;
    assert_eq!(stats.components_constructed, 0);
    assert!(Arc::ptr_eq(&left, &container.get::<Left>()?));
    Ok(())
}

#[test]
fn directly_registered_handler_feeds_marked_parameters() -> anyhow::Result<()> {
    let mut container = DiContainerBuilder::new().register::<Endpoints>().build();
    container.register_autowiring_handler(Arc::new(EnvHandler))?;
    container.bootstrap()?;

    let endpoints = container.get::<Endpoints>()?;
    assert_eq!(endpoints.primary, "PRIMARY");
    assert_eq!(endpoints.fallback, "FALLBACK");
    Ok(())
}

#[test]
fn null_placeholders_use_zero_or_fall_through() -> anyhow::Result<()> {
    let mut container = DiContainerBuilder::new()
        .register::<Base>()
        .register::<Retrying>()
        .build();
    container.bootstrap()?;
    let base = container.get::<Base>()?;
    container.registry().unregister_type::<Retrying>();

    // 可选参数的占位使用零值，依赖参数的占位回退到注册表
    let instance = container
        .instantiate(&TypeInfo::of::<Retrying>(), &[None, None])?
        .downcast::<Retrying>()
        .map_err(|_| anyhow::anyhow!("类型不符"))?;
    assert_eq!(instance.attempts, 0);
    assert!(Arc::ptr_eq(&instance.base, &base));

    let supplied: Vec<Option<InjectedValue>> = vec![Some(Arc::new(5_u32))];
    let instance = container
        .instantiate(&TypeInfo::of::<Retrying>(), &supplied)?
        .downcast::<Retrying>()
        .map_err(|_| anyhow::anyhow!("类型不符"))?;
    assert_eq!(instance.attempts, 5);
    Ok(())
}

#[test]
fn too_many_arguments_are_rejected() {
    let mut container = DiContainerBuilder::new().register::<Base>().build();
    container.bootstrap().unwrap();
    // 已注册的类型直接返回单例，不会检查实参
    container.registry().unregister_type::<Base>();

    let supplied: Vec<Option<InjectedValue>> = vec![Some(Arc::new(1_u8))];
    let err = container
        .instantiate(&TypeInfo::of::<Base>(), &supplied)
        .unwrap_err();
    assert!(matches!(err, DependencyError::ArgumentMismatch { index: 0, .. }));
}

#[test]
fn several_constructors_without_default_are_ambiguous() {
    let definition = ComponentDefinition::builder::<Left>()
        .constructor(vec![ParameterDescriptor::component::<Base>()], |args| {
            Ok(Left {
                base: args.component(0)?,
            })
        })
        .constructor(vec![ParameterDescriptor::component::<Right>()], |args| {
            let right: Arc<Right> = args.component(0)?;
            Ok(Left {
                base: right.base.clone(),
            })
        })
        .build();
    let mut container = DiContainerBuilder::new()
        .discovery(StaticDiscovery::new("ambiguous").with_definition(definition))
        .build();

    assert!(matches!(
        container.bootstrap(),
        Err(DependencyError::AmbiguousConstructor { constructors: 2, .. })
    ));
}

#[test]
fn registry_handle_exposes_container_registry() -> anyhow::Result<()> {
    let mut container = DiContainerBuilder::new().register::<Base>().build();
    container.bootstrap()?;

    let handle = container.get::<RegistryHandle>()?;
    assert!(handle.contains_type::<Base>());
    assert_eq!(handle.len(), container.registry().len());
    Ok(())
}

#[tokio::test]
async fn concurrent_tasks_share_bootstrapped_graph() -> anyhow::Result<()> {
    let mut container = DiContainerBuilder::new()
        .register::<Base>()
        .register::<Left>()
        .register::<Right>()
        .register::<Top>()
        .build();
    container.bootstrap()?;
    let registry = container.registry();
    let expected = container.get::<Top>()?;

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move { registry.get_typed::<Top>() })
        })
        .collect();
    for task in tasks {
        let top = task.await??;
        assert!(Arc::ptr_eq(&top, &expected));
        assert!(Arc::ptr_eq(&top.left.base, &top.right.base));
    }
    Ok(())
}
