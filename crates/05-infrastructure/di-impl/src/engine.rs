//! 构造引擎
//!
//! 选择构造函数、解析每个参数、通过增强器创建实例、注册并执行构造后处理器

use crate::dispatch::{AutowiringDispatch, PostConstructDispatch};
use di_abstractions::{ComponentRegistry, InstanceEnhancer};
use infrastructure_common::{
    Arguments, ComponentDefinition, ComponentInstance, DependencyError, DependencyResult,
    InjectedValue, Injection, ParameterDescriptor,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// 构造引擎
pub struct ConstructionEngine {
    registry: Arc<dyn ComponentRegistry>,
    autowiring: Arc<AutowiringDispatch>,
    post_construct: Arc<PostConstructDispatch>,
    enhancer: Arc<dyn InstanceEnhancer>,
}

impl ConstructionEngine {
    /// 创建构造引擎
    pub fn new(
        registry: Arc<dyn ComponentRegistry>,
        autowiring: Arc<AutowiringDispatch>,
        post_construct: Arc<PostConstructDispatch>,
        enhancer: Arc<dyn InstanceEnhancer>,
    ) -> Self {
        Self {
            registry,
            autowiring,
            post_construct,
            enhancer,
        }
    }

    /// 构造并注册组件实例
    ///
    /// `supplied` 按位置提供实参，`None` 为空占位符；未提供的位置按注入方式解析。
    pub fn instantiate(
        &self,
        definition: &ComponentDefinition,
        supplied: &[Option<InjectedValue>],
    ) -> DependencyResult<ComponentInstance> {
        let type_info = definition.type_info();
        let constructor = definition.resolvable_constructor()?;
        if supplied.len() > constructor.arity() {
            return Err(DependencyError::ArgumentMismatch {
                type_name: type_info.name.to_string(),
                index: constructor.arity(),
                expected: format!("最多 {} 个实参, 实际 {} 个", constructor.arity(), supplied.len()),
            });
        }

        let mut values = Vec::with_capacity(constructor.arity());
        for (index, parameter) in constructor.parameters().iter().enumerate() {
            let value = match supplied.get(index) {
                Some(Some(value)) => Arc::clone(value),
                Some(None) => match parameter.zero_value() {
                    Some(zero) => zero,
                    None => self.resolve_parameter(definition, index, parameter)?,
                },
                None => self.resolve_parameter(definition, index, parameter)?,
            };
            values.push(value);
        }

        let instance = self
            .enhancer
            .create_enhanced(definition, constructor, Arguments::new(type_info, values))
            .map_err(|source| DependencyError::construction_failed(&type_info, source))?;
        if (*instance).type_id() != type_info.id {
            return Err(DependencyError::construction_failed(
                &type_info,
                format!("增强器 {} 返回了其他类型的实例", self.enhancer.name()),
            ));
        }

        self.registry.register(type_info, Arc::clone(&instance));
        match self.post_construct.dispatch(&instance, definition) {
            Ok(0) => {}
            Ok(hooks) => debug!("组件 {} 执行了 {} 个构造后处理器", definition.name(), hooks),
            Err(err) => {
                warn!("组件 {} 的构造后处理失败，移除实例: {}", definition.name(), err);
                self.registry.unregister(type_info.id);
                return Err(err);
            }
        }

        debug!("组件构造完成: {}", definition.name());
        Ok(instance)
    }

    fn resolve_parameter(
        &self,
        definition: &ComponentDefinition,
        index: usize,
        parameter: &ParameterDescriptor,
    ) -> DependencyResult<InjectedValue> {
        let owner = definition.type_info();
        let declared = parameter.type_info();
        match parameter.injection() {
            Injection::Marked(marker) if self.autowiring.supports(marker.kind()) => self
                .autowiring
                .value_for(marker, parameter)
                .or_else(|| parameter.zero_value())
                .ok_or_else(|| {
                    DependencyError::construction_failed(
                        &owner,
                        format!("第 {} 个参数 ({}) 的标记 {} 没有可用的值", index, declared.name, marker.kind()),
                    )
                }),
            Injection::Marked(marker) => self.registry.get_nullable(declared.id).ok_or_else(|| {
                DependencyError::construction_failed(
                    &owner,
                    format!(
                        "第 {} 个参数 ({}) 的标记 {} 没有处理器，且该类型未注册",
                        index,
                        declared.name,
                        marker.kind()
                    ),
                )
            }),
            Injection::Optional => self
                .registry
                .get_nullable(declared.id)
                .or_else(|| parameter.zero_value())
                .ok_or_else(|| {
                    DependencyError::invariant_violation(
                        &owner,
                        format!("可选参数 {} 没有零值", declared.name),
                    )
                }),
            Injection::Context => Err(DependencyError::construction_failed(
                &owner,
                format!("第 {} 个参数 ({}) 需要调用方提供上下文", index, declared.name),
            )),
            Injection::Component => self.registry.get_nullable(declared.id).ok_or_else(|| {
                DependencyError::invariant_violation(
                    &owner,
                    format!("依赖 {} 应已在依赖树中构造", declared.name),
                )
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::DefaultComponentRegistry;
    use di_abstractions::{
        AutowiringHandler, DirectInstantiation, HandlerConflictPolicy, PostConstructHandler,
        TypedComponentRegistry,
    };
    use infrastructure_common::{
        BoxError, Constructor, Marker, MarkerKind, Property, TypeInfo,
    };
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Debug)]
    struct Repository;

    #[derive(Debug)]
    struct Service {
        repository: Arc<Repository>,
        retries: i32,
    }

    #[derive(Debug)]
    struct Named {
        name: String,
    }

    struct Listed;

    struct Fixture {
        registry: Arc<DefaultComponentRegistry>,
        autowiring: Arc<AutowiringDispatch>,
        post_construct: Arc<PostConstructDispatch>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                registry: Arc::new(DefaultComponentRegistry::new()),
                autowiring: Arc::new(AutowiringDispatch::new(HandlerConflictPolicy::Reject)),
                post_construct: Arc::new(PostConstructDispatch::new(HandlerConflictPolicy::Reject)),
            }
        }

        fn engine(&self) -> ConstructionEngine {
            self.engine_with(Arc::new(DirectInstantiation))
        }

        fn engine_with(&self, enhancer: Arc<dyn InstanceEnhancer>) -> ConstructionEngine {
            ConstructionEngine::new(
                self.registry.clone(),
                self.autowiring.clone(),
                self.post_construct.clone(),
                enhancer,
            )
        }
    }

    fn service() -> ComponentDefinition {
        ComponentDefinition::builder::<Service>()
            .constructor(
                vec![
                    ParameterDescriptor::component::<Repository>(),
                    ParameterDescriptor::optional::<i32>(),
                ],
                |args| {
                    Ok(Service {
                        repository: args.component::<Repository>(0)?,
                        retries: args.value::<i32>(1)?,
                    })
                },
            )
            .build()
    }

    fn named(parameter: ParameterDescriptor) -> ComponentDefinition {
        ComponentDefinition::builder::<Named>()
            .constructor(vec![parameter], |args| {
                Ok(Named {
                    name: args.value::<String>(0)?,
                })
            })
            .build()
    }

    #[test]
    fn component_and_optional_parameters_are_resolved() {
        let fixture = Fixture::new();
        let repository = Arc::new(Repository);
        fixture.registry.register_instance(repository.clone());

        let instance = fixture.engine().instantiate(&service(), &[]).unwrap();
        let built = instance.downcast::<Service>().unwrap();
        assert!(Arc::ptr_eq(&built.repository, &repository));
        assert_eq!(built.retries, 0);
        assert!(Arc::ptr_eq(&built, &fixture.registry.get_typed::<Service>().unwrap()));
    }

    #[test]
    fn supplied_arguments_take_precedence() {
        let fixture = Fixture::new();
        let supplied: Vec<Option<InjectedValue>> = vec![Some(Arc::new(Repository)), Some(Arc::new(5_i32))];
        let instance = fixture.engine().instantiate(&service(), &supplied).unwrap();
        assert_eq!(instance.downcast::<Service>().unwrap().retries, 5);
    }

    #[test]
    fn null_placeholder_becomes_zero_value() {
        let fixture = Fixture::new();
        fixture.registry.register_instance(Arc::new(Repository));
        let supplied: Vec<Option<InjectedValue>> = vec![None, None];
        let instance = fixture.engine().instantiate(&service(), &supplied).unwrap();
        assert_eq!(instance.downcast::<Service>().unwrap().retries, 0);
    }

    #[test]
    fn too_many_arguments_are_rejected() {
        let fixture = Fixture::new();
        let supplied: Vec<Option<InjectedValue>> = vec![None, None, None];
        assert!(matches!(
            fixture.engine().instantiate(&service(), &supplied),
            Err(DependencyError::ArgumentMismatch { .. })
        ));
    }

    #[test]
    fn missing_component_dependency_is_an_invariant_violation() {
        let fixture = Fixture::new();
        assert!(matches!(
            fixture.engine().instantiate(&service(), &[]),
            Err(DependencyError::InvariantViolation { .. })
        ));
        assert!(!fixture.registry.contains_type::<Service>());
    }

    struct NameSource;

    impl AutowiringHandler for NameSource {
        fn supported_markers(&self) -> Vec<MarkerKind> {
            vec![MarkerKind::of::<Property>()]
        }

        fn value_for(&self, marker: &Marker, _parameter: &ParameterDescriptor) -> Option<InjectedValue> {
            let key = &marker.downcast_ref::<Property>()?.key;
            (key == "app.name").then(|| Arc::new(String::from("demo")) as InjectedValue)
        }
    }

    #[test]
    fn marked_parameter_uses_handler_value() {
        let fixture = Fixture::new();
        fixture.autowiring.register(Arc::new(NameSource)).unwrap();

        let instance = fixture
            .engine()
            .instantiate(&named(ParameterDescriptor::property::<String>("app.name")), &[])
            .unwrap();
        assert_eq!(instance.downcast::<Named>().unwrap().name, "demo");
    }

    #[test]
    fn absent_handler_value_falls_back_to_zero_then_fails() {
        let fixture = Fixture::new();
        fixture.autowiring.register(Arc::new(NameSource)).unwrap();

        let with_zero = named(ParameterDescriptor::property::<String>("app.other").with_default::<String>());
        let instance = fixture.engine().instantiate(&with_zero, &[]).unwrap();
        assert_eq!(instance.downcast::<Named>().unwrap().name, "");

        fixture.registry.unregister_type::<Named>();
        let without_zero = named(ParameterDescriptor::property::<String>("app.other"));
        assert!(matches!(
            fixture.engine().instantiate(&without_zero, &[]),
            Err(DependencyError::ConstructionFailed { .. })
        ));
    }

    #[test]
    fn unsupported_marker_falls_through_to_registry() {
        let fixture = Fixture::new();
        fixture.registry.register_instance(Arc::new(String::from("registered")));

        let instance = fixture
            .engine()
            .instantiate(&named(ParameterDescriptor::property::<String>("app.name")), &[])
            .unwrap();
        assert_eq!(instance.downcast::<Named>().unwrap().name, "registered");
    }

    #[test]
    fn context_parameter_must_be_supplied() {
        let fixture = Fixture::new();
        let definition = named(ParameterDescriptor::context::<String>());
        assert!(matches!(
            fixture.engine().instantiate(&definition, &[]),
            Err(DependencyError::ConstructionFailed { .. })
        ));

        let supplied: Vec<Option<InjectedValue>> = vec![Some(Arc::new(String::from("sender")))];
        let instance = fixture.engine().instantiate(&definition, &supplied).unwrap();
        assert_eq!(instance.downcast::<Named>().unwrap().name, "sender");
    }

    struct Refusing;

    impl InstanceEnhancer for Refusing {
        fn create_enhanced(
            &self,
            _definition: &ComponentDefinition,
            _constructor: &Constructor,
            _arguments: Arguments,
        ) -> Result<ComponentInstance, BoxError> {
            Err("proxy generation disabled".into())
        }
    }

    struct Substituting;

    impl InstanceEnhancer for Substituting {
        fn create_enhanced(
            &self,
            _definition: &ComponentDefinition,
            _constructor: &Constructor,
            _arguments: Arguments,
        ) -> Result<ComponentInstance, BoxError> {
            Ok(Arc::new(Repository))
        }
    }

    #[test]
    fn enhancer_failures_are_construction_failures() {
        let fixture = Fixture::new();
        let definition = named(ParameterDescriptor::context::<String>());
        let supplied: Vec<Option<InjectedValue>> = vec![Some(Arc::new(String::from("x")))];

        let enhancers: [Arc<dyn InstanceEnhancer>; 2] = [Arc::new(Refusing), Arc::new(Substituting)];
        for enhancer in enhancers {
            let err = fixture
                .engine_with(enhancer)
                .instantiate(&definition, &supplied)
                .unwrap_err();
            assert!(matches!(err, DependencyError::ConstructionFailed { .. }));
            assert!(!fixture.registry.contains_type::<Named>());
        }
    }

    struct RejectAll {
        saw_registered: AtomicBool,
        registry: Arc<DefaultComponentRegistry>,
    }

    impl PostConstructHandler for RejectAll {
        fn supported_markers(&self) -> Vec<MarkerKind> {
            vec![MarkerKind::of::<Listed>()]
        }

        fn on_created(&self, _instance: &ComponentInstance, definition: &ComponentDefinition) -> DependencyResult<()> {
            self.saw_registered
                .store(self.registry.contains_type::<Named>(), Ordering::SeqCst);
            Err(DependencyError::handler_rejected("RejectAll", &definition.type_info(), "not allowed"))
        }
    }

    #[test]
    fn failing_hook_unregisters_instance() {
        let fixture = Fixture::new();
        let hook = Arc::new(RejectAll {
            saw_registered: AtomicBool::new(false),
            registry: fixture.registry.clone(),
        });
        fixture.post_construct.register(hook.clone()).unwrap();

        let definition = ComponentDefinition::builder::<Named>()
            .default_constructor(|| Named { name: "n".into() })
            .marker(Listed)
            .build();
        let err = fixture.engine().instantiate(&definition, &[]).unwrap_err();

        assert!(matches!(err, DependencyError::HandlerRejected { .. }));
        assert!(hook.saw_registered.load(Ordering::SeqCst));
        assert!(!fixture.registry.contains(TypeInfo::of::<Named>().id));
    }
}
