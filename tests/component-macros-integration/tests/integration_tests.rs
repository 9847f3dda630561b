//! 派生组件在容器中的集成测试

use component_macros::Component;
use config_impl::{ConfigurationEnvironment, InMemoryConfigProvider, PropertyAutowiringHandler};
use di_abstractions::{DiContainer, PostConstructHandler, TypedComponentRegistry};
use di_impl::{DiContainerBuilder, DiContainerImpl};
use infrastructure_common::{
    ComponentDefinition, ComponentInstance, DependencyError, DependencyResult, Injectable,
    InjectedValue, MarkerKind, TypeInfo,
};
use parking_lot::Mutex;
use serde::Deserialize;
use std::sync::Arc;

/// 类型级标记：创建后写入审计日志
pub struct Audited;

#[derive(Component)]
pub struct AuditLog {
    #[component(default)]
    entries: Mutex<Vec<String>>,
}

impl AuditLog {
    fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }
}

#[derive(Component)]
#[component(capability = dyn PostConstructHandler)]
pub struct AuditHook {
    log: Arc<AuditLog>,
}

impl PostConstructHandler for AuditHook {
    fn supported_markers(&self) -> Vec<MarkerKind> {
        vec![MarkerKind::of::<Audited>()]
    }

    fn on_created(
        &self,
        _instance: &ComponentInstance,
        definition: &ComponentDefinition,
    ) -> DependencyResult<()> {
        self.log.entries.lock().push(definition.name().to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Limits {
    max: u32,
}

#[derive(Component)]
pub struct Database;

#[derive(Component)]
#[component(name = "accounts", marker = Audited)]
pub struct AccountService {
    database: Arc<Database>,
    #[component(property = "accounts.region")]
    region: String,
    #[component(property = "accounts.limits")]
    limits: Limits,
    #[component(property = "accounts.page_size", default)]
    page_size: usize,
    #[component(optional)]
    retries: i32,
}

#[derive(Component)]
pub struct Session(#[component(context)] Arc<String>, Arc<AccountService>);

fn container() -> DiContainerImpl {
    let environment = ConfigurationEnvironment::new().with_provider(
        InMemoryConfigProvider::new("test")
            .with("accounts.region", "eu-west")
            .with("accounts.limits.max", 5),
    );
    let mut container = DiContainerBuilder::new()
        .register::<AccountService>()
        .register::<Database>()
        .register::<AuditHook>()
        .register::<AuditLog>()
        .build();
    container.registry().register_instance(Arc::new(environment));
    container.add_definition(PropertyAutowiringHandler::definition());
    container
}

#[test]
fn derived_components_are_bootstrapped() {
    let mut container = container();
    container.bootstrap().unwrap();

    let service = container.get::<AccountService>().unwrap();
    assert!(Arc::ptr_eq(&service.database, &container.get::<Database>().unwrap()));
    assert_eq!(service.region, "eu-west");
    assert_eq!(service.limits, Limits { max: 5 });
    assert_eq!(service.page_size, 0);
    assert_eq!(service.retries, 0);
}

#[test]
fn derived_hook_runs_for_marked_component() {
    let mut container = container();
    let stats = container.bootstrap().unwrap();

    // 处理器阶段构造了属性处理器、审计钩子和它依赖的日志
    assert_eq!(stats.handler_components, 3);
    assert_eq!(container.get::<AuditLog>().unwrap().entries(), vec!["accounts"]);
}

#[test]
fn missing_property_without_default_fails() {
    let mut container = DiContainerBuilder::new()
        .register::<AccountService>()
        .register::<Database>()
        .build();
    container
        .registry()
        .register_instance(Arc::new(ConfigurationEnvironment::new()));
    container.add_definition(PropertyAutowiringHandler::definition());

    let err = container.bootstrap().unwrap_err();
    assert!(matches!(err, DependencyError::ConstructionFailed { ref type_name, .. } if type_name.ends_with("AccountService")));
}

#[test]
fn context_field_comes_from_caller() {
    let mut container = container();
    container.add_definition(Session::definition());
    // Session 需要调用方上下文，启动时无法构造
    assert!(matches!(
        container.bootstrap(),
        Err(DependencyError::ConstructionFailed { .. })
    ));
    assert!(container.get::<AccountService>().is_ok());

    let caller: InjectedValue = Arc::new("alice".to_string());
    let session = container
        .instantiate(&TypeInfo::of::<Session>(), &[Some(caller)])
        .unwrap()
        .downcast::<Session>()
        .unwrap();
    assert_eq!(session.0.as_str(), "alice");
    assert!(Arc::ptr_eq(&session.1, &container.get::<AccountService>().unwrap()));
}
