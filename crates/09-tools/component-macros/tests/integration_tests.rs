//! 组件宏集成测试

use component_macros::Component;
use infrastructure_common::{
    Arguments, Injectable, InjectedValue, Injection, MarkerKind, Property, TypeInfo,
};
use std::sync::Arc;

/// 测试仓储
#[derive(Component)]
pub struct Repository;

/// 外部标记
#[derive(Debug, Clone, PartialEq)]
pub struct Tenant(&'static str);

/// 类型级标记
pub struct Audited;

/// 能力 trait
pub trait Describe: Send + Sync {
    fn describe(&self) -> String;
}

/// 测试服务
#[derive(Component)]
#[component(name = "user_service", marker = Audited, capability = dyn Describe)]
pub struct UserService {
    repository: Arc<Repository>,
    #[component(property = "users.page_size", default)]
    page_size: usize,
    #[component(optional)]
    retries: i32,
    #[component(context)]
    caller: Arc<String>,
    #[component(marker = Tenant("acme"))]
    tenant: String,
    #[component(default)]
    cache: Vec<u8>,
}

impl Describe for UserService {
    fn describe(&self) -> String {
        format!("{} x{} for {}", self.page_size, self.retries, self.caller)
    }
}

/// 元组结构体
#[derive(Component)]
pub struct Pair(Arc<Repository>, #[component(optional)] u8);

fn arc<T: std::any::Any + Send + Sync>(value: T) -> InjectedValue {
    Arc::new(value)
}

#[test]
fn test_unit_struct_has_default_constructor() {
    let definition = Repository::definition();
    assert_eq!(definition.name(), "Repository");
    assert_eq!(definition.constructors().len(), 1);
    assert_eq!(definition.constructors()[0].arity(), 0);
    assert!(definition.dependencies().unwrap().is_empty());
}

#[test]
fn test_struct_arguments_are_applied() {
    let definition = UserService::definition();
    assert_eq!(definition.name(), "user_service");
    assert!(definition.has_marker(MarkerKind::of::<Audited>()));
    assert!(definition.has_capability::<dyn Describe>());
}

#[test]
fn test_field_rules_produce_parameters() {
    let definition = UserService::definition();
    let parameters = definition.constructors()[0].parameters();
    assert_eq!(parameters.len(), 5);

    assert_eq!(parameters[0].type_info(), TypeInfo::of::<Repository>());
    assert!(matches!(parameters[0].injection(), Injection::Component));

    let property = parameters[1].marker().unwrap().downcast_ref::<Property>().unwrap();
    assert_eq!(property.key, "users.page_size");
    assert!(parameters[1].is_decodable());
    assert!(parameters[1].zero_value().is_some());

    assert!(matches!(parameters[2].injection(), Injection::Optional));
    assert!(matches!(parameters[3].injection(), Injection::Context));
    assert_eq!(parameters[3].type_info(), TypeInfo::of::<String>());
    assert_eq!(
        parameters[4].marker().unwrap().downcast_ref::<Tenant>(),
        Some(&Tenant("acme"))
    );
    assert!(parameters[4].zero_value().is_none());

    assert_eq!(definition.dependencies().unwrap(), vec![TypeInfo::of::<Repository>()]);
}

#[test]
fn test_generated_factory_builds_instance() {
    let definition = UserService::definition();
    let arguments = Arguments::new(
        definition.type_info(),
        vec![
            arc(Repository),
            arc(25_usize),
            arc(3_i32),
            arc("admin".to_string()),
            arc("acme".to_string()),
        ],
    );
    let instance = definition.constructors()[0].invoke(arguments).unwrap();

    let service = definition.cast::<dyn Describe>(&instance).unwrap();
    assert_eq!(service.describe(), "25 x3 for admin");
    let concrete = instance.downcast::<UserService>().ok().unwrap();
    assert_eq!(concrete.tenant, "acme");
    assert!(concrete.cache.is_empty());
    let _ = &concrete.repository;
}

#[test]
fn test_generated_factory_reports_mismatched_arguments() {
    let definition = Pair::definition();
    let wrong = Arguments::new(definition.type_info(), vec![arc(1_u8), arc(Repository)]);
    assert!(definition.constructors()[0].invoke(wrong).is_err());

    let right = Arguments::new(definition.type_info(), vec![arc(Repository), arc(7_u8)]);
    let pair = definition.constructors()[0]
        .invoke(right)
        .unwrap()
        .downcast::<Pair>()
        .ok()
        .unwrap();
    assert_eq!(pair.1, 7);
}
