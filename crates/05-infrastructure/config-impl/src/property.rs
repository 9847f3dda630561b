//! 配置属性注入
//!
//! 为带 [`Property`] 标记的构造参数从配置环境取值

use crate::environment::ConfigurationEnvironment;
use config_abstractions::PropertyResolver;
use di_abstractions::AutowiringHandler;
use infrastructure_common::{
    ComponentDefinition, InjectedValue, Injectable, Marker, MarkerKind, ParameterDescriptor,
    Property,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// 配置属性注入处理器
pub struct PropertyAutowiringHandler {
    environment: Arc<ConfigurationEnvironment>,
}

impl PropertyAutowiringHandler {
    /// 创建处理器
    pub fn new(environment: Arc<ConfigurationEnvironment>) -> Self {
        Self { environment }
    }

    /// 另一种表示：字符串尝试按 JSON 解析，标量转为字符串
    fn alternate(value: &Value) -> Option<Value> {
        match value {
            Value::String(text) => serde_json::from_str(text).ok(),
            Value::Number(_) | Value::Bool(_) => Some(Value::String(value.to_string())),
            _ => None,
        }
    }
}

impl AutowiringHandler for PropertyAutowiringHandler {
    fn supported_markers(&self) -> Vec<MarkerKind> {
        vec![MarkerKind::of::<Property>()]
    }

    fn value_for(&self, marker: &Marker, parameter: &ParameterDescriptor) -> Option<InjectedValue> {
        let key = &marker.downcast_ref::<Property>()?.key;
        let Some(value) = self.environment.get_property(key) else {
            debug!("配置属性不存在: {}", key);
            return None;
        };
        if !parameter.is_decodable() {
            warn!(
                "参数 {} 无法从配置解码，忽略属性 {}",
                parameter.type_info().name,
                key
            );
            return None;
        }

        let alternate = Self::alternate(&value);
        match parameter.decode(value)? {
            Ok(decoded) => Some(decoded),
            Err(err) => match alternate.and_then(|value| parameter.decode(value)?.ok()) {
                Some(decoded) => Some(decoded),
                None => {
                    warn!(
                        "配置属性 {} 无法转换为 {}: {}",
                        key,
                        parameter.type_info().name,
                        err
                    );
                    None
                }
            },
        }
    }
}

impl Injectable for PropertyAutowiringHandler {
    fn definition() -> ComponentDefinition {
        ComponentDefinition::builder::<Self>()
            .constructor(
                vec![ParameterDescriptor::component::<ConfigurationEnvironment>()],
                |args| Ok(Self::new(args.component::<ConfigurationEnvironment>(0)?)),
            )
            .capability::<dyn AutowiringHandler, _>(|this| this as Arc<dyn AutowiringHandler>)
            .build()
    }
}
