//! 配置环境
//!
//! 按优先级叠加多个配置提供者

use config_abstractions::{ConfigProvider, PropertyResolver};
use infrastructure_common::{ConfigError, ConfigResult};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

/// 配置环境
///
/// 查找时按优先级从高到低询问提供者，第一个包含该键的提供者胜出；
/// 优先级相同时先添加的优先。
#[derive(Default)]
pub struct ConfigurationEnvironment {
    providers: RwLock<Vec<Box<dyn ConfigProvider>>>,
}

impl ConfigurationEnvironment {
    /// 创建空环境
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加提供者
    #[must_use]
    pub fn with_provider(self, provider: impl ConfigProvider + 'static) -> Self {
        self.add_provider(Box::new(provider));
        self
    }

    /// 添加提供者
    pub fn add_provider(&self, provider: Box<dyn ConfigProvider>) {
        info!(
            "添加配置提供者: {} (优先级 {})",
            provider.name(),
            provider.priority()
        );
        let mut providers = self.providers.write();
        providers.push(provider);
        // 稳定排序保持同优先级的添加顺序
        providers.sort_by_key(|provider| std::cmp::Reverse(provider.priority()));
    }

    /// 提供者名称，按查找顺序
    pub fn provider_names(&self) -> Vec<String> {
        self.providers
            .read()
            .iter()
            .map(|provider| provider.name().to_string())
            .collect()
    }

    /// 读取并反序列化配置值
    pub fn get_typed<T: DeserializeOwned>(&self, key: &str) -> ConfigResult<T> {
        let value = self
            .get_property(key)
            .ok_or_else(|| ConfigError::KeyNotFound { key: key.to_string() })?;
        serde_json::from_value(value).map_err(|e| ConfigError::TypeConversionError {
            key: key.to_string(),
            message: e.to_string(),
        })
    }

    /// 读取配置值，不存在时使用默认值
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> ConfigResult<T> {
        match self.get_typed(key) {
            Err(ConfigError::KeyNotFound { .. }) => Ok(default),
            other => other,
        }
    }

    /// 重新加载全部提供者
    pub fn reload(&self) -> ConfigResult<()> {
        let mut providers = self.providers.write();
        for provider in providers.iter_mut() {
            provider.reload()?;
            debug!("配置提供者已重新加载: {}", provider.name());
        }
        Ok(())
    }
}

impl PropertyResolver for ConfigurationEnvironment {
    fn get_property(&self, key: &str) -> Option<Value> {
        self.providers
            .read()
            .iter()
            .find_map(|provider| provider.get_configuration(key).ok())
    }
}

impl std::fmt::Debug for ConfigurationEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigurationEnvironment")
            .field("providers", &self.provider_names())
            .finish()
    }
}
