//! 配置提供者实现

use config::{Config, Environment, File, FileFormat};
use config_abstractions::{collect_keys, lookup_path, ConfigProvider};
use infrastructure_common::{ConfigError, ConfigResult};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

fn build_tree(builder: config::ConfigBuilder<config::builder::DefaultState>) -> ConfigResult<Value> {
    let settings: Config = builder.build().map_err(|e| {
        error!("配置构建失败: {}", e);
        ConfigError::ParseError { source: Box::new(e) }
    })?;
    settings
        .try_deserialize::<Value>()
        .map_err(|e| ConfigError::ParseError { source: Box::new(e) })
}

fn get_from(tree: &Value, key: &str) -> ConfigResult<Value> {
    lookup_path(tree, key)
        .cloned()
        .ok_or_else(|| ConfigError::KeyNotFound { key: key.to_string() })
}

/// 文件配置提供者
///
/// 根据扩展名识别 TOML、JSON 或 YAML 格式。
#[derive(Debug)]
pub struct FileConfigProvider {
    file_path: PathBuf,
    format: FileFormat,
    tree: Value,
    priority: i32,
}

impl FileConfigProvider {
    /// 加载配置文件
    pub fn new<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let file_path = path.as_ref().to_path_buf();
        let format = Self::detect_format(&file_path)?;
        let mut provider = Self {
            file_path,
            format,
            tree: Value::Null,
            // 文件默认高优先级
            priority: 100,
        };
        provider.load()?;
        Ok(provider)
    }

    /// 设置优先级
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// 文件路径
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    fn detect_format(path: &Path) -> ConfigResult<FileFormat> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(FileFormat::Toml),
            Some("json") => Ok(FileFormat::Json),
            Some("yaml" | "yml") => Ok(FileFormat::Yaml),
            _ => Err(ConfigError::UnsupportedFormat {
                path: path.display().to_string(),
            }),
        }
    }

    fn load(&mut self) -> ConfigResult<()> {
        debug!("加载配置文件: {}", self.file_path.display());
        if !self.file_path.exists() {
            return Err(ConfigError::FileNotFound {
                path: self.file_path.display().to_string(),
            });
        }
        self.tree = build_tree(
            Config::builder().add_source(File::from(self.file_path.as_path()).format(self.format)),
        )?;
        debug!("配置文件加载完成: {}", self.file_path.display());
        Ok(())
    }
}

impl ConfigProvider for FileConfigProvider {
    fn get_configuration(&self, key: &str) -> ConfigResult<Value> {
        get_from(&self.tree, key)
    }

    fn contains_key(&self, key: &str) -> bool {
        lookup_path(&self.tree, key).is_some()
    }

    fn get_all_keys(&self) -> Vec<String> {
        collect_keys(&self.tree)
    }

    fn reload(&mut self) -> ConfigResult<()> {
        self.load()
    }

    fn name(&self) -> &str {
        "FileConfigProvider"
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}

/// 环境变量配置提供者
///
/// `APP__SERVER__PORT=8080` 在前缀为 `APP` 时映射为键 `server.port`，值会尝试解析为数字或布尔值。
#[derive(Debug)]
pub struct EnvironmentConfigProvider {
    prefix: String,
    separator: String,
    source: Option<HashMap<String, String>>,
    tree: Value,
    priority: i32,
}

impl EnvironmentConfigProvider {
    /// 读取进程环境变量
    pub fn new(prefix: impl Into<String>) -> ConfigResult<Self> {
        Self::build(prefix.into(), None)
    }

    /// 从给定的变量表读取，而不是进程环境
    pub fn from_vars(prefix: impl Into<String>, vars: HashMap<String, String>) -> ConfigResult<Self> {
        Self::build(prefix.into(), Some(vars))
    }

    fn build(prefix: String, source: Option<HashMap<String, String>>) -> ConfigResult<Self> {
        let mut provider = Self {
            prefix,
            separator: "__".to_string(),
            source,
            tree: Value::Null,
            // 环境变量覆盖文件
            priority: 200,
        };
        provider.load()?;
        Ok(provider)
    }

    /// 设置优先级
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// 环境变量前缀
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// 层级分隔符
    pub fn separator(&self) -> &str {
        &self.separator
    }

    fn load(&mut self) -> ConfigResult<()> {
        let environment = Environment::with_prefix(&self.prefix)
            .separator(&self.separator)
            .try_parsing(true)
            .source(self.source.clone());
        self.tree = build_tree(Config::builder().add_source(environment))?;
        debug!(
            "环境变量配置加载完成: 前缀 {}, {} 个键",
            self.prefix,
            collect_keys(&self.tree).len()
        );
        Ok(())
    }
}

impl ConfigProvider for EnvironmentConfigProvider {
    fn get_configuration(&self, key: &str) -> ConfigResult<Value> {
        get_from(&self.tree, &key.to_lowercase())
    }

    fn contains_key(&self, key: &str) -> bool {
        lookup_path(&self.tree, &key.to_lowercase()).is_some()
    }

    fn get_all_keys(&self) -> Vec<String> {
        collect_keys(&self.tree)
    }

    fn reload(&mut self) -> ConfigResult<()> {
        self.load()
    }

    fn name(&self) -> &str {
        "EnvironmentConfigProvider"
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}

/// 内存配置提供者
///
/// 用于默认值和测试。
#[derive(Debug, Clone)]
pub struct InMemoryConfigProvider {
    name: String,
    tree: Value,
    priority: i32,
}

impl InMemoryConfigProvider {
    /// 创建空提供者
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tree: Value::Object(Map::new()),
            priority: 0,
        }
    }

    /// 从 JSON 树创建
    pub fn from_value(name: impl Into<String>, tree: Value) -> Self {
        Self {
            name: name.into(),
            tree,
            priority: 0,
        }
    }

    /// 设置优先级
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// 设置键值，中间层级按需创建
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.set(key, value.into());
        self
    }

    /// 设置键值，中间层级按需创建
    pub fn set(&mut self, key: &str, value: Value) {
        let mut parts = key.split('.').peekable();
        let mut current = &mut self.tree;
        while let Some(part) = parts.next() {
            if !current.is_object() {
                *current = Value::Object(Map::new());
            }
            let Value::Object(map) = current else {
                return;
            };
            if parts.peek().is_none() {
                map.insert(part.to_string(), value);
                return;
            }
            current = map
                .entry(part.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
        }
    }
}

impl ConfigProvider for InMemoryConfigProvider {
    fn get_configuration(&self, key: &str) -> ConfigResult<Value> {
        get_from(&self.tree, key)
    }

    fn contains_key(&self, key: &str) -> bool {
        lookup_path(&self.tree, key).is_some()
    }

    fn get_all_keys(&self) -> Vec<String> {
        collect_keys(&self.tree)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}
