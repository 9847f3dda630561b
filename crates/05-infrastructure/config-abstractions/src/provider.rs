//! 配置提供者抽象接口

use infrastructure_common::ConfigResult;
use serde_json::Value;

/// 配置提供者 trait
///
/// 定义从不同数据源获取配置的统一接口，键使用 `.` 分隔层级。
pub trait ConfigProvider: Send + Sync {
    /// 获取配置值，不存在时返回 [`ConfigError::KeyNotFound`](infrastructure_common::ConfigError::KeyNotFound)
    fn get_configuration(&self, key: &str) -> ConfigResult<Value>;

    /// 检查配置键是否存在
    fn contains_key(&self, key: &str) -> bool;

    /// 获取所有配置键
    fn get_all_keys(&self) -> Vec<String>;

    /// 重新加载配置
    fn reload(&mut self) -> ConfigResult<()> {
        Ok(())
    }

    /// 获取提供者名称
    fn name(&self) -> &str;

    /// 获取提供者优先级，数值越高越优先
    fn priority(&self) -> i32 {
        0
    }
}

/// 属性解析器 trait
///
/// 在多个提供者之上按优先级解析单个配置键。
pub trait PropertyResolver: Send + Sync {
    /// 获取属性值，所有提供者都没有时返回 `None`
    fn get_property(&self, key: &str) -> Option<Value>;

    /// 属性是否存在
    fn contains_property(&self, key: &str) -> bool {
        self.get_property(key).is_some()
    }
}

/// 在 JSON 树中按 `.` 分隔的路径查找值
pub fn lookup_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(root);
    }
    path.split('.').try_fold(root, |current, part| match current {
        Value::Object(map) => map.get(part),
        Value::Array(items) => part.parse::<usize>().ok().and_then(|index| items.get(index)),
        _ => None,
    })
}

/// 收集 JSON 树中的全部键路径
pub fn collect_keys(root: &Value) -> Vec<String> {
    fn walk(value: &Value, prefix: &str, keys: &mut Vec<String>) {
        if let Value::Object(map) = value {
            for (key, nested) in map {
                let full_key = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                keys.push(full_key.clone());
                walk(nested, &full_key, keys);
            }
        }
    }

    let mut keys = Vec::new();
    walk(root, "", &mut keys);
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lookup_walks_nested_objects_and_arrays() {
        let root = json!({ "server": { "port": 8080, "hosts": ["a", "b"] } });
        assert_eq!(lookup_path(&root, "server.port"), Some(&json!(8080)));
        assert_eq!(lookup_path(&root, "server.hosts.1"), Some(&json!("b")));
        assert!(lookup_path(&root, "server.missing").is_none());
        assert!(lookup_path(&root, "server.port.deeper").is_none());
    }

    #[test]
    fn keys_include_intermediate_sections() {
        let root = json!({ "a": { "b": 1 }, "c": true });
        let mut keys = collect_keys(&root);
        keys.sort();
        assert_eq!(keys, vec!["a", "a.b", "c"]);
    }
}
