//! 内置标记
//!
//! 容器自身会识别的标记载荷，其他标记由应用自行定义。

/// 配置属性标记
///
/// 标注在构造参数上，表示该参数的值来自配置环境中的 `key`。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Property {
    /// 配置键，使用 `.` 分隔层级
    pub key: String,
}

impl Property {
    /// 创建配置属性标记
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}
