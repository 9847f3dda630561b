//! 构造参数描述与实参
//!
//! 描述构造函数的每个参数应当如何取值，并在调用工厂函数时以类型安全的方式取回实参。

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::errors::{DependencyError, DependencyResult};
use crate::markers::Property;
use crate::metadata::{Marker, TypeInfo};

/// 注入到构造参数中的值
pub type InjectedValue = Arc<dyn Any + Send + Sync>;

/// 零值工厂，为空占位符和可选参数提供类型默认值
pub type ValueFactory = Arc<dyn Fn() -> InjectedValue + Send + Sync>;

/// 把外部配置的 JSON 值解码为参数类型
pub type JsonDecoder =
    Arc<dyn Fn(serde_json::Value) -> Result<InjectedValue, serde_json::Error> + Send + Sync>;

/// 参数注入方式
#[derive(Debug, Clone)]
pub enum Injection {
    /// 普通依赖，从注册表中取得
    Component,
    /// 带标记的参数，由支持该标记的处理器提供值
    Marked(Marker),
    /// 调用方上下文，只接受调用方显式提供的值
    Context,
    /// 可选参数，缺失时使用零值
    Optional,
}

/// 构造参数描述
#[derive(Clone)]
pub struct ParameterDescriptor {
    type_info: TypeInfo,
    injection: Injection,
    zero: Option<ValueFactory>,
    decoder: Option<JsonDecoder>,
}

impl ParameterDescriptor {
    fn new(type_info: TypeInfo, injection: Injection) -> Self {
        Self {
            type_info,
            injection,
            zero: None,
            decoder: None,
        }
    }

    /// 依赖组件参数
    pub fn component<T: Any + Send + Sync>() -> Self {
        Self::new(TypeInfo::of::<T>(), Injection::Component)
    }

    /// 带任意标记的参数
    pub fn marked<T: Any + Send + Sync>(marker: Marker) -> Self {
        Self::new(TypeInfo::of::<T>(), Injection::Marked(marker))
    }

    /// 配置属性参数，值从配置中读取并解码为 `T`
    pub fn property<T>(key: impl Into<String>) -> Self
    where
        T: DeserializeOwned + Any + Send + Sync,
    {
        let mut descriptor = Self::marked::<T>(Marker::new(Property::new(key)));
        descriptor.decoder = Some(Arc::new(|value: serde_json::Value| {
            serde_json::from_value::<T>(value).map(|decoded| Arc::new(decoded) as InjectedValue)
        }));
        descriptor
    }

    /// 可选参数，缺失时使用 `T::default()`
    pub fn optional<T: Default + Any + Send + Sync>() -> Self {
        Self::optional_with::<T>(Self::zero_of::<T>())
    }

    /// 可选参数，缺失时使用给定的零值工厂
    pub fn optional_with<T: Any + Send + Sync>(zero: ValueFactory) -> Self {
        let mut descriptor = Self::new(TypeInfo::of::<T>(), Injection::Optional);
        descriptor.zero = Some(zero);
        descriptor
    }

    /// 调用方上下文参数
    pub fn context<T: Any + Send + Sync>() -> Self {
        Self::new(TypeInfo::of::<T>(), Injection::Context)
    }

    /// `T::default()` 的零值工厂
    pub fn zero_of<T: Default + Any + Send + Sync>() -> ValueFactory {
        Arc::new(|| Arc::new(T::default()) as InjectedValue)
    }

    /// 设置零值工厂
    #[must_use]
    pub fn with_zero_value(mut self, zero: ValueFactory) -> Self {
        self.zero = Some(zero);
        self
    }

    /// 以 `T::default()` 作为零值
    #[must_use]
    pub fn with_default<T: Default + Any + Send + Sync>(self) -> Self {
        self.with_zero_value(Self::zero_of::<T>())
    }

    /// 参数声明类型
    pub fn type_info(&self) -> TypeInfo {
        self.type_info
    }

    /// 注入方式
    pub fn injection(&self) -> &Injection {
        &self.injection
    }

    /// 参数携带的标记
    pub fn marker(&self) -> Option<&Marker> {
        match &self.injection {
            Injection::Marked(marker) => Some(marker),
            _ => None,
        }
    }

    /// 生成零值，没有零值工厂时返回 `None`
    pub fn zero_value(&self) -> Option<InjectedValue> {
        self.zero.as_ref().map(|zero| zero())
    }

    /// 是否可以从 JSON 解码
    pub fn is_decodable(&self) -> bool {
        self.decoder.is_some()
    }

    /// 把 JSON 值解码为参数类型，没有解码器时返回 `None`
    pub fn decode(&self, value: serde_json::Value) -> Option<Result<InjectedValue, serde_json::Error>> {
        self.decoder.as_ref().map(|decoder| decoder(value))
    }

    /// 是否计入依赖树
    ///
    /// 只有普通依赖参数参与依赖树计算。
    pub fn is_dependency(&self) -> bool {
        matches!(self.injection, Injection::Component)
    }
}

impl fmt::Debug for ParameterDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterDescriptor")
            .field("type", &self.type_info.name)
            .field("injection", &self.injection)
            .field("has_zero", &self.zero.is_some())
            .field("decodable", &self.decoder.is_some())
            .finish()
    }
}

/// 已解析的构造实参
///
/// 顺序与构造函数的参数描述一一对应。
#[derive(Clone)]
pub struct Arguments {
    owner: TypeInfo,
    values: Vec<InjectedValue>,
}

impl Arguments {
    /// 创建实参列表
    pub fn new(owner: TypeInfo, values: Vec<InjectedValue>) -> Self {
        Self { owner, values }
    }

    /// 实参个数
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// 是否没有实参
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 所属组件类型
    pub fn owner(&self) -> TypeInfo {
        self.owner
    }

    /// 原始实参
    pub fn values(&self) -> &[InjectedValue] {
        &self.values
    }

    /// 取出全部原始实参
    pub fn into_values(self) -> Vec<InjectedValue> {
        self.values
    }

    /// 以共享引用取得第 `index` 个实参
    pub fn component<T: Any + Send + Sync>(&self, index: usize) -> DependencyResult<Arc<T>> {
        let value = self.raw(index)?;
        Arc::clone(value)
            .downcast::<T>()
            .map_err(|_| self.mismatch::<T>(index))
    }

    /// 以克隆值取得第 `index` 个实参
    pub fn value<T: Any + Send + Sync + Clone>(&self, index: usize) -> DependencyResult<T> {
        self.raw(index)?
            .downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| self.mismatch::<T>(index))
    }

    fn raw(&self, index: usize) -> DependencyResult<&InjectedValue> {
        self.values.get(index).ok_or_else(|| DependencyError::ArgumentMismatch {
            type_name: self.owner.name.to_string(),
            index,
            expected: format!("共 {} 个实参", self.values.len()),
        })
    }

    fn mismatch<T>(&self, index: usize) -> DependencyError {
        DependencyError::ArgumentMismatch {
            type_name: self.owner.name.to_string(),
            index,
            expected: std::any::type_name::<T>().to_string(),
        }
    }
}

impl fmt::Debug for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arguments")
            .field("owner", &self.owner.name)
            .field("len", &self.values.len())
            .finish()
    }
}
