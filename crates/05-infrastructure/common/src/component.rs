//! 组件定义
//!
//! 描述容器如何构造一个组件：构造函数、参数、类型级标记以及能力（capability）转换

use std::any::{Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::errors::{BoxError, DependencyError, DependencyResult};
use crate::injection::{Arguments, ParameterDescriptor};
use crate::metadata::{Marker, MarkerKind, TypeInfo};

/// 已构造的组件实例
pub type ComponentInstance = Arc<dyn Any + Send + Sync>;

/// 类型擦除后的工厂函数
pub type FactoryFn = Arc<dyn Fn(Arguments) -> Result<ComponentInstance, BoxError> + Send + Sync>;

/// 能力转换函数，把擦除的实例转换为 trait 对象
pub type CapabilityCast<D> = Arc<dyn Fn(ComponentInstance) -> Option<Arc<D>> + Send + Sync>;

/// 可注入组件 trait
///
/// 容器通过此 trait 取得组件定义，可以手写，也可以由 `#[derive(Component)]` 生成。
pub trait Injectable: Any + Send + Sync {
    /// 组件定义
    fn definition() -> ComponentDefinition
    where
        Self: Sized;
}

/// 构造函数
#[derive(Clone)]
pub struct Constructor {
    parameters: Vec<ParameterDescriptor>,
    factory: FactoryFn,
}

impl Constructor {
    /// 创建构造函数
    pub fn new(parameters: Vec<ParameterDescriptor>, factory: FactoryFn) -> Self {
        Self {
            parameters,
            factory,
        }
    }

    /// 参数描述
    pub fn parameters(&self) -> &[ParameterDescriptor] {
        &self.parameters
    }

    /// 参数个数
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    /// 调用工厂函数
    pub fn invoke(&self, arguments: Arguments) -> Result<ComponentInstance, BoxError> {
        (self.factory)(arguments)
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructor")
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

/// 组件能力
///
/// 记录组件可以被视作哪个 trait 对象。
#[derive(Clone)]
pub struct Capability {
    target: TypeInfo,
    cast: Arc<dyn Any + Send + Sync>,
}

impl Capability {
    /// 目标 trait 对象类型
    pub fn target(&self) -> TypeInfo {
        self.target
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Capability").field(&self.target.name).finish()
    }
}

/// 组件定义
///
/// 每个类型只推导一次，推导后不可变。
#[derive(Clone)]
pub struct ComponentDefinition {
    type_info: TypeInfo,
    name: String,
    constructors: Vec<Constructor>,
    markers: Vec<Marker>,
    capabilities: Vec<Capability>,
}

impl ComponentDefinition {
    /// 为类型 `T` 创建定义构建器
    pub fn builder<T: Any + Send + Sync>() -> ComponentDefinitionBuilder<T> {
        ComponentDefinitionBuilder::new()
    }

    /// 组件类型
    pub fn type_info(&self) -> TypeInfo {
        self.type_info
    }

    /// 组件类型ID
    pub fn type_id(&self) -> TypeId {
        self.type_info.id
    }

    /// 组件名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 全部构造函数
    pub fn constructors(&self) -> &[Constructor] {
        &self.constructors
    }

    /// 类型级标记
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// 读取指定载荷类型的类型级标记
    pub fn marker<M: Any + Send + Sync>(&self) -> Option<&M> {
        self.markers.iter().find_map(Marker::downcast_ref::<M>)
    }

    /// 是否带有指定种类的标记
    pub fn has_marker(&self, kind: MarkerKind) -> bool {
        self.markers.iter().any(|marker| marker.kind() == kind)
    }

    /// 全部能力
    pub fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    /// 是否声明了转换为 `D` 的能力
    pub fn has_capability<D: ?Sized + 'static>(&self) -> bool {
        let target = TypeInfo::of::<D>();
        self.capabilities.iter().any(|c| c.target == target)
    }

    /// 把实例转换为 trait 对象 `D`
    ///
    /// 未声明该能力或实例类型不符时返回 `None`。
    pub fn cast<D: ?Sized + 'static>(&self, instance: &ComponentInstance) -> Option<Arc<D>> {
        let target = TypeInfo::of::<D>();
        self.capabilities
            .iter()
            .find(|c| c.target == target)
            .and_then(|c| c.cast.downcast_ref::<CapabilityCast<D>>())
            .and_then(|cast| cast(Arc::clone(instance)))
    }

    /// 选择可用的构造函数
    ///
    /// 只有一个构造函数时使用它，否则使用无参构造函数。
    pub fn resolvable_constructor(&self) -> DependencyResult<&Constructor> {
        if let [only] = self.constructors.as_slice() {
            return Ok(only);
        }
        self.constructors
            .iter()
            .find(|constructor| constructor.arity() == 0)
            .ok_or_else(|| DependencyError::AmbiguousConstructor {
                type_name: self.type_info.name.to_string(),
                constructors: self.constructors.len(),
            })
    }

    /// 依赖的组件类型，按参数顺序
    pub fn dependencies(&self) -> DependencyResult<Vec<TypeInfo>> {
        Ok(self
            .resolvable_constructor()?
            .parameters()
            .iter()
            .filter(|parameter| parameter.is_dependency())
            .map(ParameterDescriptor::type_info)
            .collect())
    }
}

impl fmt::Debug for ComponentDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDefinition")
            .field("type", &self.type_info.name)
            .field("name", &self.name)
            .field("constructors", &self.constructors)
            .field("markers", &self.markers)
            .field("capabilities", &self.capabilities)
            .finish()
    }
}

/// 组件定义构建器
pub struct ComponentDefinitionBuilder<T> {
    name: Option<String>,
    constructors: Vec<Constructor>,
    markers: Vec<Marker>,
    capabilities: Vec<Capability>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> ComponentDefinitionBuilder<T> {
    fn new() -> Self {
        Self {
            name: None,
            constructors: Vec::new(),
            markers: Vec::new(),
            capabilities: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// 设置组件名称，默认为类型短名称
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// 添加构造函数
    #[must_use]
    pub fn constructor<F>(mut self, parameters: Vec<ParameterDescriptor>, factory: F) -> Self
    where
        F: Fn(Arguments) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        let factory: FactoryFn = Arc::new(move |arguments: Arguments| {
            factory(arguments).map(|value| Arc::new(value) as ComponentInstance)
        });
        self.constructors.push(Constructor::new(parameters, factory));
        self
    }

    /// 添加无参构造函数
    #[must_use]
    pub fn default_constructor<F>(self, factory: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.constructor(Vec::new(), move |_| Ok(factory()))
    }

    /// 添加类型级标记
    #[must_use]
    pub fn marker<M: Any + Send + Sync>(mut self, payload: M) -> Self {
        self.markers.push(Marker::new(payload));
        self
    }

    /// 声明组件可以视作 trait 对象 `D`
    #[must_use]
    pub fn capability<D, F>(mut self, cast: F) -> Self
    where
        D: ?Sized + 'static,
        F: Fn(Arc<T>) -> Arc<D> + Send + Sync + 'static,
    {
        let erased: CapabilityCast<D> = Arc::new(move |instance: ComponentInstance| {
            instance.downcast::<T>().ok().map(&cast)
        });
        self.capabilities.push(Capability {
            target: TypeInfo::of::<D>(),
            cast: Arc::new(erased),
        });
        self
    }

    /// 生成定义
    pub fn build(self) -> ComponentDefinition {
        let type_info = TypeInfo::of::<T>();
        ComponentDefinition {
            type_info,
            name: self
                .name
                .unwrap_or_else(|| type_info.short_name().to_string()),
            constructors: self.constructors,
            markers: self.markers,
            capabilities: self.capabilities,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Greeter: Send + Sync {
        fn greet(&self) -> String;
    }

    #[derive(Debug)]
    struct English {
        name: String,
    }

    impl Greeter for English {
        fn greet(&self) -> String {
            format!("hello {}", self.name)
        }
    }

    #[derive(Debug)]
    struct Tagged;

    fn english() -> ComponentDefinition {
        ComponentDefinition::builder::<English>()
            .constructor(vec![ParameterDescriptor::component::<String>()], |args| {
                Ok(English {
                    name: args.value::<String>(0)?,
                })
            })
            .marker(Tagged)
            .capability::<dyn Greeter, _>(|this| this as Arc<dyn Greeter>)
            .build()
    }

    #[test]
    fn single_constructor_is_selected() {
        let definition = english();
        assert_eq!(definition.resolvable_constructor().unwrap().arity(), 1);
        assert_eq!(definition.dependencies().unwrap(), vec![TypeInfo::of::<String>()]);
        assert_eq!(definition.name(), "English");
    }

    #[test]
    fn zero_argument_constructor_breaks_ties() {
        let definition = ComponentDefinition::builder::<English>()
            .constructor(vec![ParameterDescriptor::component::<String>()], |args| {
                Ok(English {
                    name: args.value::<String>(0)?,
                })
            })
            .default_constructor(|| English {
                name: "nobody".into(),
            })
            .build();
        assert_eq!(definition.resolvable_constructor().unwrap().arity(), 0);
        assert!(definition.dependencies().unwrap().is_empty());
    }

    #[test]
    fn ambiguous_constructors_are_rejected() {
        let two = ComponentDefinition::builder::<English>()
            .constructor(vec![ParameterDescriptor::component::<String>()], |_| {
                Err("unused".into())
            })
            .constructor(vec![ParameterDescriptor::component::<u8>()], |_| {
                Err("unused".into())
            })
            .build();
        assert!(matches!(
            two.resolvable_constructor(),
            Err(DependencyError::AmbiguousConstructor { constructors: 2, .. })
        ));

        let none = ComponentDefinition::builder::<English>().build();
        assert!(matches!(
            none.resolvable_constructor(),
            Err(DependencyError::AmbiguousConstructor { constructors: 0, .. })
        ));
    }

    #[test]
    fn capability_casts_erased_instance() {
        let definition = english();
        let constructor = definition.resolvable_constructor().unwrap();
        let instance = constructor
            .invoke(Arguments::new(
                definition.type_info(),
                vec![Arc::new(String::from("bob"))],
            ))
            .unwrap();

        assert!(definition.has_capability::<dyn Greeter>());
        let greeter = definition.cast::<dyn Greeter>(&instance).unwrap();
        assert_eq!(greeter.greet(), "hello bob");

        let foreign: ComponentInstance = Arc::new(42_u8);
        assert!(definition.cast::<dyn Greeter>(&foreign).is_none());
        assert!(definition.cast::<dyn fmt::Debug>(&instance).is_none());
    }

    #[test]
    fn type_markers_are_queryable() {
        let definition = english();
        assert!(definition.has_marker(MarkerKind::of::<Tagged>()));
        assert!(definition.marker::<Tagged>().is_some());
        assert!(definition.marker::<String>().is_none());
    }
}
