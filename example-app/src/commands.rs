//! 命令服务
//!
//! 命令管理器和中间件都是普通组件，由构造后处理器在创建时登记到 [`CommandService`]。

use di_abstractions::{ComponentRegistry, PostConstructHandler, RegistryHandle, TypedComponentRegistry};
use infrastructure_common::{
    ComponentDefinition, ComponentInstance, DependencyError, DependencyResult, MarkerKind,
    TypeInfo,
};
use infrastructure_composition::Component;
use parking_lot::RwLock;
use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// 命令执行接口
pub trait CommandExecutor: Send + Sync {
    /// 执行命令，`args` 不含命令名
    fn execute(&self, args: &[&str], sender: &str) -> Result<String, CommandError>;
}

/// 命令中间件接口
pub trait CommandMiddleware: Send + Sync {
    /// 命令执行前调用，返回 `false` 拦截该命令
    fn on_command(&self, command: &str, sender: &str) -> bool;
}

/// 命令管理器标记
#[derive(Debug, Clone)]
pub struct CommandManager {
    /// 命令名
    pub name: &'static str,
}

/// 中间件标记
#[derive(Debug, Clone)]
pub struct Middleware {
    /// 执行顺序，小的先执行
    pub order: i32,
}

/// 子命令列表标记，子命令组件会被所属管理器接管并从注册表移除
pub struct SubCommands(pub Vec<SubCommandRef>);

/// 对子命令组件的引用
#[derive(Clone, Copy)]
pub struct SubCommandRef {
    name: &'static str,
    type_info: TypeInfo,
    resolve: fn(&dyn ComponentRegistry) -> Option<Arc<dyn CommandExecutor>>,
}

/// 以 `name` 引用子命令组件 `T`
pub fn sub_command<T: CommandExecutor + Any>(name: &'static str) -> SubCommandRef {
    SubCommandRef {
        name,
        type_info: TypeInfo::of::<T>(),
        resolve: |registry| {
            registry
                .get_nullable_typed::<T>()
                .map(|command| command as Arc<dyn CommandExecutor>)
        },
    }
}

/// 命令错误
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("命令为空")]
    Empty,

    #[error("未知命令: {0}")]
    UnknownCommand(String),

    #[error("命令 {command} 被中间件 {middleware} 拦截")]
    Blocked { command: String, middleware: String },

    #[error("命令重复注册: {0}")]
    DuplicateCommand(String),

    #[error("命令执行失败: {0}")]
    Failed(String),
}

struct RegisteredCommand {
    executor: Arc<dyn CommandExecutor>,
    sub_commands: BTreeMap<&'static str, Arc<dyn CommandExecutor>>,
}

struct RegisteredMiddleware {
    name: String,
    order: i32,
    middleware: Arc<dyn CommandMiddleware>,
}

/// 命令服务
#[derive(Component)]
pub struct CommandService {
    #[component(property = "commands.prefix", default)]
    prefix: String,
    #[component(default)]
    commands: RwLock<BTreeMap<&'static str, RegisteredCommand>>,
    #[component(default)]
    middlewares: RwLock<Vec<RegisteredMiddleware>>,
}

impl CommandService {
    /// 登记命令管理器
    pub fn register_command(
        &self,
        name: &'static str,
        executor: Arc<dyn CommandExecutor>,
        sub_commands: BTreeMap<&'static str, Arc<dyn CommandExecutor>>,
    ) -> Result<(), CommandError> {
        let mut commands = self.commands.write();
        if commands.contains_key(name) {
            return Err(CommandError::DuplicateCommand(name.to_string()));
        }
        info!("登记命令: {} ({} 个子命令)", name, sub_commands.len());
        commands.insert(
            name,
            RegisteredCommand {
                executor,
                sub_commands,
            },
        );
        Ok(())
    }

    /// 登记中间件
    pub fn register_middleware(
        &self,
        name: impl Into<String>,
        order: i32,
        middleware: Arc<dyn CommandMiddleware>,
    ) {
        let name = name.into();
        info!("登记中间件: {} (顺序 {})", name, order);
        let mut middlewares = self.middlewares.write();
        middlewares.push(RegisteredMiddleware {
            name,
            order,
            middleware,
        });
        middlewares.sort_by_key(|registered| registered.order);
    }

    /// 已登记的命令名
    pub fn command_names(&self) -> Vec<&'static str> {
        self.commands.read().keys().copied().collect()
    }

    /// 子命令名
    pub fn sub_command_names(&self, command: &str) -> Vec<&'static str> {
        self.commands
            .read()
            .get(command)
            .map(|registered| registered.sub_commands.keys().copied().collect())
            .unwrap_or_default()
    }

    /// 解析并执行一行命令
    pub fn dispatch(&self, line: &str, sender: &str) -> Result<String, CommandError> {
        let line = line.trim();
        let line = line.strip_prefix(self.prefix.as_str()).unwrap_or(line);
        let mut parts = line.split_whitespace();
        let name = parts.next().ok_or(CommandError::Empty)?;
        let args: Vec<&str> = parts.collect();

        // 中间件在锁外执行
        let middlewares: Vec<(String, Arc<dyn CommandMiddleware>)> = self
            .middlewares
            .read()
            .iter()
            .map(|registered| (registered.name.clone(), Arc::clone(&registered.middleware)))
            .collect();
        for (middleware_name, middleware) in middlewares {
            if !middleware.on_command(name, sender) {
                return Err(CommandError::Blocked {
                    command: name.to_string(),
                    middleware: middleware_name,
                });
            }
        }

        let (executor, args) = {
            let commands = self.commands.read();
            let registered = commands
                .get(name)
                .ok_or_else(|| CommandError::UnknownCommand(name.to_string()))?;
            let sub_command = args.split_first().and_then(|(first, rest)| {
                registered
                    .sub_commands
                    .get(*first)
                    .map(|sub_command| (Arc::clone(sub_command), rest.to_vec()))
            });
            sub_command.unwrap_or_else(|| (Arc::clone(&registered.executor), args))
        };
        debug!("执行命令: {} {:?} (发送者 {})", name, args, sender);
        executor.execute(&args, sender)
    }
}

fn rejected(handler: &str, definition: &ComponentDefinition, message: impl Into<String>) -> DependencyError {
    DependencyError::handler_rejected(handler, &definition.type_info(), message)
}

/// 命令管理器处理器
///
/// 登记带 [`CommandManager`] 标记的组件，并接管 [`SubCommands`] 列出的子命令。
#[derive(Component)]
#[component(capability = dyn PostConstructHandler)]
pub struct CommandManagerHandler {
    service: Arc<CommandService>,
    registry: Arc<RegistryHandle>,
}

impl PostConstructHandler for CommandManagerHandler {
    fn supported_markers(&self) -> Vec<MarkerKind> {
        vec![MarkerKind::of::<CommandManager>()]
    }

    fn on_created(
        &self,
        instance: &ComponentInstance,
        definition: &ComponentDefinition,
    ) -> DependencyResult<()> {
        let Some(manager) = definition.marker::<CommandManager>() else {
            return Ok(());
        };
        let executor = definition
            .cast::<dyn CommandExecutor>(instance)
            .ok_or_else(|| rejected(self.name(), definition, "标注了 CommandManager 但没有实现 CommandExecutor"))?;

        let mut sub_commands = BTreeMap::new();
        if let Some(SubCommands(references)) = definition.marker::<SubCommands>() {
            for reference in references {
                let sub_command = (reference.resolve)(self.registry.registry().as_ref()).ok_or_else(|| {
                    rejected(
                        self.name(),
                        definition,
                        format!("子命令 {} 不存在", reference.type_info.short_name()),
                    )
                })?;
                // 子命令只能通过所属管理器访问
                self.registry.unregister(reference.type_info.id);
                sub_commands.insert(reference.name, sub_command);
            }
        }

        self.service
            .register_command(manager.name, executor, sub_commands)
            .map_err(|err| rejected(self.name(), definition, err.to_string()))
    }

    fn name(&self) -> &str {
        "CommandManagerHandler"
    }
}

/// 命令中间件处理器
#[derive(Component)]
#[component(capability = dyn PostConstructHandler)]
pub struct CommandMiddlewareHandler {
    service: Arc<CommandService>,
}

impl PostConstructHandler for CommandMiddlewareHandler {
    fn supported_markers(&self) -> Vec<MarkerKind> {
        vec![MarkerKind::of::<Middleware>()]
    }

    fn on_created(
        &self,
        instance: &ComponentInstance,
        definition: &ComponentDefinition,
    ) -> DependencyResult<()> {
        let order = definition.marker::<Middleware>().map_or(0, |middleware| middleware.order);
        let middleware = definition
            .cast::<dyn CommandMiddleware>(instance)
            .ok_or_else(|| rejected(self.name(), definition, "标注了 Middleware 但没有实现 CommandMiddleware"))?;
        self.service.register_middleware(definition.name(), order, middleware);
        Ok(())
    }

    fn name(&self) -> &str {
        "CommandMiddlewareHandler"
    }
}
