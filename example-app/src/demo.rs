//! 示例命令和中间件

use crate::commands::{
    sub_command, CommandError, CommandExecutor, CommandManager, CommandManagerHandler,
    CommandMiddleware, CommandMiddlewareHandler, CommandService, Middleware, SubCommands,
};
use config_impl::ConfigurationEnvironment;
use di_abstractions::RegistryHandle;
use di_impl::StaticDiscovery;
use infrastructure_composition::Component;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::warn;

/// 问候命令
#[derive(Component)]
#[component(marker = CommandManager { name: "greet" }, capability = dyn CommandExecutor)]
pub struct GreetCommand {
    #[component(property = "greeting.text", default)]
    text: String,
}

impl CommandExecutor for GreetCommand {
    fn execute(&self, args: &[&str], sender: &str) -> Result<String, CommandError> {
        let target = args.first().copied().unwrap_or(sender);
        Ok(format!("{}, {}", self.text, target))
    }
}

/// 管理命令，本身只列出子命令
#[derive(Component)]
#[component(
    marker = CommandManager { name: "admin" },
    marker = SubCommands(vec![
        sub_command::<StatusCommand>("status"),
        sub_command::<ReloadCommand>("reload"),
    ]),
    capability = dyn CommandExecutor
)]
pub struct AdminCommand;

impl CommandExecutor for AdminCommand {
    fn execute(&self, args: &[&str], _sender: &str) -> Result<String, CommandError> {
        match args.first() {
            Some(unknown) => Err(CommandError::UnknownCommand(format!("admin {unknown}"))),
            None => Ok("用法: admin <status|reload>".to_string()),
        }
    }
}

/// 状态子命令
#[derive(Component)]
pub struct StatusCommand {
    registry: Arc<RegistryHandle>,
}

impl CommandExecutor for StatusCommand {
    fn execute(&self, _args: &[&str], _sender: &str) -> Result<String, CommandError> {
        Ok(format!("已注册 {} 个组件实例", self.registry.len()))
    }
}

/// 重新加载配置子命令
#[derive(Component)]
pub struct ReloadCommand {
    environment: Arc<ConfigurationEnvironment>,
}

impl CommandExecutor for ReloadCommand {
    fn execute(&self, _args: &[&str], sender: &str) -> Result<String, CommandError> {
        self.environment
            .reload()
            .map_err(|err| CommandError::Failed(err.to_string()))?;
        Ok(format!("{sender} 重新加载了配置"))
    }
}

/// 命令审计记录
#[derive(Component)]
pub struct AuditLog {
    #[component(default)]
    entries: Mutex<Vec<String>>,
}

impl AuditLog {
    /// 已记录的条目
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }
}

/// 审计中间件，记录所有命令
#[derive(Component)]
#[component(marker = Middleware { order: 0 }, capability = dyn CommandMiddleware)]
pub struct AuditMiddleware {
    log: Arc<AuditLog>,
}

impl CommandMiddleware for AuditMiddleware {
    fn on_command(&self, command: &str, sender: &str) -> bool {
        self.log.entries.lock().push(format!("{sender}: {command}"));
        true
    }
}

/// 拦截被封禁的发送者
#[derive(Component)]
#[component(marker = Middleware { order: 10 }, capability = dyn CommandMiddleware)]
pub struct BanMiddleware {
    #[component(property = "commands.banned", default)]
    banned: Vec<String>,
}

impl CommandMiddleware for BanMiddleware {
    fn on_command(&self, command: &str, sender: &str) -> bool {
        let allowed = !self.banned.iter().any(|banned| banned == sender);
        if !allowed {
            warn!("拦截 {} 的命令 {}", sender, command);
        }
        allowed
    }
}

/// 示例组件
///
/// 子命令必须排在所属管理器之前。
pub fn discovery() -> StaticDiscovery {
    StaticDiscovery::new("example-commands")
        .with::<CommandService>()
        .with::<CommandManagerHandler>()
        .with::<CommandMiddlewareHandler>()
        .with::<AuditLog>()
        .with::<AuditMiddleware>()
        .with::<BanMiddleware>()
        .with::<GreetCommand>()
        .with::<StatusCommand>()
        .with::<ReloadCommand>()
        .with::<AdminCommand>()
}
