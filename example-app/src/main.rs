//! # 示例应用程序
//!
//! 演示如何用组件容器装配一个命令服务：命令和中间件都是派生组件，
//! 由构造后处理器登记到命令服务，属性来自配置文件、环境变量和默认值。

mod commands;
mod demo;

use anyhow::Context;
use clap::Parser;
use commands::CommandService;
use demo::AuditLog;
use infrastructure_composition::{ApplicationBuilder, LoggingConfig};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "example-app")]
#[command(about = "组件容器示例应用")]
struct Args {
    /// 配置文件路径
    #[arg(short, long, default_value = "config/app.toml")]
    config: String,

    /// 环境变量前缀
    #[arg(long, default_value = "DEMO")]
    env_prefix: String,

    /// 输出 JSON 格式日志
    #[arg(long)]
    json_logs: bool,

    /// 输出调试日志
    #[arg(short, long)]
    verbose: bool,

    /// 要执行的命令，格式为 `发送者:命令`
    commands: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut logging = if args.json_logs {
        LoggingConfig::production()
    } else {
        LoggingConfig::development()
    };
    if args.verbose {
        logging.filter = "debug".to_string();
    }

    let mut builder = ApplicationBuilder::new()
        .with_logging(logging)
        .with_default_config(json!({
            "greeting": { "text": "你好" },
            "commands": { "prefix": "/", "banned": [] }
        }))
        .add_config_env_vars(args.env_prefix.as_str())?;
    if Path::new(&args.config).exists() {
        builder = builder.add_config_file(&args.config)?;
    }
    let application = builder
        .add_discovery(demo::discovery())
        .build()
        .context("应用启动失败")?;

    let stats = application.stats();
    info!(
        "启动完成: {} 个定义, {} 个组件, {} 个处理器组件",
        stats.definitions, stats.components_constructed, stats.handler_components
    );

    let service = application.get::<CommandService>()?;
    println!("可用命令: {}", service.command_names().join(", "));

    let lines = if args.commands.is_empty() {
        vec!["alice:/greet".to_string(), "bob:/admin status".to_string()]
    } else {
        args.commands
    };

    let application = Arc::new(application);
    let mut tasks = Vec::with_capacity(lines.len());
    for line in lines {
        let application = Arc::clone(&application);
        tasks.push(tokio::spawn(async move {
            let (sender, command) = line.split_once(':').unwrap_or(("console", line.as_str()));
            let service = application.get::<CommandService>()?;
            let output = service.dispatch(command, sender);
            anyhow::Ok((line.clone(), output))
        }));
    }
    for task in tasks {
        let (line, output) = task.await??;
        match output {
            Ok(output) => println!("{line} => {output}"),
            Err(err) => println!("{line} => 错误: {err}"),
        }
    }

    for entry in application.get::<AuditLog>()?.entries() {
        println!("审计: {entry}");
    }

    match Arc::try_unwrap(application) {
        Ok(application) => application.shutdown(),
        Err(_) => warn!("应用仍被引用，跳过关闭"),
    }
    Ok(())
}
