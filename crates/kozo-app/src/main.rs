//! KOZO 无界面驱动程序
//!
//! 读取配置，搭建示例框架，经命令管道依次运行 DivideAtOns 与 MatchProperty，
//! 应用几条显示命令后把 `.inp` 文本写到标准输出。

mod config;

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use tracing_subscriber::FmtSubscriber;

use kozo_core::prelude::*;
use kozo_ui::{
    display, spawn_command, CommandContext, CommandPipeline, CommandRegistry, Selection,
    SharedFrame,
};

use config::AppConfig;

/// 跨度
const SPAN: f64 = 6.0;
/// 层高
const STORY: f64 = 4.0;

/// 两跨门式框架：柱顶之间只有一根通长梁，中柱柱顶是梁的中间节点
fn demo_frame(config: KernelConfig) -> Result<(Frame, ElemId, Vec<ElemId>)> {
    let mut frame = Frame::with_config(config);
    frame.name = "demo".to_string();

    let mut columns = Vec::new();
    for i in 0..3 {
        let x = i as f64 * SPAN;
        let foot = frame.coord_node(x, 0.0, 0.0);
        let top = frame.coord_node(x, 0.0, STORY);
        frame.node_mut(foot)?.set_fix();
        columns.push(frame.add_line_elem([foot, top], 101 + i, Etype::Column, None)?);
    }
    let left = frame.coord_node(0.0, 0.0, STORY);
    let right = frame.coord_node(2.0 * SPAN, 0.0, STORY);
    let girder = frame.add_line_elem([left, right], 201, Etype::Girder, None)?;

    frame.add_sect(Section::new(101, "C1", Etype::Column))?;
    frame.add_sect(Section::new(102, "C2", Etype::Column))?;
    frame.add_sect(Section::new(103, "C3", Etype::Column))?;
    frame.add_sect(Section::new(201, "G1", Etype::Girder))?;
    Ok((frame, girder, columns))
}

async fn run(config: AppConfig) -> Result<()> {
    CommandRegistry::init_global();
    let (frame, girder, columns) = demo_frame(config.kernel)?;
    let frame: SharedFrame = Arc::new(RwLock::new(frame));
    let mut pipeline = CommandPipeline::new();

    let lookup = |name: &str| {
        CommandRegistry::global()
            .and_then(|r| r.read().ok().and_then(|r| r.lookup(name)))
            .with_context(|| format!("unknown command {}", name))
    };

    // 中柱柱顶处分割通长梁
    let handle = spawn_command(
        &mut pipeline,
        lookup("DO")?,
        CommandContext::new(frame.clone(), Selection::new()),
    )?;
    pipeline.send_elem(girder).await?;
    pipeline.end_command()?;
    let report = handle.await??;
    info!("divided girder into {} pieces", report.created.len() + 1);

    // 其余柱改为第一根柱的断面
    let mut selection = Selection::new();
    selection.merge_select_elems(&columns[..1], false);
    let handle = spawn_command(
        &mut pipeline,
        lookup("MATCHPROP")?,
        CommandContext::new(frame.clone(), selection),
    )?;
    for &column in &columns[1..] {
        pipeline.send_elem(column).await?;
    }
    pipeline.end_command()?;
    let report = handle.await??;
    info!("matched {} columns", report.modified.len());

    let mut frame = frame.write().await;
    let mut selection = Selection::new();
    for line in ["elemcode", "sectcode", "fence x 3", "period++"] {
        if let Err(e) = display::execute(line, &mut frame, &mut selection) {
            warn!("{}: {}", line, e);
        }
    }
    info!("fence selected {:?}", selection.elems());

    let stdout = std::io::stdout();
    kozo_file::write_inp(&frame, &mut stdout.lock())?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let path = AppConfig::locate(std::env::args().nth(1));
    let loaded = match &path {
        Some(p) => AppConfig::load(p)?,
        None => None,
    };
    let config = loaded.clone().unwrap_or_default();

    // 初始化日志
    tracing::subscriber::set_global_default(
        FmtSubscriber::builder()
            .with_max_level(config.level()?)
            .with_writer(std::io::stderr)
            .finish(),
    )?;

    match (&path, loaded) {
        (Some(p), None) => warn!("{} not found, using defaults", p.display()),
        (Some(p), Some(_)) => info!("config loaded from {}", p.display()),
        (None, _) => info!("no config given, using defaults"),
    }
    info!("Starting KOZO...");

    run(config).await
}
