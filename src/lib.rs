// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod logging;
pub mod pipeline;
pub mod serve;
pub mod types;
pub mod watch;

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::{default_config_path, load_or_default};
use crate::dag::{Registry, parallel, series, task};
use crate::engine::Runner;
use crate::pipeline::{Clean, CopyAssets, PipelineEnv, Scripts, Styles, Vendor};
use crate::serve::{DeployServer, DevServer, ReloadChannel};
use crate::watch::WatchFiles;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the task registry and runner
/// - the live-reload channel shared by all tasks
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let explicit_config = args.config.is_some();
    let config_path = args
        .config
        .as_deref()
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);
    let cfg = load_or_default(&config_path, explicit_config)?;

    let registry = builtin_registry();

    if args.list {
        print_listing(&registry);
        return Ok(());
    }

    let root = resolve_root(
        args.root.as_deref(),
        cfg.project().root.as_deref(),
        &config_path,
    );
    info!(root = ?root, target = %args.target, "assetpipe starting");

    let env = PipelineEnv::new(root, cfg, ReloadChannel::new());
    let runner = Runner::new(registry, env)?;

    tokio::select! {
        result = runner.run(&args.target) => {
            result?;
            info!("'{}' completed", args.target);
        }
        () = shutdown_signal() => {
            info!("interrupted, shutting down");
        }
    }
    Ok(())
}

/// The built-in tasks and composite targets.
///
/// ```text
/// dist    = series(clean, vendor)
/// build   = series(dist, parallel(img, svg, css, js))
/// watch   = series(build, parallel(watch-files, serve))
/// deploy  = series(build, start-server)
/// default = build
/// ```
pub fn builtin_registry() -> Registry {
    let mut registry = Registry::new();
    registry
        .register_task("clean", Clean)
        .register_task("vendor", Vendor)
        .register_task("img", CopyAssets::images())
        .register_task("svg", CopyAssets::svg())
        .register_task("css", Styles)
        .register_task("js", Scripts)
        .register_task("watch-files", WatchFiles)
        .register_task("serve", DevServer)
        .register_task("start-server", DeployServer::default())
        .register_target("dist", series([task("clean"), task("vendor")]))
        .register_target(
            "build",
            series([
                task("dist"),
                parallel([task("img"), task("svg"), task("css"), task("js")]),
            ]),
        )
        .register_target(
            "watch",
            series([task("build"), parallel([task("watch-files"), task("serve")])]),
        )
        .register_target("deploy", series([task("build"), task("start-server")]))
        .register_target("default", task("build"));
    registry
}

/// Pick the project root: `--root`, else `[project].root` relative to the
/// config file's directory, else that directory, else `.`.
fn resolve_root(cli_root: Option<&str>, config_root: Option<&str>, config_path: &Path) -> PathBuf {
    if let Some(root) = cli_root {
        return PathBuf::from(root);
    }

    let config_dir = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    match config_root {
        Some(root) => config_dir.join(root),
        None => config_dir,
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for Ctrl+C: {err}");
        std::future::pending::<()>().await;
    }
}

fn print_listing(registry: &Registry) {
    println!("tasks:");
    for name in registry.task_names() {
        println!("  - {name}");
    }
    println!();
    println!("targets:");
    for (name, target) in registry.targets() {
        println!("  - {name} = {target}");
    }

    debug!("listing complete (no execution)");
}
