//! Application flow.
//! Loads/merges config, initializes logging, installs the signal handler,
//! builds the planned renames, checks them, and runs the orchestrator.

use anyhow::{Result, anyhow, bail};
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info};

use bulk_rename::cli::Args;
use bulk_rename::config::{CONFIG_ENV, template_config};
use bulk_rename::fs_ops::io_error_with_help;
use bulk_rename::output as out;
use bulk_rename::{
    Config, LocalFs, Orchestrator, UndoAction, UndoStack, default_config_path, schedule, shutdown,
};

use crate::logging::init_tracing;

/// Run the CLI application.
pub fn run(args: Args) -> Result<()> {
    // Handle --print-config before logging init
    if args.print_config {
        print_config();
        return Ok(());
    }

    // Build config (may read XML). CLI args override config values.
    let mut cfg = Config::load()?;
    args.apply_overrides(&mut cfg);
    cfg.validate()?;

    // Initialize logging and capture the guard so we can drop it on signal
    let guard_opt = init_tracing(cfg.log_level, cfg.log_file.as_deref(), args.json).map_err(|e| {
        out::print_error(&format!("Failed to initialize logging: {}", e));
        e
    })?;

    // Guard needs to be dropped on SIGINT to flush logs
    let guard_slot = Arc::new(Mutex::new(guard_opt));
    {
        let guard_slot = Arc::clone(&guard_slot);
        ctrlc::set_handler(move || {
            shutdown::request();
            out::print_warn("Received interrupt; letting in-flight renames finish...");
            if let Ok(mut g) = guard_slot.lock() {
                let _ = g.take(); // drop guard here to flush tracing_appender
            }
        })
        .map_err(|e| anyhow!("failed to install signal handler: {e}"))?;
    }

    debug!("Starting bulk_rename: {:?}", args);

    let result = rename(&args, &cfg);
    if let Err(e) = &result {
        error!(error = %e, "bulk_rename failed");
    }

    // Ensure logs are flushed before exit
    if let Ok(mut g) = guard_slot.lock() {
        let _ = g.take();
    }

    result
}

fn print_config() {
    if let Ok(cfg_env) = std::env::var(CONFIG_ENV) {
        out::print_info(&format!("Using {CONFIG_ENV} (explicit):\n  {}\n", cfg_env));
        out::print_info(&format!("To override, unset {CONFIG_ENV} or set it to another file."));
        return;
    }
    match default_config_path() {
        Some(p) => {
            out::print_info(&format!("Default bulk_rename config path:\n  {}\n", p.display()));
            if p.exists() {
                out::print_info("A config file already exists at that location.");
            } else {
                out::print_info("No config file exists there yet. Example:\n");
                out::print_user(&template_config());
            }
        }
        None => out::print_error("Could not determine a default config path"),
    }
}

fn rename(args: &Args, cfg: &Config) -> Result<()> {
    let dir = match &args.directory {
        Some(d) => d.clone(),
        None => std::env::current_dir().map_err(|e| anyhow!("resolve current directory: {e}"))?,
    };
    let dir = dunce::canonicalize(&dir).map_err(io_error_with_help("open directory", &dir))?;

    let entries = args.entries(&dir)?;
    if entries.is_empty() {
        bail!("nothing to rename: pass OLD NEW pairs or --from-file");
    }

    let fs = Arc::new(LocalFs::new());
    let orch = Orchestrator::with_config(fs.clone(), cfg);

    let checked = orch.check(&entries);
    out::print_check(&entries, &checked);
    if checked.all_unchanged {
        out::print_success("every name is already as requested; nothing to do");
        return Ok(());
    }
    if checked.is_blocking() {
        bail!("refusing to rename: fix the errors above first");
    }
    let two_pass = args.two_pass || checked.requires_two_pass();

    if cfg.dry_run {
        out::print_info(&format!(
            "Dry-run: {} rename(s), {}",
            entries.iter().filter(|e| !e.is_noop()).count(),
            if two_pass { "two-pass" } else { "single pass" }
        ));
        out::print_plan(&schedule(fs.as_ref(), entries));
        return Ok(());
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| anyhow!("start async runtime: {e}"))?;

    runtime.block_on(async {
        let cancel = shutdown::token();
        let results = orch.run(entries, two_pass, &cancel).await;
        out::print_results(&results);
        let mut failed = results.failure_count();

        if args.undo {
            let mut history = UndoStack::new();
            history.push(UndoAction::new(results));
            if let Some(reverted) = history.undo_and_track(&orch, &cancel).await {
                out::print_info("Undo:");
                out::print_results(&reverted);
                failed += reverted.failure_count();
            }
        }

        info!(failed, "bulk_rename finished");
        report(failed)
    })
}

fn report(failed: usize) -> Result<()> {
    if shutdown::is_requested() {
        bail!("interrupted");
    }
    if failed > 0 {
        bail!("{failed} rename(s) failed");
    }
    Ok(())
}

