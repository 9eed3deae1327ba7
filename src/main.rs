use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use teeforge::script::{Script, ScriptRunner};
use teeforge::{DesignSession, EditorConfig, Notice};

#[derive(Parser)]
#[command(name = "teeforge", version, about = "Compose t-shirt mockups and export print-ready PDFs")]
struct Cli {
    /// Config file (defaults to <config_dir>/teeforge/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay an editing script
    Run {
        script: PathBuf,
        /// Write the final surface as PNG
        #[arg(long)]
        png: Option<PathBuf>,
        /// Directory for exported PDFs
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Print notices as JSON lines
        #[arg(long)]
        json: bool,
        /// Seconds to wait for decodes and exports
        #[arg(long, default_value_t = 60)]
        timeout: u64,
    },
    /// List garment colors
    Palette,
    /// Print the effective configuration
    Config,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = EditorConfig::load(cli.config.as_deref());

    match cli.command {
        Commands::Run {
            script,
            png,
            output_dir,
            json,
            timeout,
        } => {
            if output_dir.is_some() {
                config.export.output_dir = output_dir;
            }
            run_script(config, &script, png.as_deref(), json, Duration::from_secs(timeout))
        }
        Commands::Palette => {
            for swatch in &config.garments {
                let marker = if swatch.key == config.default_garment { " (default)" } else { "" };
                println!("{:<8} {}{}", swatch.key, swatch.fill, marker);
            }
            Ok(())
        }
        Commands::Config => {
            let raw = toml::to_string_pretty(&config).with_context(|| "failed to serialize config")?;
            print!("{raw}");
            Ok(())
        }
    }
}

fn run_script(config: EditorConfig, path: &Path, png: Option<&Path>, json: bool, timeout: Duration) -> Result<()> {
    let script = Script::load(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut session = DesignSession::new(config)?;

    let report = ScriptRunner::new(&mut session, base_dir, timeout).run(&script)?;
    for notice in &report.notices {
        print_notice(notice, json)?;
    }
    log::info!(
        "Ran {} step(s), {} rejected",
        report.steps_run,
        report.rejected
    );

    if let Some(out) = png {
        let bytes = teeforge::export::encode_png(session.surface())?;
        std::fs::write(out, bytes).with_context(|| format!("failed to write {}", out.display()))?;
        if !json {
            println!("Surface written to {}", out.display());
        }
    }
    Ok(())
}

fn print_notice(notice: &Notice, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(notice)?);
        return Ok(());
    }
    match notice {
        Notice::Info(message) => println!("[info] {message}"),
        Notice::Error(message) => eprintln!("[error] {message}"),
    }
    Ok(())
}
