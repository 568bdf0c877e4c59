mod cli;

use vcompress::{app, config};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use vc_av::{LocalStorage, ToolRegistry};
use vc_core::{CompressionConfig, OutputFormat, PresetName};
use vc_pipeline::{OutputDirectory, ProcessReport, Upload};

/// Request options from the command line; unset values come from `[defaults]`.
struct CompressArgs {
    files: Vec<PathBuf>,
    preset: Option<PresetName>,
    resolutions: Vec<String>,
    frame_rate: Option<u32>,
    format: Option<OutputFormat>,
    no_audio_quality: bool,
    output_dir: Option<PathBuf>,
    json: bool,
}

impl CompressArgs {
    fn request(&self, defaults: &CompressionConfig) -> CompressionConfig {
        CompressionConfig {
            preset: self.preset.unwrap_or(defaults.preset),
            resolutions: if self.resolutions.is_empty() {
                defaults.resolutions.clone()
            } else {
                self.resolutions.clone()
            },
            frame_rate: self.frame_rate.unwrap_or(defaults.frame_rate),
            preserve_audio_quality: defaults.preserve_audio_quality && !self.no_audio_quality,
            output_format: self.format.unwrap_or(defaults.output_format),
            ..defaults.clone()
        }
    }
}

async fn compress(args: CompressArgs, config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let request = args.request(&config.defaults);

    for file in &args.files {
        if !file.is_file() {
            anyhow::bail!("Input file does not exist: {:?}", file);
        }
    }

    let pipeline = app::build_pipeline(&config)?;
    if let Some(ref dir) = args.output_dir {
        pipeline.set_output_directory(dir)?;
    }

    tracing::info!(
        "Compressing {} file(s) into {:?}",
        args.files.len(),
        pipeline.output_directory()
    );

    // Ctrl-C cancels in-flight encodes; their partial output is removed.
    let cancel = CancellationToken::new();
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted, cancelling encodes");
                cancel.cancel();
            }
        })
    };

    let uploads = args.files.iter().map(Upload::from_path).collect();
    let report = pipeline.process_uploads(uploads, &request, &cancel).await;
    interrupt.abort();
    let report = report?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if !report.upload_failures.is_empty() {
        anyhow::bail!(
            "{} of {} files could not be read",
            report.upload_failures.len(),
            args.files.len()
        );
    }
    if !report.is_complete() {
        anyhow::bail!(
            "{} of {} encodes failed",
            report.failures.len(),
            report.failures.len() + report.results.len()
        );
    }

    Ok(())
}

fn print_report(report: &ProcessReport) {
    for result in &report.results {
        println!(
            "✓ {} {} ({} -> {} bytes, {:.2}x, {}s @ {} bps)",
            result.file_name,
            result.resolution_label,
            result.original_size_bytes,
            result.compressed_size_bytes,
            result.compression_ratio,
            result.duration_seconds,
            result.bitrate_bps
        );
        println!("    {}", result.output_path.display());
    }
    for failure in &report.failures {
        println!(
            "✗ {} {}: {}",
            failure.file_name, failure.resolution_label, failure.error
        );
    }
    for failure in &report.upload_failures {
        println!("✗ {}: {}", failure.file_name, failure.error);
    }
}

async fn list_resolutions(file: &Path, json: bool, config_path: Option<&Path>) -> Result<()> {
    if !file.is_file() {
        anyhow::bail!("File does not exist: {:?}", file);
    }

    let config = config::load_config_or_default(config_path)?;
    let pipeline = app::build_pipeline(&config)?;
    let tiers = pipeline.available_resolutions_at(file).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&tiers)?);
    } else {
        for tier in tiers {
            if tier.is_sentinel() {
                println!("{:<9} (source dimensions)", tier.name);
            } else {
                println!(
                    "{:<9} {}x{} ({})",
                    tier.name, tier.width, tier.height, tier.label
                );
            }
        }
    }

    Ok(())
}

fn output_dir(set: Option<PathBuf>, config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let output = OutputDirectory::new(config.storage.output_dir.clone(), Arc::new(LocalStorage));

    match set {
        Some(path) => {
            output.set(&path)?;
            let target = config::writable_config_path(config_path);
            config::persist::update_output_dir(&target, &output.get())?;
            println!("Output directory set to {}", output.get().display());
            println!("Saved to {}", target.display());
        }
        None => println!("{}", output.get().display()),
    }

    Ok(())
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    println!("Checking external tools...\n");

    let config = config::load_config_or_default(config_path)?;
    let tools = ToolRegistry::discover(&config.tools).check_all();
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version);
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Install ffmpeg to enable compression.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let (config, source) = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            (config::load_config(p)?, Some(p.to_path_buf()))
        }
        None => match config::find_config_file() {
            Some(found) => {
                println!("Validating config: {:?}", found);
                (config::load_config(&found)?, Some(found))
            }
            None => {
                println!("No config file found, using defaults");
                (config::Config::default(), None)
            }
        },
    };

    if source.is_some() {
        println!("✓ Configuration is valid");
    }
    println!("  Output dir: {}", config.storage.output_dir.display());
    println!("  Upload dir: {}", config.storage.upload_dir.display());
    println!("  Parallel plans: {}", config.pipeline.max_parallel_plans);
    println!(
        "  Defaults: {} {} @ {} fps, resolutions {:?}",
        config.defaults.preset,
        config.defaults.output_format,
        config.defaults.frame_rate,
        config.defaults.effective_resolutions()
    );
    tracing::debug!("Effective config:\n{}", toml::to_string_pretty(&config)?);

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "vcompress=trace,vc_pipeline=trace,vc_av=debug,vc_core=debug".to_string()
        } else {
            "vcompress=debug,vc_pipeline=info,vc_av=info,vc_core=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Compress {
            files,
            preset,
            resolutions,
            frame_rate,
            format,
            no_audio_quality,
            output_dir,
            json,
        } => {
            let args = CompressArgs {
                files,
                preset,
                resolutions,
                frame_rate,
                format,
                no_audio_quality,
                output_dir,
                json,
            };
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(compress(args, cli.config.as_deref()))
        }
        Commands::Resolutions { file, json } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(list_resolutions(&file, json, cli.config.as_deref()))
        }
        Commands::OutputDir { set } => output_dir(set, cli.config.as_deref()),
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("vcompress {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
