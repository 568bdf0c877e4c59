use clap::{Parser, Subcommand};
use std::path::PathBuf;
use vc_core::{OutputFormat, PresetName};

#[derive(Parser)]
#[command(name = "vcompress")]
#[command(author, version, about = "Multi-resolution video compression tool")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compress one or more videos into every requested resolution
    Compress {
        /// Input files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Quality preset (LOW, MEDIUM, HIGH)
        #[arg(short, long)]
        preset: Option<PresetName>,

        /// Resolution selector, repeatable (e.g. ORIGINAL, HD, CUSTOM_640x360_ASPECT)
        #[arg(short, long = "resolution")]
        resolutions: Vec<String>,

        /// Output frame rate
        #[arg(long)]
        frame_rate: Option<u32>,

        /// Output format (mp4, webm, mkv, segmented)
        #[arg(short, long)]
        format: Option<OutputFormat>,

        /// Use 128 kbps audio instead of 192 kbps
        #[arg(long)]
        no_audio_quality: bool,

        /// Write outputs here instead of the configured directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Output results as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the resolutions worth offering for a video
    Resolutions {
        /// Video to probe
        #[arg(required = true)]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show or change the output directory
    OutputDir {
        /// New output directory; persisted to the config file
        #[arg(long)]
        set: Option<PathBuf>,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
