use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "texpack")]
#[command(author, version, about = "Minecraft texture extractor and resource pack repackager", long_about = None)]
pub struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true, env = "TEXPACK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Runs `extract` with configured defaults when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Find target textures in loose files and archives and package each new one
    Extract(ExtractArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Initialize configuration file with defaults
    Init {
        /// Overwrite existing config
        #[arg(short, long, default_value_t = false)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., paths.source)
        key: String,
        /// Value to set
        value: String,
    },

    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },

    /// Show config file path
    Path,
}

#[derive(Parser, Debug, Default)]
pub struct ExtractArgs {
    /// Directory tree to scan
    #[arg(short, long)]
    pub source: Option<PathBuf>,

    /// Directory receiving the numbered packages
    #[arg(short, long)]
    pub target: Option<PathBuf>,

    /// Template directory merged into every package
    #[arg(short, long)]
    pub premade: Option<PathBuf>,

    /// Directory collecting a copy of every package zip
    #[arg(short, long)]
    pub collection: Option<PathBuf>,

    /// Do not copy packages to the collection directory
    #[arg(long, default_value_t = false, conflicts_with = "collection")]
    pub no_collection: bool,

    /// Texture file name to look for (repeatable, replaces configured names)
    #[arg(short = 'n', long = "name")]
    pub names: Vec<String>,

    /// Prefix of package folders and zips
    #[arg(long)]
    pub prefix: Option<String>,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}
