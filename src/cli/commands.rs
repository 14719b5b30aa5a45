use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "facetier", about = "Two-tier face identity registry")]
pub struct Cli {
    /// Directory holding the permanent and ephemeral snapshots
    #[arg(long, global = true)]
    pub cache_path: Option<String>,
    /// How long an unseen face stays in the ephemeral tier (e.g. 90, 30s, 15m, 1h, 7d)
    #[arg(long, global = true)]
    pub expiration: Option<String>,
    /// Maximum face distance that still counts as a match
    #[arg(long, global = true)]
    pub tolerance: Option<f64>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PromptKind {
    /// Ask on the terminal
    Terminal,
    /// Never name unknown faces
    None,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a stream of detected faces (JSON lines) and print names per frame
    Run {
        /// Detection input file, or - for stdin
        #[arg(long, default_value = "-")]
        input: String,
        /// Factor the detector downscaled frames by
        #[arg(long, default_value = "0.25")]
        resize_factor: f64,
        /// Resolve every n-th frame and reuse labels in between
        #[arg(long, default_value = "2")]
        frame_stride: u32,
        /// Load both tiers from the cache before starting
        #[arg(long)]
        init_from_cache: bool,
        /// How to ask for names of unknown faces
        #[arg(long, value_enum, default_value = "terminal")]
        prompt: PromptKind,
        /// Do not save the tiers on exit
        #[arg(long)]
        no_save: bool,
    },
    /// List stored faces
    List {
        /// Tier (permanent, ephemeral)
        #[arg(default_value = "permanent")]
        tier: String,
    },
    /// Add a face from a JSON array of numbers
    Add {
        name: String,
        /// Face vector as JSON, e.g. "[0.12, -0.03, ...]"
        vector: String,
        #[arg(long, default_value = "permanent")]
        tier: String,
    },
    /// Remove a face by name (first match) or by --key
    Remove {
        /// Name of the face to remove
        #[arg(required_unless_present = "key")]
        name: Option<String>,
        /// Exact canonical key instead of a name
        #[arg(long, conflicts_with = "name")]
        key: Option<String>,
        #[arg(long, default_value = "permanent")]
        tier: String,
    },
    /// Classify a face vector against both tiers without recording it
    Identify {
        /// Face vector as JSON
        vector: String,
    },
    /// Evict expired faces from the ephemeral tier
    Sweep,
    /// Show registry statistics
    Stats,
}
