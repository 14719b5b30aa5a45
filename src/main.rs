use clap::Parser;
use facetier::cli::commands::{Cli, Commands, PromptKind};
use facetier::config::{parse_duration, FaceTierConfig};
use facetier::domain::ports::name_prompt::NamePrompt;
use facetier::domain::values::face_vector::FaceVector;
use facetier::domain::values::serialized_key::SerializedKey;
use facetier::domain::values::tier::Tier;
use facetier::infrastructure::feeds::jsonl::JsonlFrameSource;
use facetier::infrastructure::prompts::decline::DeclinePrompt;
use facetier::infrastructure::prompts::terminal::TerminalPrompt;
use facetier::infrastructure::render::jsonl::JsonlRenderer;
use facetier::FaceTier;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// How long shutdown waits for blocking reads of stdin that nobody will finish.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("FACETIER_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: cannot start runtime: {e}");
            std::process::exit(1);
        }
    };
    let result = runtime.block_on(run(cli));
    runtime.shutdown_timeout(SHUTDOWN_GRACE);

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn base_config(cli: &Cli) -> Result<FaceTierConfig, Box<dyn std::error::Error>> {
    let mut config = FaceTierConfig::from_env()?;
    if let Some(path) = &cli.cache_path {
        config.cache_path = PathBuf::from(path);
    }
    if let Some(raw) = &cli.expiration {
        config.expiration_time = parse_duration(raw)?;
    }
    if let Some(tolerance) = cli.tolerance {
        config.tolerance = tolerance;
    }
    Ok(config)
}

fn parse_vector(json: &str) -> Result<FaceVector, Box<dyn std::error::Error>> {
    let components: Vec<f64> = serde_json::from_str(json)?;
    Ok(FaceVector::new(components)?)
}

/// Opens the registry from the cache for a one-shot admin command.
fn open_registry(config: FaceTierConfig) -> Result<FaceTier, Box<dyn std::error::Error>> {
    let config = FaceTierConfig {
        init_from_cache: true,
        ..config
    };
    Ok(FaceTier::new(config, Arc::new(DeclinePrompt))?)
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = base_config(&cli)?;

    match cli.command {
        Commands::Run {
            input,
            resize_factor,
            frame_stride,
            init_from_cache,
            prompt,
            no_save,
        } => {
            if prompt == PromptKind::Terminal && input == "-" {
                return Err("terminal prompt reads answers from stdin; pass --input <file> or --prompt none".into());
            }
            let prompter: Arc<dyn NamePrompt> = match prompt {
                PromptKind::Terminal => Arc::new(TerminalPrompt::new()),
                PromptKind::None => Arc::new(DeclinePrompt),
            };
            let config = FaceTierConfig {
                input,
                resize_factor,
                frame_stride,
                init_from_cache,
                ..config
            };
            let mut ft = FaceTier::new(config, prompter)?;
            let mut source = JsonlFrameSource::open(&ft.config().input).await?;
            let mut sink = JsonlRenderer::stdout();

            let shutdown = async {
                let _ = tokio::signal::ctrl_c().await;
            };
            let summary = ft.stream(&mut source, &mut sink, shutdown).await;
            eprintln!("{}", serde_json::to_string_pretty(&summary)?);

            if !no_save {
                ft.save()?;
            }
            if let Some(failure) = summary.failure() {
                return Err(format!("stream ended early: {failure}").into());
            }
        }
        Commands::List { tier } => {
            let tier: Tier = tier.parse()?;
            let ft = open_registry(config)?;
            println!("{}", serde_json::to_string_pretty(&ft.list(tier))?);
        }
        Commands::Add { name, vector, tier } => {
            let tier: Tier = tier.parse()?;
            let vector = parse_vector(&vector)?;
            let mut ft = open_registry(config)?;
            let key = ft.add(tier, &name, vector);
            ft.save()?;
            println!("Added {name} to the {tier} tier ({})", key.short());
        }
        Commands::Remove { name, key, tier } => {
            let tier: Tier = tier.parse()?;
            let mut ft = open_registry(config)?;
            match (key, name) {
                (Some(key), _) => {
                    let key = SerializedKey::parse(&key)?;
                    let removed = ft.remove_key(tier, &key)?;
                    println!("Removed {removed} from the {tier} tier");
                }
                (None, Some(name)) => {
                    let key = ft.remove_name(tier, &name)?;
                    println!("Removed {name} from the {tier} tier ({})", key.short());
                }
                (None, None) => return Err("pass a name or --key".into()),
            }
            ft.save()?;
        }
        Commands::Identify { vector } => {
            let vector = parse_vector(&vector)?;
            let mut ft = open_registry(config)?;
            let resolution = ft.identify(&vector);
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "name": resolution.name,
                    "classification": resolution.classification,
                    "code": resolution.classification.code(),
                    "distance": resolution.distance,
                }))?
            );
        }
        Commands::Sweep => {
            let mut ft = open_registry(config)?;
            let evicted = ft.sweep();
            ft.save()?;
            println!("Evicted {evicted} expired faces");
        }
        Commands::Stats => {
            let ft = open_registry(config)?;
            println!("{}", serde_json::to_string_pretty(&ft.stats())?);
        }
    }
    Ok(())
}
