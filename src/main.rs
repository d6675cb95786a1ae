use ambientcg_fetcher::backend::models::DEFAULT_MATERIAL;
use ambientcg_fetcher::{FetchConfig, MaterialRequest, Resolution, TextureCache, TextureSet};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ambientcg-fetcher", version, about = "Download ambientCG texture sets into a local cache")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Cache root, overrides the config file
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Download endpoint, overrides the config file
    #[arg(long, global = true)]
    base_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Make sure a material is cached and show its maps
    Fetch {
        /// ambientCG asset id, e.g. Rock035
        #[arg(default_value = DEFAULT_MATERIAL)]
        name: String,
        /// One of 1K, 2K, 4K, 8K
        #[arg(short, long, default_value = "1K")]
        resolution: Resolution,
    },
    /// List cached materials
    List,
    /// Print the cache root
    Path,
}

fn main() {
    // Logging setup
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn,ambientcg_fetcher=info"),
    )
    .init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("{}", failure_message(&e));
        std::process::exit(1);
    }
}

fn failure_message(e: &anyhow::Error) -> String {
    format!("Error: {e:#}")
}

fn run(cli: Cli) -> Result<()> {
    let mut config = FetchConfig::resolve(cli.config.as_deref(), cli.cache_dir.as_deref())?;
    if let Some(dir) = cli.cache_dir {
        config.cache_dir = Some(dir);
    }
    if let Some(url) = cli.base_url {
        config.base_url = url;
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to create runtime")?;

    let cache = TextureCache::from_config(&config)?;

    match cli.command {
        Commands::Fetch { name, resolution } => {
            let request = MaterialRequest::new(name, resolution)?;
            let outcome = runtime.block_on(cache.ensure_material(&request))?;

            println!("{}", outcome.directory.display());
            let set = TextureSet::scan(&outcome.directory)
                .with_context(|| format!("Failed to read {}", outcome.directory.display()))?;
            for map in &set.maps {
                println!(
                    "  {:<13} {:<10} -> {:<32} {}",
                    map.kind.to_string(),
                    map.kind.colorspace(),
                    map.kind.shader_input(),
                    map.path.display()
                );
            }
            let missing = set.missing();
            if !missing.is_empty() {
                let names: Vec<String> = missing.iter().map(ToString::to_string).collect();
                println!("  (no {} map)", names.join(", "));
            }
        }
        Commands::List => {
            for entry in runtime.block_on(cache.list_entries())? {
                println!("{entry}");
            }
        }
        Commands::Path => println!("{}", cache.root().display()),
    }

    Ok(())
}
