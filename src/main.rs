mod cli;

use artforge::{config, providers::ArtworkProvider, providers::TmdbProvider};
use artforge_db::queries::schedule;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on the
    // verbose flag.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "artforge=trace,artforge_db=debug".to_string()
        } else {
            "artforge=debug,artforge_db=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Due { limit } => list_due(cli.config.as_deref(), limit),
        Commands::SearchSet { name } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(search_set(cli.config.as_deref(), &name))
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("artforge {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn list_due(config_path: Option<&std::path::Path>, limit: i64) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let pool = artforge_db::init_pool(&config.database.path)?;
    let conn = artforge_db::get_conn(&pool)?;

    let due = schedule::list_due(&conn, chrono::Utc::now(), limit)?;
    if due.is_empty() {
        println!("Nothing is due for a re-check.");
        return Ok(());
    }

    println!("{} item(s) due:", due.len());
    for record in due {
        let when = record
            .next_check
            .map(|dt| dt.to_rfc3339())
            .unwrap_or_else(|| "never checked".to_string());
        println!(
            "  {} {} (next check: {})",
            record.media_type, record.media_id, when
        );
    }
    Ok(())
}

async fn search_set(config_path: Option<&std::path::Path>, name: &str) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let provider = TmdbProvider::new(config.providers.tmdb.api_key.clone());
    if !provider.is_available() {
        anyhow::bail!("TMDB API key is not configured");
    }

    let results = provider.search_set(name).await?;
    if results.is_empty() {
        println!("No collections found for {:?}", name);
        return Ok(());
    }

    for result in results {
        print!("{} - {}", result.id, result.name);
        if let Some(overview) = result.overview.filter(|o| !o.is_empty()) {
            let first_line = overview.lines().next().unwrap_or("");
            print!(": {}", first_line);
        }
        println!();
    }
    Ok(())
}

fn validate_config(path: Option<&std::path::Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  Database: {}", config.database.path);
            println!(
                "  Language override: {}",
                config.language.override_language.as_deref().unwrap_or("-")
            );
            println!(
                "  Preferred size: {}x{}",
                config.artwork.preferred_width, config.artwork.preferred_height
            );
            println!("  Filesystem only: {}", config.artwork.only_filesystem);
            println!("  TMDB enabled: {}", config.providers.tmdb.enabled);
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("Default config:");
            println!("  Database: {}", config.database.path);
            println!(
                "  Preferred size: {}x{}",
                config.artwork.preferred_width, config.artwork.preferred_height
            );
        }
    }

    Ok(())
}
