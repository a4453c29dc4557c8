mod cli;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use rc_core::config::Config;
use rc_core::VideoId;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG if set, otherwise pick defaults from the verbose flag.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "reelcast=trace,rc_server=debug,rc_stream=debug,rc_db=debug,tower_http=debug"
                .to_string()
        } else {
            "reelcast=info,rc_server=info,rc_stream=info,rc_db=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let mut config = load_config(cli.config.as_deref())?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }

            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(rc_server::start(config))?;
            Ok(())
        }
        Commands::Register {
            file,
            title,
            description,
        } => {
            let config = load_config(cli.config.as_deref())?;
            register(&config, &file, &title, &description)
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("reelcast {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// An explicit config path must load; without one, defaults apply.
fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(p) => Config::load(p).with_context(|| format!("loading config {}", p.display())),
        None => Ok(Config::default()),
    }
}

fn register(config: &Config, file: &Path, title: &str, description: &str) -> Result<()> {
    let meta = std::fs::metadata(file).with_context(|| format!("reading {}", file.display()))?;
    if !meta.is_file() {
        anyhow::bail!("Not a regular file: {}", file.display());
    }
    let location = std::fs::canonicalize(file)?;

    if let Some(parent) = config.server.db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let db = rc_db::pool::init_pool(&config.server.db_path.to_string_lossy())?;
    let conn = rc_db::pool::get_conn(&db)?;

    let video = rc_db::queries::videos::create_video(
        &conn,
        VideoId::new(),
        title,
        description,
        &location.to_string_lossy(),
        "",
        i64::try_from(meta.len())?,
        None,
    )?;

    tracing::info!(video_id = %video.id, size_bytes = video.size_bytes, "Registered video");
    println!("{}", video.id);
    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {}", p.display());
            Config::load(p)?
        }
        None => {
            println!("No config file given; validating defaults");
            Config::default()
        }
    };

    let warnings = config.validate();
    if warnings.is_empty() {
        println!("Configuration is valid.");
    } else {
        for w in &warnings {
            println!("warning: {w}");
        }
    }

    println!("  listen: {}:{}", config.server.host, config.server.port);
    println!("  database: {}", config.server.db_path.display());
    println!("  uploads: {}", config.storage.upload_dir.display());
    println!("  no-range policy: {}", config.streaming.no_range_policy);
    Ok(())
}
