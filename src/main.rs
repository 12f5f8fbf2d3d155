use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use trybe_images::application::ResolveImageUseCase;
use trybe_images::domain::ports::{FallbackTracer, NoopFallbackTracer, SystemClock};
use trybe_images::domain::EntityImages;
use trybe_images::infrastructure::{
    AppConfig, CliArgs, Command, FirebaseStorageResolver, ImageResolver,
    StorageManager, TracingFallbackTracer, UrlCache,
};
use trybe_images::presentation::{ImageSlot, SlotHandle};

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = config.effective_log_path() {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}

fn load_config(args: &CliArgs) -> Result<AppConfig> {
    let manager = match &args.config {
        Some(path) => StorageManager::with_dir(
            path.parent().map(Path::to_path_buf).unwrap_or_default(),
        ),
        None => StorageManager::new()?,
    };
    let mut config = manager.load_config(args.config.as_deref())?;
    config.merge_with_args(args);
    Ok(config)
}

async fn build_resolver(config: &AppConfig) -> Result<Arc<ImageResolver>> {
    let cache = if config.cache.persist {
        UrlCache::load(
            Arc::new(config.cache_store()),
            Arc::new(SystemClock),
            config.url_cache_config(),
        )
        .await
    } else {
        UrlCache::in_memory(config.url_cache_config())
    };
    let cache = Arc::new(cache);

    let storage = Arc::new(FirebaseStorageResolver::new(
        config.storage.api_base.clone(),
        config.storage.bucket.clone(),
        std::time::Duration::from_secs(config.storage.timeout_secs),
    )?);

    Ok(Arc::new(ImageResolver::new(
        cache,
        storage,
        config.resolver_config(),
    )))
}

fn read_entities(path: &Path) -> Result<Vec<EntityImages>> {
    let content = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
    let value: serde_json::Value =
        serde_json::from_str(&content).wrap_err("Entity file is not valid JSON")?;
    let entities = match value {
        serde_json::Value::Array(_) => serde_json::from_value(value)?,
        other => vec![serde_json::from_value(other)?],
    };
    Ok(entities)
}

async fn run(args: CliArgs, config: AppConfig) -> Result<()> {
    let resolver = build_resolver(&config).await?;
    let cache = resolver.cache().clone();

    match args.command {
        Command::Resolve { references } => {
            let tracer: Arc<dyn FallbackTracer> = if config.diagnostics.trace_fallbacks {
                Arc::new(TracingFallbackTracer)
            } else {
                Arc::new(NoopFallbackTracer)
            };
            let slot = SlotHandle::new(
                ImageSlot::new("cli", references, config.slot_config()).with_tracer(tracer),
            );
            if slot.resolve(&*resolver).await {
                slot.with(|s| {
                    let generation = s.generation();
                    s.on_load(generation);
                });
            }
            let display = slot.display();
            println!("{:?}\t{}", display.state, display.url.unwrap_or_default());
        }
        Command::Entity { path, overrides } => {
            let entities = read_entities(&path)?;
            let overrides: HashMap<String, String> = overrides.into_iter().collect();
            let use_case = ResolveImageUseCase::new(resolver.clone()).with_overrides(overrides);
            for resolved in use_case.execute_many(&entities).await {
                println!("{}", serde_json::to_string(&resolved.report())?);
            }
        }
        Command::Stats => println!("{}", cache.stats().await),
        Command::List => {
            for entry in cache.entries().await {
                let stamp = chrono::DateTime::from_timestamp_millis(entry.timestamp)
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_default();
                println!("{stamp}\t{}\t{}", entry.key, entry.resolved_url);
            }
        }
        Command::Invalidate { keys } => {
            println!("removed {}", cache.invalidate(&keys).await);
        }
        Command::InvalidatePrefix { needle } => {
            println!("removed {}", cache.invalidate_by_prefix(&needle).await);
        }
        Command::Sweep => println!("removed {}", cache.sweep_expired().await),
        Command::Clear => {
            cache.clear().await;
            println!("cleared");
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = CliArgs::parse();
    let config = load_config(&args)?;
    init_logging(&config)?;

    info!(version = trybe_images::VERSION, "Starting trybe-images");

    run(args, config).await
}
