//! Autofill CLI
//!
//! Fills HTML forms from a saved profile and manages fill history.

use std::path::{Path, PathBuf};

use chrono::DateTime;
use clap::{Parser, Subcommand};
use autofill::{
    config,
    document::{FormControl, FormDocument, HtmlDocument},
    error::{AppError, Result},
    models::{Config, UserProfile},
    notify::LogNotifier,
    pipeline::{self, AutofillSession},
    services,
    storage::{HistoryStore, LocalHistoryStore},
    utils::{self, log as banner},
};

/// Autofill - Form Autofill Engine
#[derive(Parser, Debug)]
#[command(name = "autofill", version, about = "Fill web forms from a saved profile")]
struct Cli {
    /// Path to storage directory containing config, profile and history
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fill the forms on a page
    Fill {
        /// Local HTML file to fill
        #[arg(long, conflicts_with = "url", required_unless_present = "url")]
        page: Option<PathBuf>,

        /// Page URL to download and fill
        #[arg(long)]
        url: Option<String>,

        /// Profile file to use instead of the saved one
        #[arg(long)]
        profile: Option<PathBuf>,

        /// Mapping profile overriding settings.mappingProfile
        #[arg(long)]
        mapping: Option<String>,

        /// Behave like the page-load trigger (honours autoFillOnLoad)
        #[arg(long)]
        on_load: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show how the fields on a page are classified
    Classify {
        /// Local HTML file to inspect
        #[arg(long)]
        page: PathBuf,

        /// Mapping profile overriding settings.mappingProfile
        #[arg(long)]
        mapping: Option<String>,
    },

    /// Validate configuration files
    Validate,

    /// Show recent fill history
    History {
        /// Delete all history entries
        #[arg(long)]
        clear: bool,
    },
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool, default_level: &str) {
    let level = if verbose { "debug" } else { default_level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Loading is silent, so the logger can take its level from the file.
    let loaded = config::load_config(&cli.storage_dir);
    let level = loaded
        .as_ref()
        .map_or("info", |config| config.logging.level.as_str());
    init_logging(cli.verbose, level);

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            return Err(e);
        }
    };
    if config::config_path(&cli.storage_dir).exists() {
        log::debug!("Loaded configuration from {}", cli.storage_dir.display());
    } else {
        log::warn!(
            "No {} in {}. Using defaults.",
            config::CONFIG_FILE,
            cli.storage_dir.display()
        );
    }

    match cli.command {
        Command::Fill {
            page,
            url,
            profile,
            mapping,
            on_load,
            json,
        } => {
            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }

            let mut config = config;
            if let Some(name) = mapping {
                config.settings.mapping_profile = name;
            }

            let profile = match profile {
                Some(path) => Some(UserProfile::load(&path)?),
                None => config::load_profile(&cli.storage_dir)?,
            };

            let mut document = load_document(&config, page.as_deref(), url.as_deref()).await?;
            let session = AutofillSession::from_config(&config)?;

            let outcome = if on_load {
                session
                    .fill_on_load(&mut document, profile.as_ref(), &config.settings)
                    .await
            } else {
                session
                    .fill_now(&mut document, profile.as_ref(), &config.settings)
                    .await
                    .map(Some)
            };

            let report = match outcome {
                Ok(Some(report)) => report,
                Ok(None) => {
                    log::info!("Auto-fill on load is not enabled; nothing filled.");
                    return Ok(());
                }
                Err(e) if e.is_precondition() => {
                    log::error!(
                        "{}. Check settings.enabled in {} and save a profile in {}.",
                        e,
                        config::CONFIG_FILE,
                        cli.storage_dir.display()
                    );
                    return Err(e);
                }
                Err(e) => return Err(e),
            };

            let history = history_store(&config, &cli.storage_dir);
            let domain = utils::history_domain(document.location());
            pipeline::dispatch_report(&report, &config.settings, &domain, &history, &LogNotifier)
                .await;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                banner::summary(
                    "Fill",
                    &[
                        ("Status", report.status.to_string()),
                        ("Filled", report.filled_count.to_string()),
                        ("Message", report.message.clone()),
                    ],
                );
                for control in document.controls() {
                    if !document.events_for(control.id).is_empty() {
                        banner::sub_item(&format!("{} = {:?}", describe(control), control.value));
                    }
                }
            }
        }

        Command::Classify { page, mapping } => {
            let document = load_document(&config, Some(page.as_path()), None).await?;
            let name = mapping.unwrap_or_else(|| config.settings.mapping_profile.clone());
            let table = config.mapping_profiles()?.resolve(&name);

            let candidates = services::locate(&document);
            let classification = services::classify(&candidates, &table)?;

            banner::header(&format!(
                "{} candidates, mapping profile '{}'",
                candidates.len(),
                name
            ));
            for (key, patterns) in table.to_text() {
                log::debug!("{} = {}", key, patterns);
            }
            for (category, fields) in classification.iter() {
                log::info!("{}", category);
                for field in fields {
                    banner::sub_item(&format!("{} [{}]", field.control, field.signature));
                }
            }
            let unmatched = candidates
                .iter()
                .filter(|c| classification.categories_for(c.control).is_empty())
                .count();
            banner::separator();
            log::info!("{} candidates matched no category", unmatched);
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            let profiles = config.mapping_profiles()?;
            log::info!(
                "✓ Config OK (mapping profiles: {})",
                profiles.names().collect::<Vec<_>>().join(", ")
            );

            match config::load_profile(&cli.storage_dir) {
                Ok(Some(profile)) => log::info!(
                    "✓ Profile OK ({} categories populated)",
                    profile.populated_categories().len()
                ),
                Ok(None) => log::warn!("No profile saved yet"),
                Err(e) => {
                    log::error!("Profile validation failed: {}", e);
                    return Err(e);
                }
            }

            log::info!("All validations passed!");
        }

        Command::History { clear } => {
            let history = history_store(&config, &cli.storage_dir);

            if clear {
                history.clear().await?;
                log::info!("History cleared.");
                return Ok(());
            }

            let items = history.load().await?;
            if items.is_empty() {
                log::info!("No fill history yet.");
            }
            for item in items {
                let when = DateTime::from_timestamp_millis(item.timestamp)
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| item.timestamp.to_string());
                let domain = if item.domain.is_empty() {
                    "(local)"
                } else {
                    item.domain.as_str()
                };
                log::info!(
                    "{} {} {} filled={} {}",
                    when,
                    domain,
                    item.status,
                    item.filled_count,
                    item.message.unwrap_or_default()
                );
            }
        }
    }

    Ok(())
}

fn history_store(config: &Config, storage_dir: &Path) -> LocalHistoryStore {
    LocalHistoryStore::with_limit(
        config::history_path(config, storage_dir),
        config.engine.history_limit,
    )
}

/// Load a page from disk or, with the `fetch` feature, from the network.
async fn load_document(
    config: &Config,
    page: Option<&Path>,
    url: Option<&str>,
) -> Result<HtmlDocument> {
    if let Some(path) = page {
        let source = tokio::fs::read_to_string(path).await?;
        let document = HtmlDocument::parse(&source)?;
        let location = std::fs::canonicalize(path)
            .ok()
            .and_then(|p| url::Url::from_file_path(p).ok());
        return Ok(match location {
            Some(location) => document.with_url(location.to_string()),
            None => document,
        });
    }

    match url {
        Some(url) => fetch_document(config, url).await,
        None => Err(AppError::config("Either --page or --url is required")),
    }
}

#[cfg(feature = "fetch")]
async fn fetch_document(config: &Config, url: &str) -> Result<HtmlDocument> {
    let client = utils::http::create_async_client(&config.fetch)?;
    log::info!("Fetching {}", url);
    let source = utils::http::fetch_page_async(&client, url).await?;
    Ok(HtmlDocument::parse(&source)?.with_url(url))
}

#[cfg(not(feature = "fetch"))]
async fn fetch_document(_config: &Config, url: &str) -> Result<HtmlDocument> {
    Err(AppError::config(format!(
        "Cannot fetch {url}: built without the `fetch` feature"
    )))
}

/// Short human name for a control.
fn describe(control: &FormControl) -> String {
    let attrs = &control.attributes;
    attrs
        .name
        .as_deref()
        .or(attrs.id.as_deref())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .or_else(|| (!control.label.is_empty()).then(|| control.label.clone()))
        .unwrap_or_else(|| control.id.to_string())
}
