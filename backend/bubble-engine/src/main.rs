use anyhow::{Context, Result};
use bubble_engine::config::{Config, LogFormat};
use bubble_engine::models::{ActionKind, Item};
use bubble_engine::services::catalog::load_catalog;
use bubble_engine::{RoundReport, Session};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    let config = Config::from_env().context("Failed to load config")?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    match config.log_format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .init(),
    }

    let catalog = load_catalog(&config.catalog_path)
        .with_context(|| format!("Failed to load catalog from {}", config.catalog_path))?;

    let favorite = match &config.simulation.favorite_topic {
        Some(topic) => topic.clone(),
        None => catalog
            .first()
            .map(|item| item.topic.clone())
            .context("Catalog has no items")?,
    };

    let mut session = match config.simulation.seed {
        Some(seed) => Session::with_seed(catalog, config.session.clone(), seed),
        None => Session::new(catalog, config.session.clone()),
    };

    info!(
        session_id = %session.id(),
        started_at = %session.started_at(),
        favorite_topic = %favorite,
        rounds = config.simulation.rounds,
        topics = session.all_topics().len(),
        "Starting bubble simulation"
    );

    let mut report = session.start();
    let mut summary_printed = print_reports(&report)?;

    for _ in 1..config.simulation.rounds {
        if report.is_exhausted() {
            warn!(round = report.round, "Catalog exhausted, stopping early");
            break;
        }

        let feed: Vec<Item> = session.current_feed().to_vec();
        for item in &feed {
            // Keep one item on screen so the round can be closed
            if session.current_feed().len() == 1 {
                break;
            }
            if let Some(action) = scripted_action(item, &favorite) {
                session.interact(item.id, action)?;
            }
        }

        report = session.advance_round()?;
        summary_printed |= print_reports(&report)?;
    }

    if !summary_printed {
        print_json("summary", &session.summary_now())?;
    }

    Ok(())
}

/// The scripted viewer: loves one topic, shares its loudest items, skips
/// loud content elsewhere and scrolls past the rest.
fn scripted_action(item: &Item, favorite: &str) -> Option<ActionKind> {
    if item.topic == favorite {
        if item.intensity >= 0.75 {
            Some(ActionKind::Share)
        } else {
            Some(ActionKind::Like)
        }
    } else if item.intensity >= 0.7 {
        Some(ActionKind::Skip)
    } else {
        None
    }
}

fn print_reports(report: &RoundReport) -> Result<bool> {
    if let Some(snapshot) = &report.snapshot {
        print_json("snapshot", snapshot)?;
    }
    if let Some(summary) = &report.summary {
        print_json("summary", summary)?;
        return Ok(true);
    }
    Ok(false)
}

fn print_json<T: Serialize>(kind: &str, value: &T) -> Result<()> {
    let body = serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialize {}", kind))?;
    println!("{}", body);
    Ok(())
}
