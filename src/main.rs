//! Storefront Widget - terminal driver

use anyhow::{Context, Result};
use std::io;
use storefront_widget::console::{self, ConsoleHost};
use storefront_widget::{Boot, Catalog, Storefront, WidgetConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = WidgetConfig::from_env()?;
    let catalog = match &config.catalog_path {
        Some(path) => {
            let json = std::fs::read_to_string(path).with_context(|| format!("reading catalog {}", path.display()))?;
            Catalog::from_json(&json)?
        }
        None => Catalog::sample(),
    };

    // The login flow is external; in a terminal the flag comes from the environment.
    let mut host = ConsoleHost::new(io::stdin().lock(), io::stdout());
    if let Ok(flag) = std::env::var("STOREFRONT_LOGGED_IN") {
        host = host.with_session_item(&config.session_key, &flag);
    }

    match Storefront::boot(&config, catalog, host)? {
        Boot::Mounted(mut widget) => {
            tracing::info!(session = %widget.session_id(), "storefront ready");
            console::run(&mut widget)?;
        }
        Boot::Redirected(_) => tracing::warn!("not logged in; set STOREFRONT_LOGGED_IN to start a session"),
    }
    Ok(())
}
