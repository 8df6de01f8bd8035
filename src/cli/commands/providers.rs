//! Provider listing and enable/disable toggles.

use std::path::Path;

use crate::config::{self, Config};
use crate::error::ResultExt;
use crate::matching::{EnablementPolicy, registry};

use super::build_session;

/// List providers with configured / enabled / eligible flags
pub fn cmd_providers(config: &Config, path: Option<&Path>) -> anyhow::Result<()> {
    let session = build_session(config, path)?;

    println!("{:<16} {:<16} {:<11} {:<8}", "Provider", "Slug", "Configured", "Enabled");
    for provider in session.manager.providers() {
        let id = provider.id();
        let configured = provider.is_configured();
        let enabled = session.policy.is_enabled(id);
        let marker = if configured && enabled { "*" } else { " " };
        println!(
            "{:<16} {:<16} {:<11} {:<8} {}",
            id.as_str(),
            id.slug(),
            yes_no(configured),
            yes_no(enabled),
            marker
        );
    }
    println!("\n* searched when a track changes");
    Ok(())
}

/// Persist an enable/disable toggle for one provider
pub fn cmd_set_enabled(
    mut config: Config,
    path: Option<&Path>,
    provider: &str,
    enabled: bool,
) -> anyhow::Result<()> {
    let session = build_session(&config, path)?;
    let id = registry::find_provider(session.manager.providers(), provider)?
        .id()
        .clone();

    config.providers.set_enabled(&id.slug(), enabled);
    let saved = match path {
        Some(path) => config::save_to(&config, path),
        None => config::save(&config),
    };
    saved.with_context(format!("while saving toggle for {id}"))?;

    println!("{} {}", id, if enabled { "enabled" } else { "disabled" });
    Ok(())
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}
