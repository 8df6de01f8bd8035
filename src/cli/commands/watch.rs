//! Live mode: follow the player and re-render on every result change.

use std::path::Path;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::runtime::Runtime;
use tracing::{debug, info};

use crate::config::Config;
use crate::nowplaying::{CommandSource, NowPlayingSource, Poller};
use crate::status::DisplayStatus;

use super::build_session;

/// Poll the player, match track changes, refresh on Enter, stop on Ctrl+C
pub fn cmd_watch(rt: &Runtime, config: &Config, config_path: Option<&Path>) -> anyhow::Result<()> {
    let manager = build_session(config, config_path)?.manager;

    rt.block_on(async {
        let source: Arc<dyn NowPlayingSource> = Arc::new(CommandSource::from_config(&config.polling));

        let eligible = manager.eligible_providers().len();
        println!(
            "Watching {} ({} of {} services ready). Enter refreshes, Ctrl+C quits.\n",
            source.describe(),
            eligible,
            manager.providers().len()
        );
        info!(source = %source.describe(), eligible, "Watch started");

        let poller = Poller::new(source, Arc::clone(&manager), config.polling.interval())
            .with_timeout(config.polling.timeout())
            .spawn();

        let mut changes = manager.store().subscribe();
        let mut stdin = BufReader::new(tokio::io::stdin()).lines();
        let mut stdin_open = true;
        let mut last_rendered = String::new();

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                changed = changes.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let rendered = DisplayStatus::from_snapshot(&manager.store().snapshot()).to_string();
                    if rendered != last_rendered {
                        println!("{rendered}");
                        last_rendered = rendered;
                    }
                }
                line = stdin.next_line(), if stdin_open => match line {
                    Ok(Some(_)) => {
                        if manager.refresh().is_none() {
                            println!("Nothing playing to refresh.\n");
                        }
                    }
                    Ok(None) | Err(_) => {
                        debug!("stdin closed, manual refresh unavailable");
                        stdin_open = false;
                    }
                },
                _ = &mut ctrl_c => {
                    println!();
                    break;
                }
            }
        }

        poller.abort();
        info!("Watch stopped");
        Ok::<(), anyhow::Error>(())
    })
}
