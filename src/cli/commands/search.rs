//! One-off matching for an explicit track.

use std::path::Path;

use tokio::runtime::Runtime;

use crate::config::Config;
use crate::matching::TrackSnapshot;
use crate::status::DisplayStatus;

use super::build_session;

/// Run a single round and print the settled result set
pub fn cmd_search(
    rt: &Runtime,
    config: &Config,
    config_path: Option<&Path>,
    title: &str,
    artist: &str,
    album: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let track = TrackSnapshot::new(title.trim(), artist.trim(), album.unwrap_or("").trim());
    if !track.is_searchable() {
        anyhow::bail!("--title must not be empty");
    }

    let manager = build_session(config, config_path)?.manager;

    rt.block_on(async {
        manager.store().set_playback(Some(track.clone()), true);
        manager.search(track).settled().await;
        let snapshot = manager.store().snapshot();

        if json {
            let matches: Vec<_> = snapshot.results.values().collect();
            println!("{}", serde_json::to_string_pretty(&matches)?);
            if let Some(error) = &snapshot.error {
                eprintln!("Error: {error}");
            }
        } else {
            print!("{}", DisplayStatus::from_snapshot(&snapshot));
        }
        Ok::<(), anyhow::Error>(())
    })
}
