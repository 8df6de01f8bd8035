//! Credential storage and player bridge inspection.

use crate::config::Config;
use crate::error::ResultExt;
use crate::nowplaying::{CommandSource, NowPlayingSource};
use crate::secrets::{KNOWN_KEYS, KeyringSecretStore};

/// Store one credential in the OS keyring
pub fn cmd_set_secret(key: &str, value: &str) -> anyhow::Result<()> {
    KeyringSecretStore
        .set(key, value)
        .with_context(format!("while storing {key}"))?;

    println!("Stored {key} in the system keyring.");
    if let Some((_, var)) = KNOWN_KEYS.iter().find(|(k, _)| *k == key)
        && std::env::var(var).is_ok_and(|v| !v.trim().is_empty())
    {
        println!("Note: {var} is set and takes precedence over the keyring.");
    }
    Ok(())
}

/// Remove one credential from the OS keyring
pub fn cmd_clear_secret(key: &str) -> anyhow::Result<()> {
    KeyringSecretStore
        .delete(key)
        .with_context(format!("while removing {key}"))?;
    println!("Removed {key} from the system keyring.");
    Ok(())
}

/// Poll the player bridge once
pub fn cmd_now_playing(config: &Config) -> anyhow::Result<()> {
    let source = CommandSource::from_config(&config.polling);
    let observation = source.poll()?;

    match observation.track {
        None => println!("No music playing ({})", source.describe()),
        Some(track) => {
            let state = if observation.is_playing { "Playing" } else { "Paused" };
            println!("{state}: {track}");
            if !track.album.is_empty() {
                println!("  Album: {}", track.album);
            }
            if let Some(id) = &track.source_id {
                println!("  Id:    {id}");
            }
        }
    }
    Ok(())
}
