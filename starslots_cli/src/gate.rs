//! Login and the logged-in check in front of `spin` and `play`.

use std::io::Write;

use anyhow::bail;
use starslots_core::{KeyValueStore, ReelSource, SessionStore, SlotMachine};
use tracing::info;

use crate::render::Screen;

pub const LOGIN_HINT: &str = "Not logged in. Run `starslots-cli login <NAME>` first.";

/// Stores a new player. Returns the trimmed name, or `None` when someone
/// is already logged in; their session is left untouched.
pub fn login<K, W>(
    store: &mut SessionStore<K>,
    screen: &mut Screen<W>,
    raw_name: &str,
) -> anyhow::Result<Option<String>>
where
    K: KeyValueStore,
    W: Write,
{
    let name = raw_name.trim();
    if name.is_empty() {
        bail!("username must not be empty");
    }
    if let Some(existing) = store.load()? {
        screen.line(&format!(
            "Already logged in as {}. Log out first to switch players.",
            existing.display_name
        ))?;
        return Ok(None);
    }
    store.login(name)?;
    info!(user = name, "logged in");
    screen.line("Logging in...")?;
    Ok(Some(name.to_string()))
}

/// Builds the machine for the stored player. `reels` gets the player's name
/// and the stored reel nonce. Prints [`LOGIN_HINT`] when nobody is logged in.
pub fn resume<K, R, W>(
    store: SessionStore<K>,
    screen: &mut Screen<W>,
    reels: impl FnOnce(&str, u64) -> R,
) -> anyhow::Result<Option<SlotMachine<K, R>>>
where
    K: KeyValueStore,
    R: ReelSource,
    W: Write,
{
    let Some(session) = store.load()? else {
        screen.line(LOGIN_HINT)?;
        return Ok(None);
    };
    let nonce = store.load_reel_position()?;
    let reels = reels(&session.display_name, nonce);
    Ok(Some(SlotMachine::new(session, store, reels)))
}
