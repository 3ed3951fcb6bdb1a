mod gate;
mod play;
mod render;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use starslots_core::{
    AnimationConfig, FileStore, ReelSource, SeededReels, SessionStore, SlotMachine, ThreadReels,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::play::PlayExit;
use crate::render::{header_line, paytable_lines, symbol_legend, Screen};

#[derive(Parser)]
#[command(name = "starslots-cli", about = "Star Slots in the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Local storage file, default star-slots.json
    #[arg(long, env = "STAR_SLOTS_STORE", default_value = "star-slots.json")]
    store: PathBuf,
    /// Server seed for replayable reels; the username is the client seed
    #[arg(long, env = "STAR_SLOTS_SEED")]
    seed: Option<String>,
    #[arg(long, default_value_t = AnimationConfig::DEFAULT_SPIN_MS)]
    spin_ms: u64,
    #[arg(long, default_value_t = AnimationConfig::DEFAULT_TICK_MS)]
    tick_ms: u64,
    #[arg(long, default_value_t = AnimationConfig::DEFAULT_SETTLE_MS)]
    settle_ms: u64,
    #[arg(long, default_value_t = 800)]
    login_delay_ms: u64,
    /// Skip every delay
    #[arg(long)]
    instant: bool,
    /// Start with sound off
    #[arg(long)]
    mute: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a session with 1000 stars
    Login { name: String },
    /// End the current session
    Logout,
    /// Show who is logged in and their balance
    Status,
    /// List symbols and payout multipliers
    Paytable,
    /// Spin once
    Spin {
        /// Bet to place, snapped to steps of 10
        #[arg(long)]
        bet: Option<u64>,
    },
    /// Interactive game
    Play,
}

type Machine = SlotMachine<FileStore, Box<dyn ReelSource>>;

impl Cli {
    fn animation(&self) -> AnimationConfig {
        if self.instant {
            AnimationConfig::instant()
        } else {
            AnimationConfig::from_millis(self.spin_ms, self.tick_ms, self.settle_ms)
        }
    }

    fn session_store(&self) -> anyhow::Result<SessionStore<FileStore>> {
        Ok(SessionStore::new(FileStore::open(&self.store)?))
    }

    fn reels_for(&self, name: &str, nonce: u64) -> Box<dyn ReelSource> {
        match &self.seed {
            Some(seed) => {
                let reels = SeededReels::new(seed.as_str(), name, nonce);
                info!(commitment = %reels.server_seed_hash_hex(), nonce, "seeded reels");
                Box::new(reels)
            }
            None => Box::new(ThreadReels),
        }
    }

    /// The stored session, or `None` after telling the user to log in.
    fn resume<W: io::Write>(&self, screen: &mut Screen<W>) -> anyhow::Result<Option<Machine>> {
        let machine = gate::resume(self.session_store()?, screen, |name, nonce| {
            self.reels_for(name, nonce)
        })?;
        Ok(machine.map(|m| m.with_animation(self.animation())))
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();
    let cli = Cli::parse();
    let mut screen = Screen::new(io::stdout(), !cli.mute);

    match &cli.command {
        Commands::Login { name } => {
            let mut store = cli.session_store()?;
            let Some(name) = gate::login(&mut store, &mut screen, name)? else {
                return Ok(());
            };
            if !cli.instant {
                tokio::time::sleep(Duration::from_millis(cli.login_delay_ms)).await;
            }
            screen.line(&header_line(&name, starslots_core::STARTING_BALANCE))?;
        }
        Commands::Logout => {
            let mut store = cli.session_store()?;
            store.logout()?;
            screen.line("Logged out.")?;
        }
        Commands::Status => match cli.session_store()?.load()? {
            Some(session) => {
                screen.line(&header_line(&session.display_name, session.balance()))?;
            }
            None => screen.line("Not logged in.")?,
        },
        Commands::Paytable => {
            screen.line(&symbol_legend())?;
            for line in paytable_lines(&starslots_core::Paytable::default()) {
                screen.line(&line)?;
            }
        }
        Commands::Spin { bet } => {
            let Some(mut machine) = cli.resume(&mut screen)? else {
                return Ok(());
            };
            if let Some(bet) = bet {
                machine.set_bet(*bet);
            }
            screen.line(&format!("BET: {}", machine.session().bet()))?;
            play::drive_spin(&mut machine, &mut screen, cli.instant).await?;
            let session = machine.session();
            screen.line(&header_line(&session.display_name, session.balance()))?;
        }
        Commands::Play => {
            let Some(mut machine) = cli.resume(&mut screen)? else {
                return Ok(());
            };
            if let PlayExit::Logout = play::run(&mut machine, &mut screen, cli.instant).await? {
                machine.logout()?;
                screen.line("Logged out.")?;
            }
        }
    }
    Ok(())
}
