use std::cell::Cell;
use std::io::Write;
use std::rc::Rc;
use std::str::FromStr;

use starslots_core::{KeyValueStore, ReelSource, SlotMachine, SpinEvent, SpinResult};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::render::{header_line, paytable_lines, refusal_line, Cue, Screen};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayCommand {
    Spin,
    Increase,
    Decrease,
    Max,
    Bet(u64),
    Mute,
    Status,
    Paytable,
    Help,
    Logout,
    Quit,
}

impl FromStr for PlayCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let word = parts.next().unwrap_or("spin").to_ascii_lowercase();
        let cmd = match word.as_str() {
            "spin" | "s" => PlayCommand::Spin,
            "+" | "up" => PlayCommand::Increase,
            "-" | "down" => PlayCommand::Decrease,
            "max" => PlayCommand::Max,
            "bet" => {
                let raw = parts.next().ok_or("usage: bet <amount>")?;
                let value = raw
                    .parse()
                    .map_err(|_| format!("not a bet amount: {raw}"))?;
                PlayCommand::Bet(value)
            }
            "mute" | "m" => PlayCommand::Mute,
            "status" => PlayCommand::Status,
            "paytable" | "pay" => PlayCommand::Paytable,
            "help" | "?" => PlayCommand::Help,
            "logout" => PlayCommand::Logout,
            "quit" | "q" | "exit" => PlayCommand::Quit,
            other => return Err(format!("unknown command: {other} (try `help`)")),
        };
        if let Some(extra) = parts.next() {
            return Err(format!("unexpected argument: {extra}"));
        }
        Ok(cmd)
    }
}

pub const HELP: &str = "commands: spin (or empty line), + / -, max, bet <n>, mute, status, paytable, logout, quit";

/// Runs one spin to completion, sleeping between animation steps unless
/// `instant` is set. Refusals are printed and yield `None`.
pub async fn drive_spin<K, R, W>(
    machine: &mut SlotMachine<K, R>,
    screen: &mut Screen<W>,
    instant: bool,
) -> anyhow::Result<Option<SpinResult>>
where
    K: KeyValueStore,
    R: ReelSource,
    W: Write,
{
    if let Err(refused) = machine.start_spin() {
        screen.line(&refusal_line(&refused))?;
        return Ok(None);
    }
    screen.cue(Cue::Spin);
    loop {
        if let Some(delay) = machine.next_delay() {
            if !instant && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
        match machine.tick() {
            Some(SpinEvent::Frame { reels, .. }) => screen.reels(&reels, "Spinning...")?,
            Some(SpinEvent::Landed { reels }) => screen.reels(&reels, "")?,
            Some(SpinEvent::Settled(result)) => {
                screen.result(&result)?;
                if result.is_win() {
                    screen.cue(Cue::Win);
                }
                return Ok(Some(result));
            }
            None => return Ok(None),
        }
    }
}

pub enum PlayExit {
    Quit,
    Logout,
}

/// Interactive game view. Commands come one per line from stdin.
pub async fn run<K, R, W>(
    machine: &mut SlotMachine<K, R>,
    screen: &mut Screen<W>,
    instant: bool,
) -> anyhow::Result<PlayExit>
where
    K: KeyValueStore,
    R: ReelSource,
    W: Write,
{
    // header display tracks balance changes
    let header = Rc::new(Cell::new(machine.session().balance()));
    let sink = Rc::clone(&header);
    let subscription = machine.subscribe(move |change| sink.set(change.current));

    let name = machine.session().display_name.clone();
    screen.line(&header_line(&name, header.get()))?;
    screen.line(&format!("{}  BET: {}", machine.displayed_reels(), machine.session().bet()))?;
    screen.line("Place your bet and spin!")?;
    screen.line(HELP)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let exit = loop {
        let Some(input) = lines.next_line().await? else {
            break PlayExit::Quit;
        };
        let cmd = match input.parse::<PlayCommand>() {
            Ok(cmd) => cmd,
            Err(msg) => {
                screen.line(&msg)?;
                continue;
            }
        };
        match cmd {
            PlayCommand::Spin => {
                drive_spin(machine, screen, instant).await?;
                screen.line(&header_line(&name, header.get()))?;
            }
            PlayCommand::Increase => bet_feedback(screen, machine.increase_bet(), machine.session().bet())?,
            PlayCommand::Decrease => bet_feedback(screen, machine.decrease_bet(), machine.session().bet())?,
            PlayCommand::Max => bet_feedback(screen, machine.set_max_bet(), machine.session().bet())?,
            PlayCommand::Bet(value) => bet_feedback(screen, machine.set_bet(value), machine.session().bet())?,
            PlayCommand::Mute => {
                let on = screen.toggle_sound();
                screen.line(if on { "Sound on" } else { "Sound muted" })?;
            }
            PlayCommand::Status => {
                screen.line(&header_line(&name, header.get()))?;
                let sound = if screen.sound_enabled() { "on" } else { "muted" };
                screen.line(&format!(
                    "{}  BET: {} (max {})  sound {}",
                    machine.displayed_reels(),
                    machine.session().bet(),
                    machine.session().bet_cap(),
                    sound
                ))?;
            }
            PlayCommand::Paytable => {
                for line in paytable_lines(machine.paytable()) {
                    screen.line(&line)?;
                }
            }
            PlayCommand::Help => screen.line(HELP)?,
            PlayCommand::Logout => break PlayExit::Logout,
            PlayCommand::Quit => break PlayExit::Quit,
        }
    };
    machine.unsubscribe(subscription);
    Ok(exit)
}

fn bet_feedback<W: Write>(screen: &mut Screen<W>, changed: bool, bet: u64) -> std::io::Result<()> {
    if changed {
        screen.line(&format!("BET: {bet}"))
    } else {
        screen.line(&format!("BET: {bet} (unchanged)"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use starslots_core::{
        AnimationConfig, FixedReels, MemoryStore, ReelOutcome, Session, SessionStore, Symbol,
    };

    #[test]
    fn parses_commands() {
        assert_eq!("".parse::<PlayCommand>(), Ok(PlayCommand::Spin));
        assert_eq!(" + ".parse::<PlayCommand>(), Ok(PlayCommand::Increase));
        assert_eq!("BET 40".parse::<PlayCommand>(), Ok(PlayCommand::Bet(40)));
        assert_eq!("q".parse::<PlayCommand>(), Ok(PlayCommand::Quit));
        assert!("bet".parse::<PlayCommand>().is_err());
        assert!("bet ten".parse::<PlayCommand>().is_err());
        assert!("spin now".parse::<PlayCommand>().is_err());
        assert!("jackpot".parse::<PlayCommand>().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn drive_spin_settles_with_timer() {
        let store = SessionStore::new(MemoryStore::new());
        let mut machine = SlotMachine::new(
            Session::new("ana"),
            store,
            FixedReels::always(ReelOutcome::triple(Symbol::Seven)),
        )
        .with_animation(AnimationConfig::default());
        let mut screen = Screen::new(Vec::new(), true);
        let started = tokio::time::Instant::now();
        let result = drive_spin(&mut machine, &mut screen, false)
            .await
            .unwrap()
            .unwrap();
        let total = AnimationConfig::default().total_duration();
        let elapsed = started.elapsed();
        assert!(elapsed >= total && elapsed < total + std::time::Duration::from_millis(50));
        assert_eq!(result.balance, 1090);
        let out = String::from_utf8(screen.into_inner()).unwrap();
        assert_eq!(out.matches('\x07').count(), 2);
        assert!(out.contains("You won 100 stars!"));
    }

    #[tokio::test]
    async fn drive_spin_reports_refusal() {
        let store = SessionStore::new(MemoryStore::new());
        let mut machine = SlotMachine::new(
            Session::with_balance("ana", 5),
            store,
            FixedReels::always(ReelOutcome::triple(Symbol::Seven)),
        );
        let mut screen = Screen::new(Vec::new(), false);
        let result = drive_spin(&mut machine, &mut screen, true).await.unwrap();
        assert!(result.is_none());
        let out = String::from_utf8(screen.into_inner()).unwrap();
        assert!(out.contains("Not enough stars"));
        assert_eq!(machine.session().balance(), 5);
    }
}
