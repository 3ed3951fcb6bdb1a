use std::io::{self, Write};

use starslots_core::{Paytable, PayoutPattern, ReelOutcome, SpinRefused, SpinResult, Symbol};
use tracing::debug;

/// `1234567` -> `1,234,567`
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn header_line(name: &str, balance: u64) -> String {
    format!("★ STAR SLOTS | ★ {} | Welcome, {}", group_thousands(balance), name)
}

pub fn refusal_line(refused: &SpinRefused) -> String {
    match refused {
        SpinRefused::AlreadySpinning => "Reels are still spinning.".to_string(),
        SpinRefused::InsufficientFunds { balance, bet } => format!(
            "Not enough stars: {} left, bet is {}.",
            group_thousands(*balance),
            bet
        ),
    }
}

pub fn paytable_lines(paytable: &Paytable) -> Vec<String> {
    let mut lines = Vec::new();
    for rule in paytable.rules() {
        let line = match rule.pattern {
            PayoutPattern::Triple(s) => format!(
                "{g} {g} {g}  {id:<10} x{m:<3} (value {v})",
                g = s.glyph(),
                id = s.id(),
                m = rule.multiplier,
                v = s.base_value()
            ),
            PayoutPattern::AnyThreeSame => {
                format!("any three  {:<10} x{}", "matching", rule.multiplier)
            }
        };
        lines.push(line);
    }
    lines
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Spin,
    Win,
}

/// Writes the game to a terminal. The bell stands in for sound effects.
pub struct Screen<W: Write> {
    out: W,
    sound: bool,
}

impl<W: Write> Screen<W> {
    pub fn new(out: W, sound: bool) -> Self {
        Self { out, sound }
    }

    pub fn sound_enabled(&self) -> bool {
        self.sound
    }

    pub fn toggle_sound(&mut self) -> bool {
        self.sound = !self.sound;
        self.sound
    }

    pub fn line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{text}")?;
        self.out.flush()
    }

    /// Redraws the reel row in place.
    pub fn reels(&mut self, reels: &ReelOutcome, status: &str) -> io::Result<()> {
        write!(self.out, "\r{reels}  {status:<16}")?;
        self.out.flush()
    }

    pub fn result(&mut self, result: &SpinResult) -> io::Result<()> {
        self.reels(&result.outcome, "")?;
        writeln!(self.out)?;
        if result.is_win() {
            writeln!(self.out, "WIN! +{} ★", group_thousands(result.payout))?;
        }
        writeln!(self.out, "{}", result.message())?;
        self.out.flush()
    }

    pub fn cue(&mut self, cue: Cue) {
        if !self.sound {
            return;
        }
        if let Err(e) = write!(self.out, "\x07").and_then(|_| self.out.flush()) {
            debug!(?cue, error = %e, "sound cue failed");
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

pub fn symbol_legend() -> String {
    Symbol::ALL
        .iter()
        .map(|s| format!("{} {}", s.glyph(), s.id()))
        .collect::<Vec<_>>()
        .join("  ")
}
