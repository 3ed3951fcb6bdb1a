use serde::{Deserialize, Serialize};
use std::fmt;

/// Glyph shown for an id that is not in the symbol table.
pub const UNKNOWN_GLYPH: &str = "❓";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Symbol {
    Cherry,
    Lemon,
    Orange,
    Watermelon,
    Grape,
    Seven,
    Star,
    Diamond,
}

impl Symbol {
    /// Every symbol on a reel, in table order.
    pub const ALL: [Symbol; 8] = [
        Symbol::Cherry,
        Symbol::Lemon,
        Symbol::Orange,
        Symbol::Watermelon,
        Symbol::Grape,
        Symbol::Seven,
        Symbol::Star,
        Symbol::Diamond,
    ];

    pub fn from_index(i: u8) -> Self {
        Self::ALL[i as usize % Self::ALL.len()]
    }

    pub fn to_index(self) -> u8 {
        match self {
            Symbol::Cherry => 0,
            Symbol::Lemon => 1,
            Symbol::Orange => 2,
            Symbol::Watermelon => 3,
            Symbol::Grape => 4,
            Symbol::Seven => 5,
            Symbol::Star => 6,
            Symbol::Diamond => 7,
        }
    }

    pub fn id(self) -> &'static str {
        match self {
            Symbol::Cherry => "cherry",
            Symbol::Lemon => "lemon",
            Symbol::Orange => "orange",
            Symbol::Watermelon => "watermelon",
            Symbol::Grape => "grape",
            Symbol::Seven => "seven",
            Symbol::Star => "star",
            Symbol::Diamond => "diamond",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.id() == id)
    }

    /// Base value of the symbol. Display only; payouts come from the paytable.
    pub fn base_value(self) -> u64 {
        match self {
            Symbol::Cherry => 10,
            Symbol::Lemon => 20,
            Symbol::Orange => 30,
            Symbol::Watermelon => 40,
            Symbol::Grape => 50,
            Symbol::Seven => 100,
            Symbol::Star => 200,
            Symbol::Diamond => 300,
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Symbol::Cherry => "🍒",
            Symbol::Lemon => "🍋",
            Symbol::Orange => "🍊",
            Symbol::Watermelon => "🍉",
            Symbol::Grape => "🍇",
            Symbol::Seven => "7️⃣",
            Symbol::Star => "⭐",
            Symbol::Diamond => "💎",
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Glyph lookup by raw id, falling back to [`UNKNOWN_GLYPH`].
pub fn glyph_for_id(id: &str) -> &'static str {
    Symbol::from_id(id).map_or(UNKNOWN_GLYPH, Symbol::glyph)
}

/// The three visible reels after a draw, left to right.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ReelOutcome(pub [Symbol; 3]);

impl ReelOutcome {
    pub fn new(a: Symbol, b: Symbol, c: Symbol) -> Self {
        Self([a, b, c])
    }

    pub fn triple(symbol: Symbol) -> Self {
        Self([symbol; 3])
    }

    pub fn symbols(&self) -> [Symbol; 3] {
        self.0
    }

    /// The repeated symbol when all three reels match.
    pub fn matched(&self) -> Option<Symbol> {
        let [a, b, c] = self.0;
        (a == b && b == c).then_some(a)
    }

    pub fn glyphs(&self) -> [&'static str; 3] {
        self.0.map(Symbol::glyph)
    }
}

impl fmt::Display for ReelOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c] = self.glyphs();
        write!(f, "[ {a} | {b} | {c} ]")
    }
}
