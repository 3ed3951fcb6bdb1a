use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::{Digest, Sha256};

use crate::symbols::{ReelOutcome, Symbol};

// Provably-fair reel draws:
// server_seed (secret) + client_seed + nonce -> HMAC-SHA256 -> bytes -> floats in [0,1)

pub type HmacSha256 = Hmac<Sha256>;

pub fn derive_hash_hex(input: &[u8]) -> String {
    hex::encode(Sha256::digest(input))
}

pub fn derive_floats(hmac_bytes: &[u8], count: usize) -> Vec<f64> {
    // Successive 4-byte chunks become u32s mapped onto [0,1)
    let mut out = Vec::with_capacity(count);
    let mut buffer = hmac_bytes.to_vec();
    let mut i = 0usize;
    while out.len() < count {
        if i + 4 > buffer.len() {
            // stretch deterministically by hashing what we already consumed
            buffer = Sha256::digest(&buffer).to_vec();
            i = 0;
            continue;
        }
        let chunk = &buffer[i..i + 4];
        let v = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        out.push((v as f64) / (u32::MAX as f64 + 1.0));
        i += 4;
    }
    out
}

fn symbol_from_float(f: f64) -> Symbol {
    let n = Symbol::ALL.len();
    let idx = ((f * n as f64).floor() as usize).min(n - 1);
    Symbol::ALL[idx]
}

/// Anything that can fill the reels. Each symbol must be an independent,
/// uniform pick from [`Symbol::ALL`] unless the source is scripted.
pub trait ReelSource {
    fn draw_symbol(&mut self) -> Symbol;

    fn draw(&mut self) -> ReelOutcome {
        ReelOutcome([self.draw_symbol(), self.draw_symbol(), self.draw_symbol()])
    }

    /// Resume point for replayable sources; `None` for live randomness.
    fn position(&self) -> Option<u64> {
        None
    }
}

impl<R: ReelSource + ?Sized> ReelSource for &mut R {
    fn draw_symbol(&mut self) -> Symbol {
        (**self).draw_symbol()
    }

    fn draw(&mut self) -> ReelOutcome {
        (**self).draw()
    }

    fn position(&self) -> Option<u64> {
        (**self).position()
    }
}

impl<R: ReelSource + ?Sized> ReelSource for Box<R> {
    fn draw_symbol(&mut self) -> Symbol {
        (**self).draw_symbol()
    }

    fn draw(&mut self) -> ReelOutcome {
        (**self).draw()
    }

    fn position(&self) -> Option<u64> {
        (**self).position()
    }
}

/// Draws from the thread-local OS-seeded generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadReels;

impl ReelSource for ThreadReels {
    fn draw_symbol(&mut self) -> Symbol {
        Symbol::ALL[rand::thread_rng().gen_range(0..Symbol::ALL.len())]
    }
}

/// Deterministic reels. Each nonce yields one outcome: its HMAC gives the
/// three symbols left to right, then the nonce advances. Single-symbol
/// draws walk the same three slots, so mixing them with whole draws never
/// reuses a nonce.
pub struct SeededReels {
    pub server_seed: String, // secret
    pub client_seed: String,
    pub nonce: u64,
    slot: usize,
}

impl SeededReels {
    pub fn new(server_seed: impl Into<String>, client_seed: impl Into<String>, nonce: u64) -> Self {
        Self {
            server_seed: server_seed.into(),
            client_seed: client_seed.into(),
            nonce,
            slot: 0,
        }
    }

    pub fn server_seed_hash_hex(&self) -> String {
        derive_hash_hex(self.server_seed.as_bytes())
    }

    pub fn hmac_bytes(&self) -> [u8; 32] {
        let mut mac = HmacSha256::new_from_slice(self.server_seed.as_bytes()).expect("HMAC key");
        let msg = format!("{}:{}", self.client_seed, self.nonce);
        mac.update(msg.as_bytes());
        let res = mac.finalize().into_bytes();
        let mut out = [0u8; 32];
        out.copy_from_slice(&res);
        out
    }

    /// The outcome for the current nonce, without advancing.
    pub fn peek(&self) -> ReelOutcome {
        let floats = derive_floats(&self.hmac_bytes(), 3);
        ReelOutcome([
            symbol_from_float(floats[0]),
            symbol_from_float(floats[1]),
            symbol_from_float(floats[2]),
        ])
    }

    fn advance(&mut self) {
        self.nonce += 1;
        self.slot = 0;
    }
}

impl ReelSource for SeededReels {
    fn draw_symbol(&mut self) -> Symbol {
        let symbol = self.peek().symbols()[self.slot];
        self.slot += 1;
        if self.slot == 3 {
            self.advance();
        }
        symbol
    }

    fn draw(&mut self) -> ReelOutcome {
        // a half-used nonce is abandoned rather than shared
        if self.slot != 0 {
            self.advance();
        }
        let outcome = self.peek();
        self.advance();
        outcome
    }

    /// Next unused nonce.
    fn position(&self) -> Option<u64> {
        Some(if self.slot == 0 { self.nonce } else { self.nonce + 1 })
    }
}

/// Replays scripted outcomes in order, wrapping around at the end.
#[derive(Debug, Clone)]
pub struct FixedReels {
    script: Vec<ReelOutcome>,
    pos: usize,
    slot: usize,
}

impl FixedReels {
    pub fn new(first: ReelOutcome, rest: impl IntoIterator<Item = ReelOutcome>) -> Self {
        let mut script = vec![first];
        script.extend(rest);
        Self {
            script,
            pos: 0,
            slot: 0,
        }
    }

    pub fn always(outcome: ReelOutcome) -> Self {
        Self::new(outcome, [])
    }

    fn current(&self) -> ReelOutcome {
        self.script[self.pos % self.script.len()]
    }

    fn advance(&mut self) {
        self.pos += 1;
        self.slot = 0;
    }
}

impl ReelSource for FixedReels {
    fn draw_symbol(&mut self) -> Symbol {
        let symbol = self.current().symbols()[self.slot];
        self.slot += 1;
        if self.slot == 3 {
            self.advance();
        }
        symbol
    }

    fn draw(&mut self) -> ReelOutcome {
        if self.slot != 0 {
            self.advance();
        }
        let outcome = self.current();
        self.advance();
        outcome
    }
}
