pub mod animator;
pub mod engine;
pub mod error;
pub mod machine;
pub mod paytable;
pub mod rng;
pub mod session;
pub mod store;
pub mod symbols;

pub use crate::animator::{AnimationConfig, AnimationState, SpinAnimator};
pub use crate::engine::{resolve, spin_once, verify_outcome, SpinResult};
pub use crate::error::{StoreError, StoreResult};
pub use crate::machine::{
    BalanceChange, BalanceReason, MachineState, SlotMachine, SpinEvent, SpinRefused, SubscriptionId,
};
pub use crate::paytable::{Paytable, PayoutPattern, PayoutRule};
pub use crate::rng::{derive_floats, derive_hash_hex, FixedReels, ReelSource, SeededReels, ThreadReels};
pub use crate::session::{Session, BET_STEP, MAX_BET, MIN_BET, STARTING_BALANCE};
pub use crate::store::{
    FileStore, KeyValueStore, MemoryStore, SessionStore, BALANCE_KEY, REEL_NONCE_KEY,
    USER_KEY,
};
pub use crate::symbols::{glyph_for_id, ReelOutcome, Symbol, UNKNOWN_GLYPH};
