//! The per-session slot machine: bet controls, the `Idle -> Spinning -> Idle`
//! cycle and balance bookkeeping.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

use crate::{
    animator::{AnimationConfig, AnimationState, SpinAnimator},
    engine::{resolve, SpinResult},
    error::StoreResult,
    paytable::Paytable,
    rng::ReelSource,
    session::Session,
    store::{KeyValueStore, SessionStore},
    symbols::ReelOutcome,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MachineState {
    Idle,
    Spinning,
}

/// Why a spin request was ignored. Nothing changes when this is returned.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinRefused {
    #[error("a spin is already in progress")]
    AlreadySpinning,
    #[error("balance {balance} does not cover bet {bet}")]
    InsufficientFunds { balance: u64, bet: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BalanceReason {
    BetPlaced,
    Payout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceChange {
    pub previous: u64,
    pub current: u64,
    pub reason: BalanceReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpinEvent {
    Frame {
        frame: u32,
        frames: u32,
        reels: ReelOutcome,
    },
    Landed {
        reels: ReelOutcome,
    },
    Settled(SpinResult),
}

type BalanceCallback = Box<dyn FnMut(&BalanceChange)>;

struct ActiveSpin {
    bet: u64,
    animator: SpinAnimator,
}

pub struct SlotMachine<K, R> {
    session: Session,
    store: SessionStore<K>,
    reels: R,
    paytable: Paytable,
    animation: AnimationConfig,
    active: Option<ActiveSpin>,
    displayed: ReelOutcome,
    last_win: u64,
    subscribers: Vec<(SubscriptionId, BalanceCallback)>,
    next_subscription: u64,
}

impl<K: KeyValueStore, R: ReelSource> SlotMachine<K, R> {
    pub fn new(session: Session, store: SessionStore<K>, mut reels: R) -> Self {
        let displayed = reels.draw();
        Self {
            session,
            store,
            reels,
            paytable: Paytable::default(),
            animation: AnimationConfig::default(),
            active: None,
            displayed,
            last_win: 0,
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Picks up the stored session. `Ok(None)` means the player has to log in.
    pub fn resume(store: SessionStore<K>, reels: R) -> StoreResult<Option<Self>> {
        Ok(store
            .load()?
            .map(|session| Self::new(session, store, reels)))
    }

    pub fn login(mut store: SessionStore<K>, display_name: &str, reels: R) -> StoreResult<Self> {
        let session = store.login(display_name)?;
        info!(user = %session.display_name, balance = session.balance(), "logged in");
        Ok(Self::new(session, store, reels))
    }

    /// Ends the session, abandoning any spin in flight.
    pub fn logout(mut self) -> StoreResult<SessionStore<K>> {
        if self.active.is_some() {
            debug!("logout while spinning; bet stays debited");
        }
        self.store.logout()?;
        info!(user = %self.session.display_name, "logged out");
        Ok(self.store)
    }

    pub fn with_paytable(mut self, paytable: Paytable) -> Self {
        self.paytable = paytable;
        self
    }

    pub fn with_animation(mut self, animation: AnimationConfig) -> Self {
        self.animation = animation;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn paytable(&self) -> &Paytable {
        &self.paytable
    }

    pub fn animation(&self) -> &AnimationConfig {
        &self.animation
    }

    pub fn state(&self) -> MachineState {
        if self.active.is_some() {
            MachineState::Spinning
        } else {
            MachineState::Idle
        }
    }

    pub fn is_spinning(&self) -> bool {
        self.active.is_some()
    }

    /// Whatever the reels currently show, transient frames included.
    pub fn displayed_reels(&self) -> ReelOutcome {
        self.displayed
    }

    /// Winnings of the most recent settled spin.
    pub fn last_win(&self) -> u64 {
        self.last_win
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&BalanceChange) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    pub fn increase_bet(&mut self) -> bool {
        self.adjust_bet("increase", Session::increase_bet)
    }

    pub fn decrease_bet(&mut self) -> bool {
        self.adjust_bet("decrease", Session::decrease_bet)
    }

    pub fn set_max_bet(&mut self) -> bool {
        self.adjust_bet("max", Session::set_max_bet)
    }

    pub fn set_bet(&mut self, value: u64) -> bool {
        self.adjust_bet("set", |s| s.set_bet(value))
    }

    fn adjust_bet(&mut self, action: &str, f: impl FnOnce(&mut Session) -> bool) -> bool {
        if self.is_spinning() {
            debug!(action, "bet change ignored while spinning");
            return false;
        }
        let changed = f(&mut self.session);
        debug!(action, changed, bet = self.session.bet(), "bet adjusted");
        changed
    }

    /// Debits the bet and starts the animation. Returns the bet placed.
    pub fn start_spin(&mut self) -> Result<u64, SpinRefused> {
        if self.is_spinning() {
            return Err(SpinRefused::AlreadySpinning);
        }
        if !self.session.can_afford_bet() {
            return Err(SpinRefused::InsufficientFunds {
                balance: self.session.balance(),
                bet: self.session.bet(),
            });
        }
        let previous = self.session.balance();
        let bet = self.session.debit_bet();
        self.last_win = 0;
        self.active = Some(ActiveSpin {
            bet,
            animator: SpinAnimator::new(self.animation),
        });
        info!(bet, balance = self.session.balance(), "spin started");
        self.balance_changed(previous, BalanceReason::BetPlaced);
        Ok(bet)
    }

    /// Wait before the next [`tick`](Self::tick); `None` when idle.
    pub fn next_delay(&self) -> Option<Duration> {
        self.active.as_ref().and_then(|a| a.animator.next_delay())
    }

    /// Advances the spin in flight. Idle machines return `None`.
    pub fn tick(&mut self) -> Option<SpinEvent> {
        let active = self.active.as_mut()?;
        let bet = active.bet;
        let state = active.animator.tick(&mut self.reels);
        self.displayed = state.reels();
        let event = match state {
            AnimationState::Spinning {
                frame,
                frames,
                reels,
            } => {
                debug!(frame, frames, %reels, "frame");
                SpinEvent::Frame {
                    frame,
                    frames,
                    reels,
                }
            }
            AnimationState::Landed { reels } => SpinEvent::Landed { reels },
            AnimationState::Finished { reels } => {
                self.active = None;
                SpinEvent::Settled(self.settle(reels, bet))
            }
        };
        Some(event)
    }

    /// Runs a whole spin without waiting between steps.
    pub fn spin_now(&mut self) -> Result<SpinResult, SpinRefused> {
        self.start_spin()?;
        loop {
            if let Some(SpinEvent::Settled(result)) = self.tick() {
                return Ok(result);
            }
        }
    }

    fn settle(&mut self, outcome: ReelOutcome, bet: u64) -> SpinResult {
        let payout = resolve(&outcome, bet, &self.paytable);
        if payout > 0 {
            let previous = self.session.balance();
            self.session.credit(payout);
            self.balance_changed(previous, BalanceReason::Payout);
        }
        self.session.clamp_bet();
        self.last_win = payout;
        if let Some(nonce) = self.reels.position() {
            if let Err(e) = self.store.save_reel_position(nonce) {
                error!(error = %e, nonce, "failed to persist reel nonce");
            }
        }
        info!(%outcome, bet, payout, balance = self.session.balance(), "spin settled");
        SpinResult {
            outcome,
            bet,
            payout,
            balance: self.session.balance(),
        }
    }

    fn balance_changed(&mut self, previous: u64, reason: BalanceReason) {
        if let Err(e) = self.store.save(&self.session) {
            error!(error = %e, "failed to persist balance");
        }
        let change = BalanceChange {
            previous,
            current: self.session.balance(),
            reason,
        };
        for (_, callback) in self.subscribers.iter_mut() {
            callback(&change);
        }
    }
}
