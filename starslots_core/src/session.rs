use serde::Serialize;

pub const STARTING_BALANCE: u64 = 1000;
pub const MIN_BET: u64 = 10;
pub const MAX_BET: u64 = 100;
pub const BET_STEP: u64 = 10;

/// The logged-in player's game state.
///
/// The bet is kept a multiple of [`BET_STEP`] inside
/// `[MIN_BET, min(MAX_BET, balance)]`. When the balance drops under
/// `MIN_BET` that range is empty; the bet then rests at `MIN_BET` and
/// spins are refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub display_name: String,
    balance: u64,
    bet: u64,
}

impl Session {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self::with_balance(display_name, STARTING_BALANCE)
    }

    pub fn with_balance(display_name: impl Into<String>, balance: u64) -> Self {
        let mut session = Self {
            display_name: display_name.into(),
            balance,
            bet: MIN_BET,
        };
        session.clamp_bet();
        session
    }

    pub fn balance(&self) -> u64 {
        self.balance
    }

    pub fn bet(&self) -> u64 {
        self.bet
    }

    /// Highest bet the balance allows, on the step grid.
    pub fn bet_cap(&self) -> u64 {
        let cap = self.balance.min(MAX_BET);
        (cap - cap % BET_STEP).max(MIN_BET)
    }

    pub fn can_afford_bet(&self) -> bool {
        self.balance >= self.bet
    }

    pub fn increase_bet(&mut self) -> bool {
        self.set_bet(self.bet.saturating_add(BET_STEP))
    }

    pub fn decrease_bet(&mut self) -> bool {
        self.set_bet(self.bet.saturating_sub(BET_STEP))
    }

    pub fn set_max_bet(&mut self) -> bool {
        self.set_bet(self.bet_cap())
    }

    /// Slider input: snapped down to the step grid and clamped.
    /// Returns whether the bet changed.
    pub fn set_bet(&mut self, value: u64) -> bool {
        let snapped = value - value % BET_STEP;
        let next = snapped.clamp(MIN_BET, self.bet_cap());
        let changed = next != self.bet;
        self.bet = next;
        changed
    }

    /// Takes the current bet off the balance. Callers check
    /// [`can_afford_bet`](Self::can_afford_bet) first.
    pub(crate) fn debit_bet(&mut self) -> u64 {
        let bet = self.bet;
        self.balance = self.balance.saturating_sub(bet);
        bet
    }

    pub(crate) fn credit(&mut self, amount: u64) {
        self.balance = self.balance.saturating_add(amount);
    }

    /// Re-apply the bet bounds after the balance moved.
    pub(crate) fn clamp_bet(&mut self) {
        self.bet = self.bet.clamp(MIN_BET, self.bet_cap());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_defaults() {
        let s = Session::new("ana");
        assert_eq!(s.balance(), 1000);
        assert_eq!(s.bet(), 10);
        assert_eq!(s.bet_cap(), 100);
    }

    #[test]
    fn increase_stops_at_cap() {
        let mut s = Session::new("ana");
        for _ in 0..9 {
            assert!(s.increase_bet());
        }
        assert_eq!(s.bet(), 100);
        assert!(!s.increase_bet());
        assert_eq!(s.bet(), 100);
    }

    #[test]
    fn decrease_stops_at_min() {
        let mut s = Session::new("ana");
        assert!(!s.decrease_bet());
        assert_eq!(s.bet(), 10);
    }

    #[test]
    fn cap_follows_small_balance() {
        let mut s = Session::with_balance("ana", 45);
        assert_eq!(s.bet_cap(), 40);
        assert!(s.set_max_bet());
        assert_eq!(s.bet(), 40);
        assert!(!s.increase_bet());
    }

    #[test]
    fn slider_snaps_and_clamps() {
        let mut s = Session::new("ana");
        assert!(s.set_bet(57));
        assert_eq!(s.bet(), 50);
        s.set_bet(5000);
        assert_eq!(s.bet(), 100);
        s.set_bet(0);
        assert_eq!(s.bet(), 10);
        assert!(!s.set_bet(19));
    }

    #[test]
    fn broke_session_keeps_min_bet() {
        let s = Session::with_balance("ana", 5);
        assert_eq!(s.bet(), 10);
        assert!(!s.can_afford_bet());
    }

    #[test]
    fn odd_balance_keeps_bet_on_grid() {
        let mut s = Session::with_balance("ana", 7);
        assert_eq!(s.bet(), MIN_BET);
        assert!(!s.can_afford_bet());
        assert!(!s.set_bet(7));
        assert_eq!(s.bet(), MIN_BET);
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["bet"], 10);
    }

    #[test]
    fn clamp_after_balance_drop() {
        let mut s = Session::with_balance("ana", 200);
        s.set_max_bet();
        s.debit_bet();
        s.debit_bet();
        assert_eq!(s.balance(), 0);
        s.clamp_bet();
        assert_eq!(s.bet(), 10);
        s.credit(70);
        s.clamp_bet();
        assert_eq!(s.bet(), 10);
        assert!(s.set_max_bet());
        assert_eq!(s.bet(), 70);
    }
}
