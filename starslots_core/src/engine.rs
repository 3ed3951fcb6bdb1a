use serde::{Deserialize, Serialize};

use crate::{
    paytable::Paytable,
    rng::{ReelSource, SeededReels},
    symbols::ReelOutcome,
};

/// Payout for a settled outcome. Pure: non-matching reels pay nothing,
/// three of a kind pay `bet` times the first applicable rule.
pub fn resolve(outcome: &ReelOutcome, bet: u64, paytable: &Paytable) -> u64 {
    let Some(symbol) = outcome.matched() else {
        return 0;
    };
    paytable
        .multiplier_for(symbol)
        .map_or(0, |m| bet.saturating_mul(m))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpinResult {
    pub outcome: ReelOutcome,
    pub bet: u64,
    pub payout: u64,
    /// Balance after the payout was credited.
    pub balance: u64,
}

impl SpinResult {
    pub fn is_win(&self) -> bool {
        self.payout > 0
    }

    pub fn message(&self) -> String {
        if self.is_win() {
            format!("You won {} stars!", self.payout)
        } else {
            "Try again!".to_string()
        }
    }
}

/// Draw and score one outcome with no animation or balance bookkeeping.
pub fn spin_once<R: ReelSource + ?Sized>(
    reels: &mut R,
    paytable: &Paytable,
    bet: u64,
) -> (ReelOutcome, u64) {
    let outcome = reels.draw();
    let payout = resolve(&outcome, bet, paytable);
    (outcome, payout)
}

/// Verify that an outcome is what the seeds would have produced.
pub fn verify_outcome(
    server_seed: &str,
    client_seed: &str,
    nonce: u64,
    expected: &ReelOutcome,
) -> bool {
    SeededReels::new(server_seed, client_seed, nonce).peek() == *expected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paytable::{PayoutPattern, PayoutRule};
    use crate::symbols::Symbol;

    #[test]
    fn non_matching_pays_nothing() {
        let table = Paytable::star_slots_default();
        let outcome = ReelOutcome::new(Symbol::Diamond, Symbol::Diamond, Symbol::Star);
        assert_eq!(resolve(&outcome, 100, &table), 0);
    }

    #[test]
    fn diamond_and_cherry_multipliers() {
        let table = Paytable::star_slots_default();
        assert_eq!(resolve(&ReelOutcome::triple(Symbol::Diamond), 10, &table), 500);
        assert_eq!(resolve(&ReelOutcome::triple(Symbol::Cherry), 20, &table), 40);
    }

    #[test]
    fn every_symbol_uses_its_own_rule() {
        let table = Paytable::star_slots_default();
        let expected = [2, 3, 4, 5, 6, 10, 20, 50];
        for (s, m) in Symbol::ALL.into_iter().zip(expected) {
            assert_eq!(resolve(&ReelOutcome::triple(s), 10, &table), 10 * m);
        }
    }

    #[test]
    fn first_matching_rule_wins() {
        let table = Paytable(vec![
            PayoutRule::triple(Symbol::Grape, 6),
            PayoutRule::triple(Symbol::Grape, 99),
        ]);
        assert_eq!(resolve(&ReelOutcome::triple(Symbol::Grape), 10, &table), 60);
    }

    #[test]
    fn fallback_and_empty_tables() {
        let fallback_only = Paytable(vec![PayoutRule {
            pattern: PayoutPattern::AnyThreeSame,
            multiplier: 2,
        }]);
        assert_eq!(resolve(&ReelOutcome::triple(Symbol::Star), 30, &fallback_only), 60);
        assert_eq!(resolve(&ReelOutcome::triple(Symbol::Star), 30, &Paytable(vec![])), 0);
    }

    #[test]
    fn seeded_spin_verifies() {
        let table = Paytable::star_slots_default();
        let mut reels = SeededReels::new("server", "client", 3);
        let (outcome, payout) = spin_once(&mut reels, &table, 10);
        assert!(verify_outcome("server", "client", 3, &outcome));
        assert_eq!(payout, resolve(&outcome, 10, &table));
    }

    #[test]
    fn result_message() {
        let mut result = SpinResult {
            outcome: ReelOutcome::triple(Symbol::Seven),
            bet: 10,
            payout: 100,
            balance: 1090,
        };
        assert_eq!(result.message(), "You won 100 stars!");
        result.payout = 0;
        assert_eq!(result.message(), "Try again!");
    }
}
