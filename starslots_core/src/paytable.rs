use crate::symbols::Symbol;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PayoutPattern {
    /// Three of the given symbol.
    Triple(Symbol),
    /// Any three matching symbols not covered by an earlier rule.
    AnyThreeSame,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PayoutRule {
    pub pattern: PayoutPattern,
    pub multiplier: u64,
}

impl PayoutRule {
    pub fn triple(symbol: Symbol, multiplier: u64) -> Self {
        Self {
            pattern: PayoutPattern::Triple(symbol),
            multiplier,
        }
    }
}

/// Ordered rule list; the first matching rule wins.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Paytable(pub Vec<PayoutRule>);

impl Paytable {
    pub fn star_slots_default() -> Self {
        Self(vec![
            PayoutRule::triple(Symbol::Cherry, 2),
            PayoutRule::triple(Symbol::Lemon, 3),
            PayoutRule::triple(Symbol::Orange, 4),
            PayoutRule::triple(Symbol::Watermelon, 5),
            PayoutRule::triple(Symbol::Grape, 6),
            PayoutRule::triple(Symbol::Seven, 10),
            PayoutRule::triple(Symbol::Star, 20),
            PayoutRule::triple(Symbol::Diamond, 50),
            PayoutRule {
                pattern: PayoutPattern::AnyThreeSame,
                multiplier: 2,
            },
        ])
    }

    pub fn rules(&self) -> &[PayoutRule] {
        &self.0
    }

    /// First three-of-a-kind rule for `symbol`.
    pub fn triple_rule(&self, symbol: Symbol) -> Option<&PayoutRule> {
        self.0
            .iter()
            .find(|r| r.pattern == PayoutPattern::Triple(symbol))
    }

    pub fn fallback_rule(&self) -> Option<&PayoutRule> {
        self.0
            .iter()
            .find(|r| r.pattern == PayoutPattern::AnyThreeSame)
    }

    /// Multiplier that applies to three of `symbol`, if any rule pays it.
    pub fn multiplier_for(&self, symbol: Symbol) -> Option<u64> {
        self.triple_rule(symbol)
            .or_else(|| self.fallback_rule())
            .map(|r| r.multiplier)
    }
}

impl Default for Paytable {
    fn default() -> Self {
        Self::star_slots_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_covers_every_symbol_before_fallback() {
        let table = Paytable::star_slots_default();
        for s in Symbol::ALL {
            assert!(table.triple_rule(s).is_some(), "{s} has no rule");
        }
        assert_eq!(
            table.rules().last().map(|r| r.pattern),
            Some(PayoutPattern::AnyThreeSame)
        );
    }

    #[test]
    fn fallback_applies_when_triple_rule_is_missing() {
        let table = Paytable(vec![
            PayoutRule::triple(Symbol::Seven, 10),
            PayoutRule {
                pattern: PayoutPattern::AnyThreeSame,
                multiplier: 2,
            },
        ]);
        assert_eq!(table.multiplier_for(Symbol::Seven), Some(10));
        assert_eq!(table.multiplier_for(Symbol::Grape), Some(2));
        assert_eq!(Paytable(vec![]).multiplier_for(Symbol::Grape), None);
    }
}
