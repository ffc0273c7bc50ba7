/// Coins needed to hatch one golden egg.
pub const COINS_PER_EGG: u32 = 10;

/// What a single earned coin turned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoinOutcome {
    /// The coin was added to the purse.
    Coin,
    /// The coin completed a set of ten and was exchanged for an egg.
    HatchedEgg,
}

/// Golden coin / egg counters.
///
/// `coins` always stays in `0..COINS_PER_EGG`; overflow is carried into `eggs`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewardLedger {
    coins: u32,
    eggs: u32,
}

impl RewardLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a ledger from raw totals, carrying extra coins into eggs.
    ///
    /// Used both for persisted values and for direct overwrites from the
    /// reward editor.
    #[must_use]
    pub fn from_totals(coins: u32, eggs: u32) -> Self {
        Self {
            coins: coins % COINS_PER_EGG,
            eggs: eggs.saturating_add(coins / COINS_PER_EGG),
        }
    }

    #[must_use]
    pub fn coins(&self) -> u32 {
        self.coins
    }

    #[must_use]
    pub fn eggs(&self) -> u32 {
        self.eggs
    }

    /// Record one earned coin.
    pub fn earn_coin(&mut self) -> CoinOutcome {
        let new_coins = self.coins + 1;
        let hatched = new_coins / COINS_PER_EGG;
        self.eggs = self.eggs.saturating_add(hatched);
        self.coins = new_coins % COINS_PER_EGG;
        if hatched > 0 {
            CoinOutcome::HatchedEgg
        } else {
            CoinOutcome::Coin
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ninth_coin_carries_into_an_egg() {
        let mut ledger = RewardLedger::from_totals(9, 2);
        assert_eq!(ledger.earn_coin(), CoinOutcome::HatchedEgg);
        assert_eq!(ledger.coins(), 0);
        assert_eq!(ledger.eggs(), 3);
    }

    #[test]
    fn coins_below_nine_just_increment() {
        for start in 0..9 {
            let mut ledger = RewardLedger::from_totals(start, 4);
            assert_eq!(ledger.earn_coin(), CoinOutcome::Coin);
            assert_eq!(ledger.coins(), start + 1);
            assert_eq!(ledger.eggs(), 4);
        }
    }

    #[test]
    fn totals_are_normalized() {
        let ledger = RewardLedger::from_totals(23, 1);
        assert_eq!(ledger.coins(), 3);
        assert_eq!(ledger.eggs(), 3);
    }

    #[test]
    fn twenty_coins_make_two_eggs() {
        let mut ledger = RewardLedger::new();
        for _ in 0..20 {
            ledger.earn_coin();
        }
        assert_eq!(ledger, RewardLedger::from_totals(0, 2));
    }
}
