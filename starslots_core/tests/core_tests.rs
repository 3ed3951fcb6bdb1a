use starslots_core::{
    resolve, AnimationConfig, MemoryStore, Paytable, ReelOutcome, ReelSource, SeededReels,
    Session, SessionStore, SlotMachine, SpinRefused, Symbol, MAX_BET, MIN_BET,
};

#[test]
fn seeded_reels_repeatable() {
    let mut a = SeededReels::new("s", "c", 42);
    let mut b = SeededReels::new("s", "c", 42);
    for _ in 0..10 {
        assert_eq!(a.draw(), b.draw());
    }
}

#[test]
fn documented_payouts() {
    let table = Paytable::star_slots_default();
    assert_eq!(resolve(&ReelOutcome::triple(Symbol::Diamond), 10, &table), 500);
    assert_eq!(resolve(&ReelOutcome::triple(Symbol::Cherry), 20, &table), 40);
    let mixed = ReelOutcome::new(Symbol::Seven, Symbol::Seven, Symbol::Diamond);
    assert_eq!(resolve(&mixed, 100, &table), 0);
}

#[test]
fn balance_equation_holds_over_long_session() {
    let store = SessionStore::new(MemoryStore::new());
    let mut machine = SlotMachine::login(store, "sim", SeededReels::new("server", "client", 0))
        .unwrap()
        .with_animation(AnimationConfig::instant());
    machine.set_max_bet();
    for _ in 0..2000 {
        let before = machine.session().balance();
        let bet = machine.session().bet();
        match machine.spin_now() {
            Ok(result) => {
                assert_eq!(result.balance, before - bet + result.payout);
                assert_eq!(machine.session().balance(), result.balance);
            }
            Err(SpinRefused::InsufficientFunds { balance, .. }) => {
                assert_eq!(balance, before);
                assert!(balance < bet);
                break;
            }
            Err(SpinRefused::AlreadySpinning) => unreachable!("spin_now always settles"),
        }
        let s = machine.session();
        assert!(s.bet() >= MIN_BET && s.bet() <= MAX_BET);
        assert_eq!(s.bet() % 10, 0);
        assert!(s.balance() < MIN_BET || s.bet() <= s.balance());
    }
}

#[test]
fn rtp_simulation_smoke() {
    let table = Paytable::star_slots_default();
    let mut reels = SeededReels::new("server", "client", 0);
    let mut total_bet = 0u64;
    let mut total_payout = 0u64;
    for _ in 0..10_000 {
        let (_, payout) = starslots_core::spin_once(&mut reels, &table, 10);
        total_bet += 10;
        total_payout += payout;
    }
    // every triple has probability 1/64 and the mean multiplier is 12.5
    let rtp = total_payout as f64 / total_bet as f64;
    assert!(rtp > 0.05 && rtp < 0.5, "rtp {rtp}");
}

#[test]
fn forced_sevens_scenario() {
    let store = SessionStore::new(MemoryStore::new());
    let mut machine = SlotMachine::new(
        Session::new("ana"),
        store,
        starslots_core::FixedReels::always(ReelOutcome::triple(Symbol::Seven)),
    );
    let result = machine.spin_now().unwrap();
    assert_eq!((result.payout, result.balance), (100, 1090));
}
