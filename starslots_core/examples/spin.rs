use starslots_core::{AnimationConfig, MemoryStore, SeededReels, SessionStore, SlotMachine};

fn main() {
    // Example end-to-end session with a replayable seed
    let reels = SeededReels::new("example-server-seed", "example-client-seed", 1);
    let commitment = reels.server_seed_hash_hex();
    let store = SessionStore::new(MemoryStore::new());
    let mut machine = SlotMachine::login(store, "demo", reels)
        .expect("memory store never fails")
        .with_animation(AnimationConfig::instant());
    machine.set_bet(30);
    for _ in 0..5 {
        match machine.spin_now() {
            Ok(result) => println!(
                "{} bet={} payout={} balance={} {}",
                result.outcome,
                result.bet,
                result.payout,
                result.balance,
                result.message()
            ),
            Err(refused) => println!("refused: {refused}"),
        }
    }
    println!("server_seed_hash={commitment}");
}
