//! `surrogate strategies`: list registered strategies.

use surrogate_engine::ProxyGenerator;

pub fn execute() -> anyhow::Result<()> {
    let generator = ProxyGenerator::new();
    for strategy in generator.registry().kinds() {
        let delegates = generator
            .registry()
            .get(strategy)
            .is_some_and(|entry| entry.policy.requires_backing);
        let note = if delegates {
            "wraps the original implementation with prefix/suffix hooks"
        } else {
            "every method returns null"
        };
        println!("{strategy:<20} {note}");
    }
    Ok(())
}
