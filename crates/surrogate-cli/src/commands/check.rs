//! `surrogate check`: validate a descriptor against every strategy.

use std::path::Path;

use anyhow::Context;
use surrogate_engine::{ClassDescriptor, ProxyGenerator, ProxyStrategy};

pub fn execute(descriptor_path: &Path) -> anyhow::Result<()> {
    let descriptor = ClassDescriptor::from_file(descriptor_path)
        .with_context(|| format!("Failed to load descriptor {}", descriptor_path.display()))?;

    println!(
        "{} ({} methods, {} properties)",
        descriptor.name,
        descriptor.proxyable_methods().count(),
        descriptor.mirrored_properties().count()
    );

    let generator = ProxyGenerator::new();
    for strategy in ProxyStrategy::ALL {
        match generator.generate(&descriptor, strategy.as_str()) {
            Ok(_) => println!("  {strategy}: ok"),
            Err(e) => println!("  {strategy}: {e}"),
        }
    }

    Ok(())
}
