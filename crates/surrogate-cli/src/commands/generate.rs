//! `surrogate generate`: synthesize one proxy class.

use std::fs;
use std::path::Path;

use anyhow::Context;
use surrogate_engine::{ClassDescriptor, GeneratorConfig, Materializer, ProxyGenerator, SourceEmitter};

use crate::OutputFormat;

pub fn execute(
    descriptor_path: &Path,
    strategy: &str,
    config_path: Option<&Path>,
    format: OutputFormat,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let config = match config_path {
        Some(path) => GeneratorConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => GeneratorConfig::default(),
    };

    let descriptor = ClassDescriptor::from_file(descriptor_path)
        .with_context(|| format!("Failed to load descriptor {}", descriptor_path.display()))?;

    let class = ProxyGenerator::with_config(&config).generate(&descriptor, strategy)?;
    tracing::info!(proxy = %class.name, strategy = %class.strategy, "generated proxy class");

    let rendered = match format {
        OutputFormat::Source => SourceEmitter::with_config(&config.emit).materialize(&class)?,
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(&class)?;
            json.push('\n');
            json
        }
    };

    match output {
        Some(path) => {
            fs::write(path, &rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Wrote {} to {}", class.name, path.display());
        }
        None => print!("{rendered}"),
    }

    Ok(())
}
