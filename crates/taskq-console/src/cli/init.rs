/*
[INPUT]:  Target path, overwrite flag
[OUTPUT]: Starter YAML configuration file
[POS]:    CLI initialization layer
[UPDATE]: When ConsoleConfig schema changes
*/

use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::info;

use taskq_console::ConsoleConfig;
use taskq_console::registry::builtin_schemas;

/// Write a starter config: defaults plus the built-in task types as an
/// editable template for new ones.
pub fn run_init(output: &Path, force: bool) -> Result<()> {
    if output.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            output.display()
        );
    }

    let config = ConsoleConfig {
        task_types: builtin_schemas(),
        ..ConsoleConfig::default()
    };
    let yaml = config.to_yaml()?;

    if let Some(parent) = output.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(output, yaml)
        .with_context(|| format!("failed to write config to {}", output.display()))?;

    info!(path = %output.display(), "configuration written");
    println!("Configuration written to: {}", output.display());
    Ok(())
}
