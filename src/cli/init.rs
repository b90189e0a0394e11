use std::{fs, path::Path};

use anyhow::Context;
use formsly::Config;
use tracing::instrument;

#[derive(Debug, clap::Parser)]
pub struct Init {}

impl Init {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let config_path = root.join("config.toml");
        if config_path.exists() {
            anyhow::bail!(
                "Directory already initialized (found existing {})",
                config_path.display()
            );
        }

        for dir in ["forms", "requests", "entities"] {
            fs::create_dir_all(root.join(dir))
                .with_context(|| format!("failed to create {dir} directory"))?;
        }

        Config::default()
            .save(&config_path)
            .context("failed to create config.toml")?;

        println!("Initialized data directory in {}", root.display());
        println!("  Created: config.toml");
        println!("  Created: forms/ requests/ entities/");
        Ok(())
    }
}
