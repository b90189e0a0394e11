use std::path::PathBuf;

use clap::Parser;
use formsly::{Directory, NamedEntityRepository, storage::NamedEntityKind};
use tracing::instrument;

use super::terminal::{Colorize, OutputFormat, print_json, print_table};

#[derive(Debug, Parser)]
pub struct Entities {
    /// Which list to show
    kind: NamedEntityKind,

    /// Report whether this name is already taken instead of listing
    #[arg(long, value_name = "NAME")]
    check: Option<String>,

    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

impl Entities {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let directory = Directory::open(root);

        if let Some(name) = self.check {
            if directory.check_duplicate(self.kind, &name)? {
                println!("{}", format!("'{name}' is already a {}", self.kind).warning());
            } else {
                println!("{}", format!("'{name}' is available").success());
            }
            return Ok(());
        }

        let entities = directory.fetch_list(self.kind)?;
        match self.output {
            OutputFormat::Json => print_json(&entities)?,
            OutputFormat::Table => {
                if entities.is_empty() {
                    println!("No {} records found.", self.kind);
                    return Ok(());
                }
                let rows: Vec<Vec<String>> = entities
                    .iter()
                    .map(|entity| {
                        vec![
                            entity.name.clone(),
                            if entity.is_available { "yes" } else { "no" }.to_string(),
                            entity.id.to_string(),
                        ]
                    })
                    .collect();
                print_table(&["Name", "Available", "Id"], &rows);
            }
        }
        Ok(())
    }
}
