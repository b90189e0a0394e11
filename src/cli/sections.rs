use std::path::PathBuf;

use clap::Parser;
use formsly::{Directory, Repository};
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use super::terminal::{Colorize, OutputFormat, print_json};

#[derive(Debug, Parser)]
pub struct Sections {
    /// The request to show
    request: Uuid,

    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

impl Sections {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let directory = Directory::open(root);
        let request = directory.fetch_request_with_responses(self.request)?;
        let groups = request.duplicate_sections();

        match self.output {
            OutputFormat::Json => {
                let groups: Vec<_> = groups
                    .iter()
                    .map(|group| {
                        let fields: Vec<_> = group
                            .fields
                            .iter()
                            .map(|slot| {
                                json!({
                                    "field": slot.field.name,
                                    "value": slot.response.map(formsly::Response::value),
                                })
                            })
                            .collect();
                        json!({
                            "section": group.section.name,
                            "instance": group.id,
                            "fields": fields,
                        })
                    })
                    .collect();
                print_json(&groups)?;
            }
            OutputFormat::Table => {
                println!("{} ({})", request.form.name, request.status);
                for group in &groups {
                    println!();
                    println!("{} {}", group.section.name, group.id.to_string().dim());
                    for slot in &group.fields {
                        let value = slot
                            .response
                            .map_or_else(|| "-".dim(), formsly::Response::as_text);
                        println!("  {}: {value}", slot.field.name);
                    }
                }
            }
        }
        Ok(())
    }
}
