use clap::Parser;
use formsly::domain::{extract_quantity, extract_unit};
use serde_json::json;

use super::terminal::{Colorize, OutputFormat, print_json, print_table};

#[derive(Debug, Parser)]
pub struct Unit {
    /// Item labels, e.g. "Cement (1,500 bags)"
    #[arg(required = true)]
    labels: Vec<String>,

    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

impl Unit {
    pub fn run(self) -> anyhow::Result<()> {
        match self.output {
            OutputFormat::Json => {
                let parsed: Vec<_> = self
                    .labels
                    .iter()
                    .map(|label| {
                        json!({
                            "label": label,
                            "quantity": extract_quantity(label),
                            "unit": extract_unit(label),
                        })
                    })
                    .collect();
                print_json(&parsed)
            }
            OutputFormat::Table => {
                let rows: Vec<Vec<String>> = self
                    .labels
                    .iter()
                    .map(|label| {
                        vec![
                            label.clone(),
                            extract_quantity(label).map_or_else(|| "-".dim(), |q| q.to_string()),
                            extract_unit(label).unwrap_or_else(|| "-".dim()),
                        ]
                    })
                    .collect();
                print_table(&["Label", "Quantity", "Unit"], &rows);
                Ok(())
            }
        }
    }
}
