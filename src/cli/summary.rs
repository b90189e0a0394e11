use std::path::PathBuf;

use clap::Parser;
use formsly::{
    Directory, Repository,
    domain::{Summary as ItemSummary, SummaryExtra},
};
use tracing::instrument;
use uuid::Uuid;

use super::terminal::{OutputFormat, money, print_json, print_table};

#[derive(Debug, Parser)]
pub struct Summary {
    /// The request to summarise
    request: Uuid,

    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

impl Summary {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let directory = Directory::open(root);
        let request = directory.fetch_request_with_responses(self.request)?;
        let Some(summary) = ItemSummary::for_request(&request, directory.config()) else {
            anyhow::bail!("'{}' is not a system-defined form", request.form.name);
        };

        match self.output {
            OutputFormat::Json => print_json(&summary)?,
            OutputFormat::Table => print_summary(&summary),
        }
        Ok(())
    }
}

fn print_summary(summary: &ItemSummary) {
    if summary.rows.is_empty() {
        println!("No items found.");
        return;
    }

    let rows: Vec<Vec<String>> = summary
        .rows
        .iter()
        .map(|row| {
            let mut cells = vec![
                row.item.clone(),
                row.quantity.to_string(),
                row.unit.clone().unwrap_or_default(),
            ];
            match &row.extra {
                SummaryExtra::Order {
                    cost_code,
                    gl_account,
                } => {
                    cells.push(cost_code.clone().unwrap_or_default());
                    cells.push(gl_account.clone().unwrap_or_default());
                }
                SummaryExtra::Quotation { price, total } => {
                    cells.push(money(*price));
                    cells.push(money(*total));
                }
                SummaryExtra::Receiving { status } => {
                    cells.push(status.clone().unwrap_or_default());
                }
            }
            cells
        })
        .collect();

    let headers: &[&str] = match summary.rows[0].extra {
        SummaryExtra::Order { .. } => &["Item", "Quantity", "Unit", "Cost Code", "GL Account"],
        SummaryExtra::Quotation { .. } => &["Item", "Quantity", "Unit", "Price", "Total"],
        SummaryExtra::Receiving { .. } => &["Item", "Quantity", "Unit", "Status"],
    };
    print_table(headers, &rows);

    if let Some(total) = summary.grand_total {
        println!();
        println!("Grand total: {}", money(total));
    }
}
