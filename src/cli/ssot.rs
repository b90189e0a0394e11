use std::path::PathBuf;

use clap::Parser;
use formsly::{Directory, domain::ssot::build_ssot};
use tracing::instrument;

use super::terminal::{Colorize, OutputFormat, money, print_json};

#[derive(Debug, Parser)]
pub struct Ssot {
    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

impl Ssot {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let directory = Directory::open(root);
        let requests = directory.requests()?;
        let rollup = build_ssot(&requests, directory.config());

        if let OutputFormat::Json = self.output {
            return print_json(&rollup);
        }

        if rollup.is_empty() {
            println!("No orders found.");
            return Ok(());
        }

        for row in &rollup {
            println!(
                "{} {} {}",
                row.order_id,
                row.status,
                row.created.format("%Y-%m-%d").to_string().dim()
            );
            for item in &row.items {
                let unit = item.unit.as_deref().unwrap_or_default();
                println!("  {} {} {unit}", item.item, item.quantity);
            }
            for quotation in &row.quotations {
                let total = quotation.grand_total.map(money).unwrap_or_default();
                println!("  quotation {} {} {total}", quotation.quotation_id, quotation.status);
                for report in &quotation.receiving {
                    println!("    receiving {} {}", report.report_id, report.status);
                    for item in &report.items {
                        println!("      {} {}", item.item, item.quantity);
                    }
                }
            }
            println!();
        }
        Ok(())
    }
}
