//! Dry-run example - preview a migration without touching Gmail

use std::sync::Arc;
use tagport::{FrontClient, GmailClient, Migrator, Result, RunConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let front_token = std::env::var("FRONT_API_TOKEN").unwrap_or_default();
    let gmail_token = std::env::var("GMAIL_ACCESS_TOKEN").unwrap_or_default();

    // Defaults: dry run, batches of 10, all inboxes.
    let config = RunConfig::default();

    let front = FrontClient::new(&front_token)?;
    let gmail = GmailClient::connect(&gmail_token, config.mode())?;

    println!("Starting dry run...");
    let report = Migrator::new(front, gmail, config)?
        .with_progress(Arc::new(|stats| eprintln!("  {}", stats)))
        .run()
        .await?;

    println!("Run {} finished: {}", report.run_id, report.stats);
    match report.report_path {
        Some(path) => println!("Audit trail: {}", path.display()),
        None => println!("Audit trail could not be written"),
    }

    Ok(())
}
