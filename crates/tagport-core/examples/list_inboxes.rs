//! List Front inboxes - find the inbox id to filter a run with

use tagport::{FrontClient, Result};

#[tokio::main]
async fn main() -> Result<()> {
    let token = std::env::var("FRONT_API_TOKEN").unwrap_or_default();
    let front = FrontClient::new(&token)?;

    let inboxes = front.list_inboxes().await?;
    if inboxes.is_empty() {
        println!("No inboxes visible to this token.");
    } else {
        println!("Found {} inboxes:", inboxes.len());
        for inbox in inboxes {
            println!("  - {} ({})", inbox.name, inbox.id);
        }
    }

    Ok(())
}
