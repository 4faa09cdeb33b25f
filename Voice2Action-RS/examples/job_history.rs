//! List recent jobs and search their transcripts.
//!
//! ```sh
//! cargo run --example job_history -- "budget"
//! ```

use voice2action_client::{short_id, V2aClient};

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let client = V2aClient::new("http://127.0.0.1:8000");

    println!("Recent jobs:");
    for job in client.list_jobs(10, 0).await? {
        println!(
            "  {}  {:<11} {}",
            short_id(&job.job_id),
            job.status,
            job.filename.as_deref().unwrap_or("-")
        );
    }

    if let Some(query) = std::env::args().nth(1) {
        let found = client.search(&query, 20).await?;
        println!("\n{} match(es) for {:?}", found.count, found.query);
        for hit in &found.results {
            println!("  {}  {}", short_id(&hit.job_id), hit.snippet);
        }
    }

    println!("\nStats: {}", client.stats().await?);
    Ok(())
}
