//! Upload one audio file and print its analysis.
//!
//! Requires a running Voice2Action API at http://127.0.0.1:8000.
//!
//! ```sh
//! cargo run --example analyze_file -- meeting.mp3
//! ```

use voice2action_client::render::text_summary;
use voice2action_client::{AnalysisType, AnalyzeEvent, AudioFile, V2aClient};

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let path = match std::env::args().nth(1) {
        Some(p) => p,
        None => {
            eprintln!("usage: analyze_file <audio file>");
            return Ok(());
        }
    };

    let client = V2aClient::new("http://127.0.0.1:8000");

    // Check connection
    let health = client.health().await?;
    if !health.is_healthy() {
        eprintln!("Voice2Action is {}", health.status);
    }

    // Validates type and size before anything is sent
    let file = AudioFile::from_path(&path).await?;

    let job = client
        .analyze(&file, &AnalysisType::Auto, |event| match event {
            AnalyzeEvent::Uploading { filename, size } => {
                println!("Uploading {} ({} bytes)", filename, size)
            }
            AnalyzeEvent::Accepted { job_id } => println!("Job {} accepted", job_id),
            AnalyzeEvent::Progress(p) => println!("  [{:>3.0}%] {}", p.progress, p.text),
        })
        .await?;

    for line in text_summary(&job.job_id, &client.results(&job)) {
        println!("{}", line);
    }
    Ok(())
}
