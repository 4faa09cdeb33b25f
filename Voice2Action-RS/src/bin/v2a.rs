//! Command-line front-end for the Voice2Action API.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use voice2action_client::render::{render_page, text_summary};
use voice2action_client::{
    short_id, AnalysisType, AnalyzeEvent, AudioFile, ClientConfig, FallbackPolicy, JobSession,
    V2aClient,
};

#[derive(Debug, Parser)]
#[command(name = "v2a", version, about = "Upload audio to Voice2Action and fetch the analysis")]
struct Cli {
    /// Base URL of the Voice2Action API
    #[arg(
        long,
        env = "VOICE2ACTION_API_URL",
        default_value = voice2action_client::config::DEFAULT_ENDPOINT
    )]
    api_url: String,

    /// Seconds between status checks
    #[arg(long, default_value_t = 2)]
    poll_interval: u64,

    /// Maximum number of status checks (90 = 3 minutes at the default interval)
    #[arg(long, default_value_t = 90)]
    attempts: u32,

    /// When to try /api/status/{id} after /api/jobs/{id} fails
    #[arg(long, value_enum, default_value_t = Fallback::Every)]
    fallback: Fallback,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Fallback {
    Never,
    First,
    Every,
}

impl From<Fallback> for FallbackPolicy {
    fn from(f: Fallback) -> Self {
        match f {
            Fallback::Never => FallbackPolicy::Never,
            Fallback::First => FallbackPolicy::FirstAttempt,
            Fallback::Every => FallbackPolicy::EveryAttempt,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Upload one or more audio files and wait for each analysis
    Analyze {
        /// MP3, WAV, OGG or M4A files, up to 25 MB each
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Analysis type sent to the service
        #[arg(long = "type", default_value = "auto")]
        analysis_type: String,

        /// Write an HTML report here (one file per job, suffixed with the job id
        /// when several files are analyzed)
        #[arg(long)]
        html: Option<PathBuf>,

        /// Print the normalized results as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Show the status of a job, or wait for it with --wait
    Status {
        job_id: String,
        #[arg(long)]
        wait: bool,
    },
    /// Check service health
    Health,
    /// List recent jobs
    Jobs {
        #[arg(long, default_value_t = 50)]
        limit: u32,
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
    /// Print the transcript of a job
    Transcript { job_id: String },
    /// Print the raw analysis of a job
    Analysis { job_id: String },
    /// Delete a job
    Delete { job_id: String },
    /// Show service statistics
    Stats,
    /// Export a completed job to external documents
    Export {
        job_id: String,
        /// Export targets
        #[arg(long = "to", default_value = "google_docs")]
        targets: Vec<String>,
    },
    /// Search transcripts
    Search {
        query: String,
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::builder()
        .with_endpoint(cli.api_url.clone())
        .with_poll_interval(Duration::from_secs(cli.poll_interval))
        .with_max_attempts(cli.attempts)
        .with_fallback(cli.fallback.into())
        .build();
    let client = V2aClient::with_config(config);

    match cli.command {
        Command::Analyze {
            files,
            analysis_type,
            html,
            json,
        } => {
            let analysis = AnalysisType::parse(&analysis_type);
            let several = files.len() > 1;
            let mut session = JobSession::new();
            for path in &files {
                analyze_one(&client, &mut session, path, &analysis, html.as_deref(), several, json)
                    .await?;
            }
        }
        Command::Status { job_id, wait } => {
            if wait {
                let job = client
                    .wait_for_completion(&job_id, |u| {
                        eprintln!("[{:>3.0}%] {}", u.progress, u.text);
                    })
                    .await?;
                print_lines(&text_summary(&job.job_id, &client.results(&job)));
            } else {
                let snap = client.job_status(&job_id).await?;
                println!("{}: {}", snap.job_id, snap.status);
                if let Some(p) = snap.progress {
                    println!("progress: {:.0}%", p);
                }
                if let Some(e) = &snap.error {
                    println!("error: {}", e);
                }
            }
        }
        Command::Health => {
            let report = client.health().await?;
            println!("{}", report.status);
            for (service, up) in &report.services {
                println!("  {:<14} {}", service, if *up { "ok" } else { "down" });
            }
            if let Some(e) = &report.error {
                println!("  error: {}", e);
            }
        }
        Command::Jobs { limit, offset } => {
            for job in client.list_jobs(limit, offset).await? {
                println!(
                    "{}  {:<10} {}  {}",
                    short_id(&job.job_id),
                    job.status,
                    job.created_at.as_deref().unwrap_or("-"),
                    job.filename.as_deref().unwrap_or("-"),
                );
            }
        }
        Command::Transcript { job_id } => {
            println!("{}", client.transcript(&job_id).await?.transcript);
        }
        Command::Analysis { job_id } => {
            println!("{}", serde_json::to_string_pretty(&client.analysis(&job_id).await?)?);
        }
        Command::Delete { job_id } => {
            client.delete_job(&job_id).await?;
            println!("deleted {}", job_id);
        }
        Command::Stats => {
            println!("{}", serde_json::to_string_pretty(&client.stats().await?)?);
        }
        Command::Export { job_id, targets } => {
            let targets: Vec<&str> = targets.iter().map(String::as_str).collect();
            let report = client.export(&job_id, &targets).await?;
            for (target, outcome) in &report.exports {
                match &outcome.message {
                    Some(m) => println!("{}: {} ({})", target, outcome.status, m),
                    None => println!("{}: {}", target, outcome.status),
                }
            }
        }
        Command::Search { query, limit } => {
            let found = client.search(&query, limit).await?;
            println!("{} result(s) for {:?}", found.count, found.query);
            for hit in &found.results {
                println!("{}  {}", short_id(&hit.job_id), hit.snippet.replace('\n', " "));
            }
        }
    }

    Ok(())
}

async fn analyze_one(
    client: &V2aClient,
    session: &mut JobSession,
    path: &Path,
    analysis: &AnalysisType,
    html: Option<&Path>,
    several: bool,
    json: bool,
) -> Result<()> {
    let file = AudioFile::from_path(path)
        .await
        .with_context(|| format!("cannot use {}", path.display()))?;

    session.reset();
    let job = client
        .analyze(&file, analysis, |event| match event {
            AnalyzeEvent::Uploading { filename, size } => {
                eprintln!(
                    "Uploading {} ({:.2} MB)...",
                    filename,
                    size as f64 / 1024.0 / 1024.0
                );
            }
            AnalyzeEvent::Accepted { job_id } => {
                eprintln!("Job {}... started", short_id(&job_id));
                session.start(job_id);
            }
            AnalyzeEvent::Progress(update) if session.accepts(&update) => {
                eprintln!("[{:>3.0}%] {}", update.progress, update.text);
            }
            AnalyzeEvent::Progress(_) => {}
        })
        .await
        .with_context(|| format!("analysis of {} failed", path.display()))?;

    let results = client.results(&job);
    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print_lines(&text_summary(&job.job_id, &results));
    }

    if let Some(out) = html {
        let out = if several {
            suffixed(out, short_id(&job.job_id))
        } else {
            out.to_path_buf()
        };
        std::fs::write(&out, render_page(&job.job_id, &results))
            .with_context(|| format!("cannot write {}", out.display()))?;
        eprintln!("Report written to {}", out.display());
    }
    Ok(())
}

fn suffixed(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("report");
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("html");
    path.with_file_name(format!("{}-{}.{}", stem, suffix, ext))
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}
