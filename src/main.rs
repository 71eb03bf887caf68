//! Command-line entry point for the mood playlist and weather advisory flows.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use flows::{AdvisoryFlow, FlowSettings, MoodFlow, DEFAULT_LOCATION};
use playback::{RecordingLauncher, SystemBrowserLauncher, TabLauncher, TabOpener};
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

/// Command-line arguments for the agent flows
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(short, long, global = true, default_value_t = false)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Turn a mood into song links and open them in the browser
    Mood {
        /// Mood text; prompted for on stdin when omitted
        #[arg(short, long)]
        mood: Option<String>,

        /// Record the links instead of opening browser tabs
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },

    /// Ask the weather assistant what to wear
    Weather {
        /// City and state/country to look up
        #[arg(short, long, default_value = DEFAULT_LOCATION)]
        location: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let filter = if args.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    fmt().with_env_filter(filter).with_target(false).init();

    let settings = FlowSettings::from_env().context("invalid configuration")?;
    debug!(model = %settings.openai_model, "configuration loaded");

    match args.command {
        Commands::Mood { mood, dry_run } => run_mood(&settings, mood, dry_run).await,
        Commands::Weather { location } => run_weather(&settings, &location).await,
    }
}

async fn run_mood(settings: &FlowSettings, mood: Option<String>, dry_run: bool) -> Result<()> {
    let mood = match mood {
        Some(mood) => mood,
        None => prompt_line("Enter your current mood: ")?,
    };
    if mood.trim().is_empty() {
        bail!("no mood given");
    }

    let launcher: Arc<dyn TabLauncher> = if dry_run {
        Arc::new(RecordingLauncher::new())
    } else {
        Arc::new(SystemBrowserLauncher::new())
    };
    let opener = TabOpener::new(launcher).with_pacing(settings.tab_pacing);
    let flow = MoodFlow::new(settings.language_model()?, opener);

    let report = flow.run(&mood).await?;
    info!(
        links = report.links.len(),
        opened = report.outcomes.iter().filter(|o| o.is_opened()).count(),
        dry_run,
        "mood flow finished"
    );
    Ok(())
}

async fn run_weather(settings: &FlowSettings, location: &str) -> Result<()> {
    let flow = AdvisoryFlow::new(settings.language_model()?, settings.weather_fetcher()?);

    println!("--- Starting Weather Agent Chat ---");
    println!("Time: {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
    println!("Location: {location}");
    println!("{}", "-".repeat(30));

    let report = flow.run(location).await?;
    match report.advice.as_deref() {
        Some(advice) => println!("{advice}"),
        None => println!("(the assistant ended the chat without advice)"),
    }

    println!("{}", "-".repeat(30));
    println!("--- Weather Agent Chat Finished ---");
    Ok(())
}

fn prompt_line(prompt: &str) -> Result<String> {
    let mut stdout = io::stdout();
    stdout.write_all(prompt.as_bytes())?;
    stdout.flush()?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
