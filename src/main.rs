use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use transcript_harvester::cli::{Cli, Commands};
use transcript_harvester::config::Config;
use transcript_harvester::pipeline::HarvestPipeline;
use transcript_harvester::{report, server, utils};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "harvester=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::load().await?;

    match cli.command {
        Commands::Fetch {
            url,
            output,
            language,
        } => {
            let mut config = config;
            if let Some(lang) = language {
                config.captions.language = lang;
            }

            // Warn up front if the external tools are missing (non-fatal;
            // the caption-file and API strategies work without them)
            let missing_deps = utils::check_dependencies().await;
            for dep in missing_deps {
                tracing::warn!("missing dependency: {}", dep);
            }

            let pipeline = HarvestPipeline::new(&config)?;

            let progress = ProgressBar::new_spinner();
            progress.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} [{elapsed_precise}] {msg}")
                    .unwrap(),
            );
            progress.set_message("Acquiring transcript...");
            progress.enable_steady_tick(std::time::Duration::from_millis(120));

            let outcome = pipeline.acquire(&url).await;
            progress.finish_and_clear();

            if let (Ok(acquisition), Some(path)) = (&outcome, &output) {
                fs_err::write(path, &acquisition.transcript)?;
                eprintln!("Transcript saved to: {}", path.display());
            }

            // the process contract: exactly one JSON line on stdout
            println!("{}", report::render_outcome(&outcome));
        }
        Commands::Serve { port } => {
            let mut config = config;
            if let Some(port) = port {
                config.server.port = port;
            }
            server::serve(config).await?;
        }
        Commands::Config { show } => {
            if show {
                config.display();
            } else {
                println!("Edit the config file directly:");
                println!("  (default location) ~/.config/transcript-harvester/config.yaml");
            }
        }
        Commands::Strategies => {
            println!("Acquisition strategies, in fallback order:");
            println!("  1. direct_caption_download - the URL already points at a caption file");
            println!("  2. tool_caption_extraction - yt-dlp manual and automatic captions");
            println!("  3. html_page_caption_scan  - caption link embedded in the page HTML");
            println!("  4. remote_transcript_api   - hosted transcript API (YouTube references)");
            println!("  5. speech_to_text_fallback - audio download plus whisper");
        }
    }

    Ok(())
}
