use anyhow::Result;
use clap::Parser;
use console::style;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tubescript::cli::{Cli, Commands, OutputFormat};
use tubescript::config::Config;
use tubescript::pipeline::{successful_files, TranscriptPipeline, VideoOutcome};
use tubescript::providers::SourceRegistry;
use tubescript::{output, utils, TranscriptError};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "tubescript=debug"
    } else if cli.quiet {
        "tubescript=warn"
    } else {
        "tubescript=info"
    };

    // Initialize tracing; stdout is reserved for transcripts
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path).await?,
        None => Config::load().await?,
    };
    if cli.quiet {
        config.app.show_progress = false;
    }

    match cli.command {
        Commands::Transcribe {
            inputs,
            source_lang,
            target_lang,
            format,
            output,
            archive,
            stdout,
        } => {
            let source_lang = source_lang.unwrap_or_else(|| config.fetch.default_source_lang.clone());
            let target_lang = target_lang.or_else(|| config.fetch.default_target_lang.clone());
            let output_dir = output
                .or_else(|| config.app.output_dir.clone())
                .unwrap_or_else(|| PathBuf::from("."));

            if !stdout {
                utils::validate_save_location(&output_dir)?;
            }

            if inputs.iter().any(|input| !SourceRegistry::is_local_file(input)) {
                warn_missing_dependencies(&config).await;
            }

            let pipeline = TranscriptPipeline::from_config(&config, format)?;
            tracing::info!("Fetching transcripts for {} input(s)", inputs.len());
            let outcomes = pipeline
                .process_inputs(&inputs, &source_lang, target_lang.as_deref())
                .await;

            report_outcomes(&outcomes);

            let files = successful_files(&outcomes);
            if files.is_empty() {
                anyhow::bail!("No transcripts could be fetched ({} input(s) failed)", outcomes.len());
            }

            if stdout {
                output::print_to_console(&files);
            } else if archive || outcomes.len() > 1 {
                let path = output::save_archive(&files, &output_dir)?;
                eprintln!("Archive saved to: {}", path.display());
            } else {
                for path in output::save_files(&files, &output_dir)? {
                    eprintln!("Transcript saved to: {}", path.display());
                }
            }
        }
        Commands::Tracks { input } => {
            let video_id = SourceRegistry::resolve_input(&input)?;
            if !SourceRegistry::is_local_file(&video_id) {
                warn_missing_dependencies(&config).await;
            }

            let pipeline = TranscriptPipeline::from_config(&config, OutputFormat::Text)?;
            let tracks = pipeline.fetcher().list_tracks(&video_id).await?;
            if tracks.is_empty() {
                return Err(TranscriptError::NoTranscriptAvailable { video_id }.into());
            }

            println!("Transcript tracks for {}:", video_id);
            for track in tracks {
                println!(
                    "  • {} ({}) [{}]",
                    track.language_code,
                    track.language_name.as_deref().unwrap_or("unknown"),
                    track.kind.as_str()
                );
            }
        }
        Commands::Config { show } => {
            if show {
                config.display();
            } else {
                let path = match cli.config {
                    Some(path) => path,
                    None => Config::config_path()?,
                };
                println!("Configuration file: {}", path.display());
                println!("Run with --show to print the current settings.");
            }
        }
    }

    Ok(())
}

/// Warn about missing external tools without aborting
async fn warn_missing_dependencies(config: &Config) {
    let missing_deps = utils::check_dependencies(&config.fetch.yt_dlp_path).await;
    if !missing_deps.is_empty() {
        eprintln!("⚠️  Dependency check warnings:");
        for dep in missing_deps {
            eprintln!("   • {}", dep);
        }
        eprintln!("   (Continuing anyway - YouTube lookups will fail)");
    }
}

fn report_outcomes(outcomes: &[VideoOutcome]) {
    for outcome in outcomes {
        match &outcome.result {
            Ok(processed) => {
                let language = match &processed.transcript.translated_from {
                    Some(original) => format!("{} → {}", original, processed.transcript.language),
                    None => processed.transcript.language.clone(),
                };
                eprintln!(
                    "{} {} [{}] {} segment(s), {}",
                    style("✓").green(),
                    processed.metadata.title,
                    language,
                    processed.transcript.len(),
                    utils::format_duration(processed.metadata.duration)
                );
            }
            Err(err) => eprintln!("{} {}: {}", style("✗").red(), outcome.video_id, err),
        }
    }
}
