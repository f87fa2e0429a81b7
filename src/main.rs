use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use console::Emoji;

use castpress::{
    CommandToolchain, PublishOptions, ReportEvent, Reporter, SharedReporter, SkipReason, publish,
};

// Emoji with fallback for terminals without Unicode support
static MICROPHONE: Emoji<'_, '_> = Emoji("🎙️  ", "");
static RECORD: Emoji<'_, '_> = Emoji("📋 ", "[i] ");
static ART: Emoji<'_, '_> = Emoji("🎨 ", "[a] ");
static HEADPHONES: Emoji<'_, '_> = Emoji("🎧 ", "[m] ");
static MOVIE: Emoji<'_, '_> = Emoji("🎬 ", "[v] ");
static FEED: Emoji<'_, '_> = Emoji("📡 ", "[f] ");
static PAGE: Emoji<'_, '_> = Emoji("📄 ", "[t] ");
static WARNING: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");
static PARTY: Emoji<'_, '_> = Emoji("🎉 ", "[*] ");
static FOLDER: Emoji<'_, '_> = Emoji("📁 ", "");

/// Render a podcast metadata record into its publishable artifact set
#[derive(Parser, Debug)]
#[command(name = "castpress")]
#[command(about = "Render a podcast metadata record into audio, covers, video, feed and pages")]
#[command(version)]
struct Args {
    /// Path to the show metadata record (JSON)
    record: PathBuf,

    /// Output directory for the rendered artifact set
    output_dir: PathBuf,

    /// Regenerate artifacts even when they already exist
    #[arg(short, long)]
    force: bool,

    /// Mint GUIDs for episodes that lack one and write them back
    #[arg(short, long)]
    add_guids: bool,

    /// Directory searched recursively for source audio files
    #[arg(short, long, default_value = ".")]
    search_dir: PathBuf,

    /// Increase verbosity (repeat for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Pause after each rendered cover art (debug aid)
    #[arg(long)]
    pause: bool,

    /// Include episodes without source audio in the feed
    #[arg(long)]
    show_missing_audio: bool,
}

/// Terminal reporter: progress on stdout, warnings on stderr
struct TerminalReporter {
    verbosity: u8,
}

impl Reporter for TerminalReporter {
    fn report(&self, event: ReportEvent) {
        match event {
            ReportEvent::RecordLoaded {
                path,
                episode_count,
            } => {
                println!(
                    "{RECORD}{} {} ({} episodes)",
                    "Loaded".bold(),
                    path.display().to_string().cyan(),
                    episode_count.to_string().cyan()
                );
            }

            ReportEvent::GuidsMinted { count } => {
                println!(
                    "{RECORD}{} {} new GUID(s) into the record",
                    "Minted".bold().green(),
                    count.to_string().cyan()
                );
            }

            ReportEvent::SourceMissing { episode, filename } => {
                eprintln!(
                    "{WARNING}{} '{}': source file '{}' not found, continuing without audio",
                    "Warning".yellow().bold(),
                    episode.yellow(),
                    filename
                );
            }

            ReportEvent::EpisodeResolved {
                episode,
                number,
                stem,
            } => {
                if self.verbosity >= 2 {
                    let number = number
                        .map(|n| n.to_string())
                        .unwrap_or_else(|| "-".to_string());
                    println!(
                        "   resolved [{}] {} -> {}",
                        number.cyan(),
                        episode,
                        stem.dimmed()
                    );
                }
            }

            ReportEvent::RenderSkipped { episode, reason } => {
                if self.verbosity >= 1 {
                    let reason = match reason {
                        SkipReason::NoSource => "no source audio",
                        SkipReason::Hidden => "hidden",
                        SkipReason::FutureDated => "publish date in the future",
                    };
                    println!("   {} {} ({})", "skipped".yellow(), episode, reason.dimmed());
                }
            }

            ReportEvent::ArtifactSkipped { path } => {
                if self.verbosity >= 2 {
                    println!("   {} {}", "exists".dimmed(), path.display());
                }
            }

            ReportEvent::CoverRendered { episode, name, .. } => {
                println!("{ART}{} cover '{}' for {}", "Rendered".green(), name, episode.bold());
            }

            ReportEvent::AudioRendered { episode, path } => {
                println!(
                    "{HEADPHONES}{} {} -> {}",
                    "Tagged".green(),
                    episode.bold(),
                    path.display().to_string().dimmed()
                );
            }

            ReportEvent::VideoRendered { episode, path } => {
                println!(
                    "{MOVIE}{} {} -> {}",
                    "Muxed".green(),
                    episode.bold(),
                    path.display().to_string().dimmed()
                );
            }

            ReportEvent::VideoBackgroundMissing { episode, cover } => {
                eprintln!(
                    "{WARNING}{} '{}': cover '{}' was not rendered, skipping video",
                    "Warning".yellow().bold(),
                    episode.yellow(),
                    cover
                );
            }

            ReportEvent::MissingGuid { episode } => {
                eprintln!(
                    "{WARNING}{} '{}' has no GUID and was left out of the feed \
                     (run with --add-guids)",
                    "Warning".yellow().bold(),
                    episode.yellow()
                );
            }

            ReportEvent::FeedWritten { path, item_count } => {
                println!(
                    "{FEED}{} {} ({} items)",
                    "Feed".bold().green(),
                    path.display().to_string().cyan(),
                    item_count.to_string().cyan()
                );
            }

            ReportEvent::TemplateRendered { path } => {
                println!("{PAGE}{} {}", "Page".green(), path.display());
            }

            ReportEvent::PublishCompleted {
                rendered_count,
                skipped_count,
                feed_item_count,
            } => {
                println!(
                    "\n{PARTY}{} {} rendered, {} skipped, {} in feed",
                    "Publish complete:".bold().green(),
                    rendered_count.to_string().green().bold(),
                    skipped_count.to_string().yellow(),
                    feed_item_count.to_string().cyan()
                );
            }
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    println!(
        "\n{}{} {}\n",
        MICROPHONE,
        "castpress".bold().magenta(),
        "- Podcast Publisher".dimmed()
    );

    let toolchain = CommandToolchain::new();

    let options = PublishOptions {
        force: args.force,
        add_guids: args.add_guids,
        search_dir: args.search_dir,
        show_missing_audio: args.show_missing_audio,
        pause_after_cover: args.pause,
    };

    let reporter: SharedReporter = Arc::new(TerminalReporter {
        verbosity: args.verbose,
    });

    publish(
        &toolchain,
        &args.record,
        &args.output_dir,
        &options,
        &reporter,
    )
    .context("Failed to publish podcast")?;

    println!(
        "\n{FOLDER}Output: {}\n",
        args.output_dir.display().to_string().cyan()
    );

    Ok(())
}
