use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use colored::Colorize;
use console::Emoji;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use podcastr::logging::{LogFormat, LoggingConfig};
use podcastr::{
    Episode, EpisodeApi, ListQuery, NoopReporter, PlayerSession, PlayerView, ProgressEvent,
    ProgressReporter, ReqwestClient, SharedProgressReporter, SimulatedMedia, SiteOptions,
    SortOrder, build_site,
};

// Emoji with fallback for terminals without Unicode support
static MICROPHONE: Emoji<'_, '_> = Emoji("🎙️  ", "");
static SEARCH: Emoji<'_, '_> = Emoji("🔍 ", "[~] ");
static HEADPHONES: Emoji<'_, '_> = Emoji("🎧 ", "[i] ");
static PAGE: Emoji<'_, '_> = Emoji("📄 ", "[>] ");
static SUCCESS: Emoji<'_, '_> = Emoji("✅ ", "[+] ");
static FAILURE: Emoji<'_, '_> = Emoji("❌ ", "[!] ");
static PARTY: Emoji<'_, '_> = Emoji("🎉 ", "[*] ");
static FOLDER: Emoji<'_, '_> = Emoji("📁 ", "");
static CROSS: Emoji<'_, '_> = Emoji("✗ ", "x ");

const DEFAULT_API_URL: &str = "http://localhost:3333/";

/// Browse a podcast episode API, build static pages and listen in the terminal
#[derive(Parser, Debug)]
#[command(name = "podcastr")]
#[command(about = "Browse podcast episodes, build static pages and listen in the terminal")]
#[command(version)]
struct Args {
    /// Base URL of the episode API
    #[arg(long, env = "PODCASTR_API_URL", default_value = DEFAULT_API_URL, global = true)]
    api_url: String,

    /// Diagnostic log format (text, json, pretty)
    #[arg(long, default_value = "text", global = true)]
    log_format: LogFormat,

    /// Enable debug diagnostics on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the home page and episode pages into a directory
    Build {
        /// Output directory for the static site
        output_dir: PathBuf,

        /// Maximum number of concurrent page fetches
        #[arg(short = 'c', long, default_value = "3")]
        concurrent: usize,

        /// Maximum number of episode pages to pre-render
        #[arg(short, long)]
        limit: Option<usize>,

        /// Number of episodes on the home page
        #[arg(long, default_value = "12")]
        listing_limit: usize,

        /// Stop after the first failed page
        #[arg(long)]
        strict: bool,

        /// Quiet mode - suppress progress output
        #[arg(short, long)]
        quiet: bool,
    },

    /// Print the episode listing
    List {
        /// Maximum number of episodes
        #[arg(short, long)]
        limit: Option<usize>,

        /// Field to sort by, passed to the API
        #[arg(long)]
        sort: Option<String>,

        /// Sort direction (asc, desc)
        #[arg(long)]
        order: Option<SortOrder>,
    },

    /// Print a single episode
    Show {
        /// Episode id
        id: String,
    },

    /// Interactive player over the latest episodes
    Listen {
        /// Number of episodes to queue
        #[arg(short, long, default_value = "12")]
        limit: usize,
    },
}

/// Progress reporter using indicatif for terminal output
struct IndicatifReporter {
    multi: MultiProgress,
    bars: Mutex<HashMap<usize, ProgressBar>>,
    main_bar: ProgressBar,
}

impl IndicatifReporter {
    fn new() -> Self {
        let multi = MultiProgress::new();

        let main_style = ProgressStyle::default_spinner()
            .template("{spinner:.green} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());

        let main_bar = multi.add(ProgressBar::new_spinner());
        main_bar.set_style(main_style);
        main_bar.enable_steady_tick(std::time::Duration::from_millis(100));

        Self {
            multi,
            bars: Mutex::new(HashMap::new()),
            main_bar,
        }
    }

    fn get_or_create_bar(&self, slot_id: usize) -> ProgressBar {
        let mut bars = self.bars.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(bar) = bars.get(&slot_id) {
            return bar.clone();
        }

        let style = ProgressStyle::default_spinner()
            .template(&format!("  {PAGE}{{spinner:.cyan}} {{wide_msg}}"))
            .unwrap_or_else(|_| ProgressStyle::default_spinner());

        let bar = self.multi.add(ProgressBar::new_spinner());
        bar.set_style(style);
        bar.enable_steady_tick(std::time::Duration::from_millis(100));
        bars.insert(slot_id, bar.clone());
        bar
    }

    fn finish_bar(&self, slot_id: usize) {
        let mut bars = self.bars.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(bar) = bars.remove(&slot_id) {
            bar.finish_and_clear();
        }
    }
}

impl ProgressReporter for IndicatifReporter {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::FetchingListing { url } => {
                self.main_bar
                    .set_message(format!("{SEARCH}Fetching episodes: {}", url.cyan()));
            }

            ProgressEvent::ListingFetched {
                total_episodes,
                to_render,
            } => {
                self.main_bar.set_message(format!(
                    "{HEADPHONES}{} episodes listed, {} pages to render",
                    total_episodes.to_string().cyan(),
                    to_render.to_string().yellow()
                ));
            }

            ProgressEvent::IndexWritten { path } => {
                self.main_bar.println(format!(
                    "{SUCCESS}{}",
                    path.display().to_string().green()
                ));
            }

            ProgressEvent::PageStarting {
                slot_id,
                episode_id,
                page_index,
                total_pages,
            } => {
                let bar = self.get_or_create_bar(slot_id);
                bar.set_message(format!(
                    "[{}/{}] {}",
                    (page_index + 1).to_string().cyan(),
                    total_pages.to_string().cyan(),
                    truncate_title(&episode_id, 40)
                ));
            }

            ProgressEvent::PageRendered {
                slot_id,
                title,
                ..
            } => {
                let bar = self.get_or_create_bar(slot_id);
                bar.println(format!(
                    "  {SUCCESS}{}",
                    truncate_title(&title, 60).green()
                ));
                self.finish_bar(slot_id);
            }

            ProgressEvent::PageFailed {
                slot_id,
                episode_id,
                error,
            } => {
                let bar = self.get_or_create_bar(slot_id);
                bar.abandon_with_message(format!(
                    "{FAILURE}{} - {}",
                    truncate_title(&episode_id, 30).red(),
                    error.red()
                ));
                let mut bars = self.bars.lock().unwrap_or_else(|e| e.into_inner());
                bars.remove(&slot_id);
            }

            ProgressEvent::BuildCompleted {
                rendered_count,
                skipped_count,
                failed_count,
            } => {
                self.main_bar.finish_and_clear();
                println!(
                    "\n{PARTY}{} {} rendered, {} not pre-rendered, {} failed",
                    "Build complete:".bold().green(),
                    rendered_count.to_string().green().bold(),
                    skipped_count.to_string().yellow(),
                    if failed_count > 0 {
                        failed_count.to_string().red().bold()
                    } else {
                        failed_count.to_string().green()
                    }
                );
            }
        }
    }
}

fn truncate_title(title: &str, max_len: usize) -> String {
    if title.chars().count() <= max_len {
        title.to_string()
    } else {
        let head: String = title.chars().take(max_len.saturating_sub(3)).collect();
        format!("{head}...")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    LoggingConfig::new(args.log_format, "warn", args.verbose).init();

    let api = EpisodeApi::new(ReqwestClient::new(), &args.api_url)
        .with_context(|| format!("Invalid API URL: {}", args.api_url))?;

    match args.command {
        Command::Build {
            output_dir,
            concurrent,
            limit,
            listing_limit,
            strict,
            quiet,
        } => {
            run_build(
                &api,
                output_dir,
                SiteOptions {
                    listing: ListQuery::latest(listing_limit),
                    limit,
                    max_concurrent: concurrent,
                    continue_on_error: !strict,
                },
                quiet,
            )
            .await
        }

        Command::List { limit, sort, order } => {
            let query = ListQuery { limit, sort, order };
            let episodes = api
                .list_episodes(&query)
                .await
                .context("Failed to fetch episodes")?;
            print_listing(&episodes);
            Ok(())
        }

        Command::Show { id } => {
            let episode = api
                .get_episode(&id)
                .await
                .with_context(|| format!("Failed to fetch episode '{id}'"))?;
            print_episode(&episode);
            Ok(())
        }

        Command::Listen { limit } => {
            let episodes = api
                .list_episodes(&ListQuery::latest(limit))
                .await
                .context("Failed to fetch episodes")?;
            if episodes.is_empty() {
                bail!("The API returned no episodes to listen to");
            }
            run_listener(episodes)
        }
    }
}

async fn run_build(
    api: &EpisodeApi<ReqwestClient>,
    output_dir: PathBuf,
    options: SiteOptions,
    quiet: bool,
) -> Result<()> {
    if !quiet {
        println!(
            "\n{}{} {}\n",
            MICROPHONE,
            "podcastr".bold().magenta(),
            "- Static Site Builder".dimmed()
        );
    }

    let reporter: SharedProgressReporter = if quiet {
        NoopReporter::shared()
    } else {
        Arc::new(IndicatifReporter::new())
    };

    let result = build_site(api, &output_dir, &options, reporter)
        .await
        .context("Failed to build site")?;

    if !quiet && !result.failed_pages.is_empty() {
        println!("\n{}", "Failed pages:".red().bold());
        for (id, error) in &result.failed_pages {
            println!("  {}{} - {}", CROSS, id.yellow(), error.dimmed());
        }
    }

    if !quiet {
        println!(
            "\n{FOLDER}Output: {}\n",
            output_dir.display().to_string().cyan()
        );
    }

    if result.failed > 0 && result.rendered == 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn print_listing(episodes: &[Episode]) {
    for (index, episode) in episodes.iter().enumerate() {
        println!(
            "{:>3}  {:<10} {}  {}  {}",
            index.to_string().cyan(),
            episode.published_at().dimmed(),
            episode.duration_as_string().yellow(),
            episode.title().bold(),
            episode.members().dimmed()
        );
    }
}

fn print_episode(episode: &Episode) {
    println!("\n{}", episode.title().bold());
    println!("{}", episode.members().dimmed());
    println!(
        "{}  {}",
        episode.published_at().cyan(),
        episode.duration_as_string().yellow()
    );
    println!("{}\n", episode.url().dimmed());
    println!("{}\n", episode.description());
}

const LISTEN_HELP: &str = "\
commands:
  play <n>    queue every episode and start at <n>
  one <n>     play only episode <n>
  p           play / pause
  n, b        next / previous episode
  shuffle     toggle shuffle
  loop        toggle loop
  seek <s>    jump to <s> seconds
  w <s>       let <s> seconds of playback pass
  list        show the episodes
  q           quit";

fn run_listener(episodes: Vec<Episode>) -> Result<()> {
    let mut session = PlayerSession::new(SimulatedMedia::with_catalog(&episodes));

    println!("\n{}{}\n", MICROPHONE, "podcastr".bold().magenta());
    print_listing(&episodes);
    println!("\n{}", LISTEN_HELP.dimmed());
    print_player(&session.view());

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("{} ", ">".magenta());
        std::io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let mut words = line.split_whitespace();
        let command = words.next();
        let argument = words.next().map(str::parse::<u64>);

        match (command, argument) {
            (None, _) => {}
            (Some("q" | "quit"), _) => break,
            (Some("help" | "h"), _) => println!("{}", LISTEN_HELP.dimmed()),
            (Some("list"), _) => print_listing(&episodes),
            (Some("play"), Some(Ok(index))) => {
                if let Err(e) = session.play_list(episodes.clone(), index as usize) {
                    println!("{}", e.to_string().red());
                }
            }
            (Some("one"), Some(Ok(index))) => match episodes.get(index as usize) {
                Some(episode) => session.play(episode.clone()),
                None => println!("{}", format!("No episode {index}").red()),
            },
            (Some("p" | "toggle"), _) => session.toggle_play(),
            (Some("n" | "next"), _) => session.next(),
            (Some("b" | "prev"), _) => session.previous(),
            (Some("shuffle"), _) => session.toggle_shuffle(),
            (Some("loop"), _) => session.toggle_loop(),
            (Some("seek"), Some(Ok(seconds))) => session.seek(seconds),
            (Some("w" | "wait"), Some(Ok(seconds))) => session.media_mut().advance(seconds),
            (Some(other), _) => {
                println!("{}", format!("Unknown or incomplete command: {other}").red());
                continue;
            }
        }

        // An ending episode queues the successor's load events
        session.pump();
        session.pump();
        print_player(&session.view());
    }

    Ok(())
}

fn print_player(view: &PlayerView<'_>) {
    println!("\n{HEADPHONES}{}", "Tocando agora".bold());

    match view.episode {
        Some(episode) => {
            println!("  {}", episode.title().bold().green());
            println!("  {}", episode.members().dimmed());
        }
        None => println!("  {}", "Selecione um podcast para ouvir".dimmed()),
    }

    const BAR_WIDTH: usize = 30;
    let filled = (view.progress_ratio() * BAR_WIDTH as f64).round() as usize;
    println!(
        "  {} [{}{}] {}",
        view.progress_label,
        "=".repeat(filled).green(),
        "-".repeat(BAR_WIDTH - filled).dimmed(),
        view.duration_label
    );

    let enabled = view.controls_enabled();
    let control = |label: &str, available: bool, active: bool| {
        if !available {
            label.dimmed().to_string()
        } else if active {
            label.green().bold().to_string()
        } else {
            label.to_string()
        }
    };
    println!(
        "  {}  {}  {}  {}  {}\n",
        control("shuffle", enabled, view.is_shuffling),
        control("prev", enabled && view.has_previous, false),
        control(if view.is_playing { "pause" } else { "play" }, enabled, false),
        control("next", enabled && view.has_next, false),
        control("loop", enabled, view.is_looping),
    );
}
