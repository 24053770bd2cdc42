use clap::{Parser, Subcommand};
use cuckoo_calendar::{calendar, config, logging, output, photos, prepare, types::Variant};
use std::path::{Path, PathBuf};

/// Shared flags for commands that prepare photos.
#[derive(clap::Args, Clone)]
struct CacheArgs {
    /// Disable the preparation cache and re-encode every photo
    #[arg(long)]
    no_cache: bool,
}

/// Per-run calendar values. Each overrides the matching config key.
#[derive(clap::Args, Clone)]
struct CalendarArgs {
    /// Random seed [default: current UNIX time]
    #[arg(long, env = "SEED")]
    seed: Option<u64>,

    /// Calendar year [default: next year]
    #[arg(long, env = "YEAR")]
    year: Option<i32>,

    /// Primary PDF path [default: out/cuckoo-<year>.pdf]
    #[arg(long = "output", env = "OUT_FILE")]
    output: Option<PathBuf>,

    /// Title page subtitle
    #[arg(long, env = "SUBTITLE")]
    subtitle: Option<String>,

    /// When the cuckoo starts hiding days, e.g. "in 1 month" or "march 15"
    #[arg(long, env = "CUCKOO_BEGIN")]
    cuckoo_begin: Option<String>,
}

impl CalendarArgs {
    fn overrides(&self) -> config::Overrides {
        config::Overrides {
            seed: self.seed,
            year: self.year,
            output: self.output.clone(),
            subtitle: self.subtitle.clone(),
            cuckoo_begin: self.cuckoo_begin.clone(),
        }
    }
}

#[derive(Parser)]
#[command(name = "cuckoo-calendar")]
#[command(about = "Seeded photo wall calendar that occasionally hides a day")]
#[command(long_about = "\
Seeded photo wall calendar that occasionally hides a day

Thirteen photos become a printable PDF: a title page, then a photo page and
a day grid for every month, then a summary. Label colors and positions are
drawn from a seeded random stream, so the same seed always produces the
same calendar.

From the cuckoo date on, each week row has a 1 in 3 chance of hiding one
day. Every hidden day shifts the displayed dates one further behind.

Photo directory:

  months/
  ├── 00-lighthouse.jpg     # Title page
  ├── 01-snowy-fields.jpg   # January
  ├── ...
  └── 12-harbor.jpg         # December

Two documents are written: the primary PDF and <name>-mirror.pdf, whose
month photos are flipped and turned for double-sided binding.

Run 'cuckoo-calendar gen-config' to generate a documented calendar.toml.")]
#[command(version)]
struct Cli {
    /// Config file
    #[arg(long, default_value = config::CONFIG_FILENAME, global = true)]
    config: PathBuf,

    /// Photo directory
    #[arg(long, default_value = "months", global = true)]
    photos: PathBuf,

    /// Directory for intermediate files (prepared photos, manifests)
    #[arg(long, default_value = ".cuckoo-temp", global = true)]
    temp_dir: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Crop, flip and analyze the photos
    Prepare(CacheArgs),
    /// Prepare photos and write both PDFs
    Build {
        #[command(flatten)]
        cache: CacheArgs,
        #[command(flatten)]
        calendar: CalendarArgs,
    },
    /// Show the grids and cuckoo events a build would produce, from
    /// already prepared photos
    Plan {
        #[command(flatten)]
        calendar: CalendarArgs,
        /// Compose the mirrored document instead of the normal one
        #[arg(long)]
        mirrored: bool,
    },
    /// Validate config and photo directory without building
    Check(CalendarArgs),
    /// Print a stock calendar.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match &cli.command {
        Command::Prepare(cache_args) => {
            let calendar_config = config::load_config(&cli.config)?;
            let result = run_prepare(&cli, &calendar_config, cache_args)?;
            println!("Cache: {}", result.cache_stats);
        }
        Command::Build { cache, calendar } => {
            let calendar_config = config::load_config(&cli.config)?;
            let settings = config::Settings::resolve(
                calendar_config.clone(),
                calendar.overrides(),
                config::Now::current(),
            )?;
            output::print_settings(&settings);

            println!("==> Stage 1: Preparing photos from {}", cli.photos.display());
            let result = run_prepare(&cli, &calendar_config, cache)?;
            println!("Cache: {}", result.cache_stats);

            println!("==> Stage 2: Composing {}", settings.output.display());
            let report = calendar::build_calendar(&settings, &result.set)?;
            output::print_build_output(&report);

            println!("==> Build complete");
        }
        Command::Plan { calendar, mirrored } => {
            let calendar_config = config::load_config(&cli.config)?;
            let settings = config::Settings::resolve(
                calendar_config,
                calendar.overrides(),
                config::Now::current(),
            )?;
            output::print_settings(&settings);
            let set = prepare::PreparedSet::load(&prepared_dir(&cli.temp_dir)).map_err(|e| {
                format!("no prepared photos ({e}); run 'cuckoo-calendar prepare' first")
            })?;
            let variant = if *mirrored {
                Variant::Mirrored
            } else {
                Variant::Normal
            };
            let (pass, _) = calendar::plan(&settings, &set, variant)?;
            println!();
            output::print_plan_output(&pass);
        }
        Command::Check(calendar) => {
            println!("==> Checking {}", cli.config.display());
            let calendar_config = config::load_config(&cli.config)?;
            let settings = config::Settings::resolve(
                calendar_config,
                calendar.overrides(),
                config::Now::current(),
            )?;
            output::print_settings(&settings);

            println!("==> Checking {}", cli.photos.display());
            let photo_set = photos::discover(&cli.photos)?;
            let sources =
                prepare::inspect_sources(&cuckoo_calendar::imaging::RustBackend::new(), &photo_set)?;
            output::print_check_output(&sources);
            println!("==> Calendar is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn prepared_dir(temp_dir: &Path) -> PathBuf {
    temp_dir.join("prepared")
}

/// Discover and prepare photos, printing progress as each one completes.
fn run_prepare(
    cli: &Cli,
    calendar_config: &config::CalendarConfig,
    cache_args: &CacheArgs,
) -> Result<prepare::PrepareResult, Box<dyn std::error::Error>> {
    let photo_set = photos::discover(&cli.photos)?;
    init_thread_pool(&calendar_config.processing);

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_prepare_event(&event) {
                println!("{}", line);
            }
        }
    });
    let result = prepare::prepare(
        &photo_set,
        &prepared_dir(&cli.temp_dir),
        &prepare::PrepareConfig::from_calendar_config(calendar_config),
        !cache_args.no_cache,
        Some(tx),
    );
    printer
        .join()
        .map_err(|_| "progress printer thread panicked")?;
    Ok(result?)
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores: the user can constrain down,
/// not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
