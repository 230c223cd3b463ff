use clap::{Parser, Subcommand};
use imgform::config::{self, CONFIG_FILENAME, TransformConfig};
use imgform::entry::Scope;
use imgform::task::{TaskSettings, TransformTask};
use imgform::{cache, output};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "imgform")]
#[command(about = "Batch-convert images into sized icons and bitmaps")]
#[command(long_about = "\
Batch-convert images into sized icons and bitmaps

Requests live in transform.toml. Each names a source image (or a directory
of images), one or more WIDTHxHEIGHT sizes, a destination and a format:

  [[task]]
  source = \"icons/icon.png\"
  format = \"ico\"
  resolutions = [\"16x16\", \"32x32\"]
  destination = \"build/icons/*\"     # → build/icons/icon-16x16.ico, ...

Formats: png, bmp, ico, icns, jpeg, webp, avif.

Invalid requests are reported and skipped; the rest of the batch still runs.

Run 'imgform gen-config' to generate a documented transform.toml.")]
#[command(version)]
struct Cli {
    /// Config file
    #[arg(short, long, default_value = CONFIG_FILENAME, global = true)]
    config: PathBuf,

    /// Log filter (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(short, long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate and convert every requested image
    Run(RunArgs),
    /// Validate requests without converting anything
    Check,
    /// List every file a run would write
    Outputs {
        /// Print a JSON array instead of one path per line
        #[arg(long)]
        json: bool,
    },
    /// Report whether all outputs already exist
    Status,
    /// Print a stock transform.toml with all options documented
    GenConfig,
}

#[derive(clap::Args)]
struct RunArgs {
    /// Report what would be written without touching the filesystem
    #[arg(long)]
    dry_run: bool,

    /// Convert even when every output already exists
    #[arg(long)]
    force: bool,

    /// Skip [[global]] requests
    #[arg(long)]
    no_global: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Run(args) => run(&cli.config, &args),
        Command::Check => {
            let (task, _) = load_task(&cli.config, false)?;
            let base = task.settings().base_dir.clone();
            let validation = task.validate(Scope::Task);
            output::print_rejections(&validation.rejected, &base);
            println!(
                "{} valid, {} rejected",
                validation.resolved.len(),
                validation.rejected.len()
            );
            if validation.is_clean() {
                Ok(())
            } else {
                Err(format!("{} requests rejected", validation.rejected.len()).into())
            }
        }
        Command::Outputs { json } => {
            let (task, _) = load_task(&cli.config, false)?;
            let outputs = task.output_paths(Scope::Task);
            if json {
                println!("{}", serde_json::to_string_pretty(&outputs)?);
            } else {
                output::print_outputs(&outputs, &task.settings().base_dir);
            }
            Ok(())
        }
        Command::Status => {
            let (task, _) = load_task(&cli.config, false)?;
            let resolved = task.resolved_entries(Scope::Task);
            let missing = cache::missing_outputs(&resolved);
            let total = cache::output_paths(&resolved).len();
            output::print_status(total, &missing, &task.settings().base_dir);
            Ok(())
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
            Ok(())
        }
    }
}

fn run(config_path: &Path, args: &RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (task, config) = load_task(config_path, args.no_global)?;
    let dry_run = args.dry_run || config.dry_run;
    init_thread_pool(&config.processing);

    let validation = task.validate(Scope::Task);
    let base = task.settings().base_dir.clone();
    if !args.force && !dry_run && cache::is_up_to_date(&validation.resolved) {
        output::print_up_to_date(validation.resolved.len(), &validation.rejected, &base);
        return if validation.is_clean() {
            Ok(())
        } else {
            Err(format!("{} requests rejected", validation.rejected.len()).into())
        };
    }

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_transform_event(&event, &base) {
                println!("{}", line);
            }
        }
    });
    let report = task.execute_validated(validation, dry_run, Some(tx));
    printer.join().map_err(|_| "output thread panicked")?;

    let stats = report.stats();
    println!("Done: {}", stats);
    if stats.is_success() {
        Ok(())
    } else {
        Err(format!(
            "{} of {} entries did not complete",
            stats.failed + stats.rejected,
            stats.total()
        )
        .into())
    }
}

/// Load the config and build the task it describes.
fn load_task(
    config_path: &Path,
    no_global: bool,
) -> Result<(TransformTask, TransformConfig), Box<dyn std::error::Error>> {
    let config = config::load_config(config_path)?;
    let config_dir = match config_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let base_dir = std::path::absolute(config.resolve_base_dir(config_dir))?;
    debug!(base_dir = %base_dir.display(), "loaded {}", config_path.display());

    let mut settings = TaskSettings::from_config(&config, &base_dir);
    if no_global {
        settings.include_global = false;
    }
    let entries = config.entry_set(&base_dir)?.freeze();
    Ok((TransformTask::new(settings, entries), config))
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; the config can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
