use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use snapocr_config::Config;
use snapocr_config::logging::LoggingConfig;
use snapocr_config::ocr::install_dir;
use snapocr_core::overlay::{OverlayStyle, compose_overlay};
use snapocr_core::selector::{PointerEvent, RegionSelector};
use snapocr_ocr::{DisplayCapture, ProcessArguments, ProcessEngine, Recognizer, ScreenCapture};
use snapocr_types::ImageSource;
use tracing_subscriber::EnvFilter;

mod controller;
mod crash;
mod events;
mod frontend;
mod ocr_context;
mod profile;
mod request;
mod state;
mod status;

#[cfg(test)]
mod tests;

use self::controller::AppController;
use self::frontend::Delivery;
use self::profile::ProfileSource;
use self::state::AppState;

const EXIT_OCR_FAILED: u8 = 1;
const EXIT_MISSING_FILES: u8 = 2;

#[derive(Parser)]
#[command(name = "snapocr", version, about = "Recognize text in a screen region or image file")]
struct Cli {
    /// JSON profile, defaults to config.json next to the executable
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Verify the engine installation
    Check,
    /// Write the default profile
    InitConfig { path: Option<PathBuf> },
    /// List monitors with their scaling
    Monitors,
    /// Recognize text in an image file
    File { path: PathBuf },
    /// Capture a monitor and recognize text in a dragged region
    Region {
        #[arg(long, default_value_t = 0)]
        monitor: usize,
        /// Drag start in logical coordinates, e.g. 100,200
        #[arg(long)]
        from: Point,
        /// Drag end in logical coordinates
        #[arg(long)]
        to: Point,
        /// Save the selection overlay as PNG
        #[arg(long)]
        overlay: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy)]
struct Point {
    x: i32,
    y: i32,
}

impl FromStr for Point {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| format!("expected X,Y but got '{s}'"))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<i32>()
                .map_err(|e| format!("invalid coordinate '{v}': {e}"))
        };
        Ok(Self {
            x: parse(x)?,
            y: parse(y)?,
        })
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let (config, source) = match profile::load_profile(cli.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Failed to load profile: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config.logging);
    crash::install_panic_hook(
        config
            .logging
            .crash_log
            .clone()
            .unwrap_or_else(crash::default_crash_log),
    );
    match &source {
        ProfileSource::File(path) => tracing::debug!("Profile loaded from {}", path.display()),
        ProfileSource::Defaults => tracing::debug!("No profile found, using defaults"),
    }

    match run(cli.command, config).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.as_str()));

    // stdout carries recognized text only
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(atty::is(atty::Stream::Stderr));

    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(command: Command, config: Config) -> anyhow::Result<ExitCode> {
    match command {
        Command::InitConfig { path } => {
            let path = path.unwrap_or_else(profile::default_profile_path);
            profile::init_profile(&path)?;
            println!("{}", path.display());
            Ok(ExitCode::SUCCESS)
        }
        Command::Monitors => {
            for m in snapocr_ocr::list_monitors()? {
                match m.descriptor {
                    Some(d) => println!(
                        "[{}] {}{} {}x{} physical, {}x{} logical, scale {}",
                        m.index,
                        m.name,
                        if m.is_primary { " (primary)" } else { "" },
                        d.physical_width,
                        d.physical_height,
                        d.logical_width,
                        d.logical_height,
                        m.scale_factor
                    ),
                    None => println!("[{}] {} unavailable", m.index, m.name),
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Check => {
            let Some(args) = verified_installation(&config) else {
                return Ok(ExitCode::from(EXIT_MISSING_FILES));
            };
            println!("engine: {}", args.engine_path.display());
            println!("models: {}", args.models_dir.display());
            Ok(ExitCode::SUCCESS)
        }
        Command::File { path } => {
            let Some(args) = verified_installation(&config) else {
                return Ok(ExitCode::from(EXIT_MISSING_FILES));
            };
            recognize(config, args, ImageSource::File(path)).await
        }
        Command::Region {
            monitor,
            from,
            to,
            overlay,
        } => {
            let Some(args) = verified_installation(&config) else {
                return Ok(ExitCode::from(EXIT_MISSING_FILES));
            };
            match select_region(&config, monitor, from, to, overlay).await? {
                Some(source) => recognize(config, args, source).await,
                None => {
                    tracing::info!("Selection too small, nothing to recognize");
                    Ok(ExitCode::SUCCESS)
                }
            }
        }
    }
}

/// Startup check, lists every missing file
fn verified_installation(config: &Config) -> Option<ProcessArguments> {
    check_installation(ProcessArguments::from_config(&config.ocr, &install_dir()))
}

/// `None` when the installation is unusable
fn check_installation(args: ProcessArguments) -> Option<ProcessArguments> {
    match args.verify_installation() {
        Ok(()) => Some(args),
        Err(e) if e.is_fatal() => {
            tracing::error!("Startup check failed");
            eprintln!("{e}");
            None
        }
        Err(e) => {
            tracing::warn!("Startup check inconclusive: {e}");
            Some(args)
        }
    }
}

/// Capture the monitor and replay the drag through the selector
async fn select_region(
    config: &Config,
    monitor: usize,
    from: Point,
    to: Point,
    overlay: Option<PathBuf>,
) -> anyhow::Result<Option<ImageSource>> {
    let frame = tokio::task::spawn_blocking(move || ScreenCapture.capture(monitor))
        .await?
        .context("screen capture failed")?;

    let selection = RegionSelector::new(config.ui.min_selection_size).run([
        PointerEvent::Down { x: from.x, y: from.y },
        PointerEvent::Move { x: to.x, y: to.y },
        PointerEvent::Up { x: to.x, y: to.y },
    ]);

    if let Some(path) = overlay {
        let style = OverlayStyle::from(&config.ui);
        compose_overlay(&frame, selection.as_ref(), &style)
            .save(&path)
            .with_context(|| format!("cannot save overlay {}", path.display()))?;
        tracing::info!("Overlay saved to {}", path.display());
    }

    Ok(selection.map(|selection| ImageSource::Region {
        frame: Box::new(frame),
        selection,
    }))
}

async fn recognize(
    config: Config,
    args: ProcessArguments,
    source: ImageSource,
) -> anyhow::Result<ExitCode> {
    let recognizer: Arc<dyn Recognizer> = Arc::new(ProcessEngine::new(args));
    let state = Arc::new(AppState::new(config, recognizer));
    let controller = AppController::new(state);
    let mut tasks = controller.spawn_tasks();

    let delivery = frontend::run_once(&controller.ui_handle(), source).await;

    let status = controller.state().status.snapshot().await;
    tracing::debug!(
        "{} request(s), {} failed: {}",
        status.request_count,
        status.failure_count,
        status.current_message
    );

    controller.shutdown();
    while let Some(result) = tasks.join_next().await {
        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!("Task exited with error: {e:#}"),
            Err(e) => tracing::error!("Task panicked: {e}"),
        }
    }

    Ok(match delivery? {
        Delivery::Text(text) => {
            println!("{text}");
            ExitCode::SUCCESS
        }
        Delivery::Error(message) => {
            eprintln!("OCR failed: {message}");
            ExitCode::from(EXIT_OCR_FAILED)
        }
        Delivery::Discarded => ExitCode::SUCCESS,
    })
}
