//! Run the engine once and dump what it printed - run with:
//! cargo run -p snapocr-ocr --bin test_engine -- <image>

use std::path::PathBuf;

use anyhow::{Context, Result};
use snapocr_config::Config;
use snapocr_config::ocr::install_dir;
use snapocr_core::parser::OutputParser;
use snapocr_ocr::{ProcessArguments, ProcessEngine, Recognizer};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    let image = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .context("usage: test_engine <image>")?;

    let config = Config::new();
    let args = ProcessArguments::from_config(&config.ocr, &install_dir());
    tracing::info!("Engine: {}", args.engine_path.display());
    tracing::info!("Models: {}", args.models_dir.display());

    // 1. Monitors, for checking scale detection on this machine
    match snapocr_ocr::list_monitors() {
        Ok(monitors) => {
            for m in monitors {
                tracing::info!(
                    "   [{}] {} primary={} scale={} {:?}",
                    m.index,
                    m.name,
                    m.is_primary,
                    m.scale_factor,
                    m.descriptor
                );
            }
        }
        Err(e) => tracing::warn!("   Monitors unavailable: {e}"),
    }

    // 2. Run engine
    let start = std::time::Instant::now();
    let output = ProcessEngine::new(args).run(&image)?;
    tracing::info!("Engine took {:?}, exit {:?}", start.elapsed(), output.exit_code);

    // 3. Raw and parsed views
    let parser = OutputParser::new(config.markers.clone());
    let combined = parser.combine(&output);
    tracing::info!("Raw output:\n{}", String::from_utf8_lossy(&combined));
    tracing::info!("Outcome: {:?}", parser.outcome(&output));

    Ok(())
}
