use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use snapocr_config::Config;
use snapocr_config::ocr::install_dir;

const PROFILE_FILE: &str = "config.json";

/// Profile next to the executable
pub fn default_profile_path() -> PathBuf {
    install_dir().join(PROFILE_FILE)
}

/// Where the active profile came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileSource {
    File(PathBuf),
    Defaults,
}

/// Load the explicit profile, else the one next to the executable, else
/// defaults; environment overrides are applied last
pub fn load_profile(path: Option<&Path>) -> anyhow::Result<(Config, ProfileSource)> {
    let (mut config, source) = match path {
        Some(path) => (read_profile(path)?, ProfileSource::File(path.to_path_buf())),
        None => {
            let path = default_profile_path();
            if path.exists() {
                (read_profile(&path)?, ProfileSource::File(path))
            } else {
                (Config::default(), ProfileSource::Defaults)
            }
        }
    };

    config.apply_env();
    Ok((config, source))
}

fn read_profile(path: &Path) -> anyhow::Result<Config> {
    let file = File::open(path).with_context(|| format!("cannot open profile {}", path.display()))?;
    let reader = BufReader::new(file);
    let config = serde_json::from_reader(reader)
        .with_context(|| format!("invalid profile {}", path.display()))?;
    Ok(config)
}

/// Write the default profile, never overwriting an existing one
pub fn init_profile(path: &Path) -> anyhow::Result<()> {
    if path.exists() {
        bail!("{} already exists", path.display());
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, serde_json::to_string_pretty(&Config::default())?)
        .with_context(|| format!("cannot write profile {}", path.display()))?;
    tracing::info!("Created profile {}", path.display());
    Ok(())
}
