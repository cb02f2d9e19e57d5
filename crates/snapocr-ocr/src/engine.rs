use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;

use snapocr_config::ocr::OcrConfig;
use snapocr_core::parser::RawOutput;
use snapocr_core::{OcrError, Result};

#[cfg(windows)]
use std::os::windows::process::CommandExt;

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Runs OCR over an image file and returns the engine's raw streams.
///
/// Blocking; callers move it onto a worker thread.
pub trait Recognizer: Send + Sync {
    fn run(&self, image_path: &Path) -> Result<RawOutput>;
}

/// Static engine invocation parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessArguments {
    pub engine_path: PathBuf,
    pub models_dir: PathBuf,
    pub det_model: String,
    pub cls_model: String,
    pub rec_model: String,
    pub keys_file: String,
    pub num_threads: u32,
    pub gpu_index: i32,
}

impl ProcessArguments {
    pub fn from_config(config: &OcrConfig, install_dir: &Path) -> Self {
        Self {
            engine_path: config.resolve_engine_path(install_dir),
            models_dir: config.resolve_models_dir(install_dir),
            det_model: config.det_model.clone(),
            cls_model: config.cls_model.clone(),
            rec_model: config.rec_model.clone(),
            keys_file: config.keys_file.clone(),
            num_threads: config.num_threads,
            gpu_index: config.gpu_index,
        }
    }

    pub fn model_paths(&self) -> Vec<PathBuf> {
        [
            &self.keys_file,
            &self.det_model,
            &self.cls_model,
            &self.rec_model,
        ]
        .iter()
        .map(|name| self.models_dir.join(name))
        .collect()
    }

    /// Checked before each spawn
    pub fn validate(&self) -> Result<()> {
        if !self.engine_path.exists() {
            return Err(OcrError::EngineNotFound(self.engine_path.clone()));
        }
        if !self.models_dir.is_dir() {
            return Err(OcrError::ModelsMissing(self.models_dir.clone()));
        }
        Ok(())
    }

    /// Startup check: every missing file, engine first
    pub fn verify_installation(&self) -> Result<()> {
        let missing: Vec<PathBuf> = std::iter::once(self.engine_path.clone())
            .chain(self.model_paths())
            .filter(|path| !path.exists())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(OcrError::MissingFiles(missing))
        }
    }

    pub fn command_args(&self, image_path: &Path) -> Vec<OsString> {
        vec![
            "--models".into(),
            self.models_dir.clone().into(),
            "--det".into(),
            self.det_model.clone().into(),
            "--cls".into(),
            self.cls_model.clone().into(),
            "--rec".into(),
            self.rec_model.clone().into(),
            "--keys".into(),
            self.keys_file.clone().into(),
            "--image".into(),
            image_path.as_os_str().to_owned(),
            "--numThread".into(),
            self.num_threads.to_string().into(),
            "--GPU".into(),
            self.gpu_index.to_string().into(),
        ]
    }
}

/// External engine process
#[derive(Debug, Clone)]
pub struct ProcessEngine {
    args: ProcessArguments,
}

impl ProcessEngine {
    pub fn new(args: ProcessArguments) -> Self {
        Self { args }
    }
}

impl Recognizer for ProcessEngine {
    fn run(&self, image_path: &Path) -> Result<RawOutput> {
        self.args.validate()?;

        let mut command = Command::new(&self.args.engine_path);
        command
            .args(self.args.command_args(image_path))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        #[cfg(windows)]
        command.creation_flags(CREATE_NO_WINDOW);

        tracing::debug!(
            "Spawning {} for {}",
            self.args.engine_path.display(),
            image_path.display()
        );
        let start = Instant::now();
        let output = command.output().map_err(|e| {
            OcrError::InvocationFailed(format!(
                "failed to run {}: {e}",
                self.args.engine_path.display()
            ))
        })?;

        // Exit status is not authoritative, the output is inspected instead
        tracing::debug!(
            "Engine exited with {:?} after {:?} ({} bytes stdout, {} bytes stderr)",
            output.status.code(),
            start.elapsed(),
            output.stdout.len(),
            output.stderr.len()
        );

        Ok(RawOutput {
            stdout: output.stdout,
            stderr: output.stderr,
            exit_code: output.status.code(),
        })
    }
}
