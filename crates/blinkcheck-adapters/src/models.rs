//! Model weight downloading and caching.
//!
//! Both models are opaque, pre-trained artifacts published as safetensors
//! files. They are cached under the user data directory and verified by
//! checksum after download.

use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

/// Registry name of the face detector weights.
pub const FACE_FINDER: &str = "face_finder";
/// Registry name of the blink classifier weights.
pub const BLINK: &str = "blink";

/// Placeholder checksum indicating verification should be skipped.
const PLACEHOLDER_CHECKSUM: &str =
    "0000000000000000000000000000000000000000000000000000000000000000";

/// Model metadata.
#[derive(Debug, Clone)]
pub struct ModelInfo {
    /// Registry name.
    pub name: &'static str,
    /// Download URL.
    pub url: &'static str,
    /// Expected SHA256 hash. All zeros skips verification.
    pub sha256: &'static str,
    /// Filename in the models directory.
    pub filename: &'static str,
}

/// Known models.
pub const MODELS: &[ModelInfo] = &[
    ModelInfo {
        name: FACE_FINDER,
        url: "https://github.com/blinkcheck/models/releases/download/weights-v1/face_finder.safetensors",
        sha256: PLACEHOLDER_CHECKSUM, // TODO: pin once the weights release is published
        filename: "face_finder.safetensors",
    },
    ModelInfo {
        name: BLINK,
        url: "https://github.com/blinkcheck/models/releases/download/weights-v1/blink.safetensors",
        sha256: PLACEHOLDER_CHECKSUM, // TODO: pin once the weights release is published
        filename: "blink.safetensors",
    },
];

/// Reports download progress: model name, bytes downloaded, total if known.
pub type ProgressCallback = Box<dyn Fn(&str, u64, Option<u64>) + Send + Sync>;

static MODELS_DIR_OVERRIDE: Lazy<Mutex<Option<PathBuf>>> = Lazy::new(|| Mutex::new(None));

/// Overrides the models directory for this process (CLI `--models-dir`).
pub fn set_models_dir(dir: Option<PathBuf>) {
    if let Ok(mut guard) = MODELS_DIR_OVERRIDE.lock() {
        *guard = dir;
    }
}

/// Returns the models directory path.
///
/// The process-wide override wins; otherwise `<data-dir>/blinkcheck/models`.
#[must_use]
pub fn models_dir() -> PathBuf {
    if let Ok(guard) = MODELS_DIR_OVERRIDE.lock() {
        if let Some(ref dir) = *guard {
            return dir.clone();
        }
    }

    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("blinkcheck")
        .join("models")
}

/// Returns the path a model's weights live at, by registry name.
#[must_use]
pub fn model_path(name: &str) -> Option<PathBuf> {
    MODELS
        .iter()
        .find(|m| m.name == name)
        .map(|m| models_dir().join(m.filename))
}

/// Checks whether every model is present locally.
#[must_use]
pub fn all_models_installed() -> bool {
    let dir = models_dir();
    MODELS.iter().all(|m| dir.join(m.filename).exists())
}

/// Lists models with their install status.
#[must_use]
pub fn list_models() -> Vec<(String, bool)> {
    let dir = models_dir();
    MODELS
        .iter()
        .map(|m| (m.name.to_string(), dir.join(m.filename).exists()))
        .collect()
}

/// Ensures all model weights are present, downloading missing ones.
///
/// # Errors
///
/// Returns an error if the models directory cannot be created, a download
/// fails, or a checksum does not match.
pub fn ensure_models() -> Result<()> {
    ensure_models_with_progress(None)
}

/// Like [`ensure_models`], reporting download progress through `progress`.
///
/// # Errors
///
/// Same conditions as [`ensure_models`].
pub fn ensure_models_with_progress(progress: Option<&ProgressCallback>) -> Result<()> {
    let dir = models_dir();
    fs::create_dir_all(&dir).context("failed to create models directory")?;

    for model in MODELS {
        let path = dir.join(model.filename);
        if path.exists() {
            debug!("model {} already present", model.name);
            continue;
        }
        download_model(model, &path, progress)?;
    }

    Ok(())
}

/// Downloads one model and writes it to `path` after verification.
fn download_model(
    model: &ModelInfo,
    path: &PathBuf,
    progress: Option<&ProgressCallback>,
) -> Result<()> {
    info!("downloading model: {}", model.name);

    let mut response = reqwest::blocking::get(model.url)
        .with_context(|| format!("failed to download {}", model.name))?;

    if !response.status().is_success() {
        anyhow::bail!("download failed with status: {}", response.status());
    }

    let total = response.content_length();
    let mut bytes = Vec::new();
    let mut chunk = [0u8; 64 * 1024];
    loop {
        let n = response
            .read(&mut chunk)
            .with_context(|| format!("failed to read response for {}", model.name))?;
        if n == 0 {
            break;
        }
        bytes.extend_from_slice(&chunk[..n]);
        if let Some(callback) = progress {
            callback(model.name, bytes.len() as u64, total);
        }
    }

    verify_checksum(model, &bytes, path)?;

    fs::write(path, &bytes).with_context(|| format!("failed to write {}", model.name))?;
    info!("downloaded {} ({} bytes)", model.name, bytes.len());
    Ok(())
}

fn verify_checksum(model: &ModelInfo, bytes: &[u8], path: &PathBuf) -> Result<()> {
    if model.sha256 == PLACEHOLDER_CHECKSUM {
        debug!(
            "skipping checksum verification for {} (placeholder checksum)",
            model.name
        );
        return Ok(());
    }

    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let hash = format!("{:x}", hasher.finalize());

    if hash != model.sha256 {
        anyhow::bail!(
            "checksum mismatch for {}: expected {}, got {}. \
             Delete {} and re-run to download a fresh copy.",
            model.name,
            model.sha256,
            hash,
            path.display()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_path_known_names() {
        let detector = model_path(FACE_FINDER);
        assert!(detector.is_some_and(|p| p.ends_with("face_finder.safetensors")));

        let classifier = model_path(BLINK);
        assert!(classifier.is_some_and(|p| p.ends_with("blink.safetensors")));
    }

    #[test]
    fn test_model_path_unknown_name() {
        assert!(model_path("landmarks").is_none());
    }

    #[test]
    fn test_models_dir_override_round_trip() {
        // Single test owns the global override to avoid cross-test races.
        let dir = tempfile::tempdir().expect("temp dir");
        set_models_dir(Some(dir.path().to_path_buf()));
        assert_eq!(models_dir(), dir.path());
        assert!(!all_models_installed());

        set_models_dir(None);
        assert!(models_dir().ends_with("blinkcheck/models"));
    }

    #[test]
    fn test_list_models_names() {
        let names: Vec<String> = list_models().into_iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec![FACE_FINDER.to_string(), BLINK.to_string()]);
    }

    #[test]
    fn test_verify_checksum_mismatch() {
        let model = ModelInfo {
            name: "test",
            url: "http://localhost/none",
            sha256: "deadbeef00000000000000000000000000000000000000000000000000000000",
            filename: "test.safetensors",
        };
        let path = PathBuf::from("/tmp/test.safetensors");
        assert!(verify_checksum(&model, b"payload", &path).is_err());
    }

    #[test]
    fn test_verify_checksum_placeholder_skips() {
        let model = ModelInfo {
            name: "test",
            url: "http://localhost/none",
            sha256: PLACEHOLDER_CHECKSUM,
            filename: "test.safetensors",
        };
        let path = PathBuf::from("/tmp/test.safetensors");
        assert!(verify_checksum(&model, b"payload", &path).is_ok());
    }
}
