//! Predict command - run the two-model pipeline over one image.

use std::path::PathBuf;

use anyhow::{Context, Result};
use blinkcheck_adapters::{fs, models, overlay::Overlay};
use blinkcheck_core::inference::{load_weights, select_device, BlinkClassifier, FaceFinder};
use blinkcheck_core::{
    DetectionParams, ImageDimensions, PredictError, PredictReport, Predictor, ReportOutput,
};
use clap::Args;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::output::JsonOutput;

/// Hardcoded default values for the detector thresholds.
mod defaults {
    pub const IOU_THRESHOLD: f32 = 0.5;
    pub const CONFIDENCE_THRESHOLD: f32 = 0.3;
}

/// Parse and validate a threshold value (0.0-1.0).
fn parse_threshold(s: &str) -> Result<f32, String> {
    let value: f32 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is not in 0.0..=1.0"))
    }
}

/// Arguments for the predict command.
#[derive(Args, Clone)]
pub struct PredictArgs {
    /// Image to analyze (defaults to the built-in sample scene)
    pub image: Option<PathBuf>,

    /// Non-maximum-suppression IoU threshold (0.0-1.0)
    #[arg(long, value_parser = parse_threshold)]
    pub iou_threshold: Option<f32>,

    /// Detection confidence threshold (0.0-1.0)
    #[arg(long, value_parser = parse_threshold)]
    pub confidence_threshold: Option<f32>,

    /// Write an annotated copy of the image to this path
    #[arg(long, value_name = "FILE")]
    pub annotate: Option<PathBuf>,

    /// Font file used for score labels on the annotated image
    #[arg(long, value_name = "FILE")]
    pub font: Option<PathBuf>,

    /// Pretty-print the JSON report
    #[arg(long)]
    pub pretty: bool,

    /// Custom models directory (overrides default and config)
    #[arg(long, value_name = "DIR")]
    pub models_dir: Option<PathBuf>,
}

impl PredictArgs {
    /// Apply configuration file values, respecting CLI precedence.
    ///
    /// Layering priority (lowest to highest):
    /// 1. Hardcoded defaults (in accessor methods)
    /// 2. Config file values (XDG, then project-local)
    /// 3. CLI arguments (already set on self)
    #[must_use]
    pub fn with_config(mut args: Self, config: &AppConfig) -> Self {
        args.iou_threshold = args.iou_threshold.or(config.detector.iou_threshold);
        args.confidence_threshold = args
            .confidence_threshold
            .or(config.detector.confidence_threshold);

        if args.font.is_none() {
            args.font.clone_from(&config.render.font);
        }
        if !args.pretty {
            args.pretty = config.output.pretty.unwrap_or(false);
        }
        if args.models_dir.is_none() {
            args.models_dir.clone_from(&config.models.dir);
        }

        args
    }

    /// Detection parameters with fallback to hardcoded defaults.
    fn params(&self) -> DetectionParams {
        DetectionParams {
            iou_threshold: self.iou_threshold.unwrap_or(defaults::IOU_THRESHOLD),
            confidence_threshold: self
                .confidence_threshold
                .unwrap_or(defaults::CONFIDENCE_THRESHOLD),
        }
    }
}

/// Run the predict command.
///
/// Expects `args` to have been processed through `with_config()` first.
///
/// # Errors
///
/// Returns an error if the models are missing or broken, the image cannot be
/// loaded, or the detector invocation fails. Per-box classification failures
/// do not surface here; they show up as `null` scores in the report.
pub fn run(args: &PredictArgs) -> Result<()> {
    if let Some(ref dir) = args.models_dir {
        debug!("using custom models directory: {}", dir.display());
        models::set_models_dir(Some(dir.clone()));
    }

    let detector_path = models::model_path(models::FACE_FINDER)
        .context("unknown detector model configuration")?;
    let classifier_path =
        models::model_path(models::BLINK).context("unknown classifier model configuration")?;
    for path in [&detector_path, &classifier_path] {
        anyhow::ensure!(
            path.exists(),
            "model weights missing: {} (run `blinkcheck models fetch`)",
            path.display()
        );
    }

    // Models are constructed once, up front; a bad artifact surfaces here
    // instead of mid-pipeline.
    let device = select_device();
    let detector = FaceFinder::new(&load_weights(&detector_path, &device)?)
        .context("failed to initialize face detector")?;
    let classifier = BlinkClassifier::new(&load_weights(&classifier_path, &device)?)
        .context("failed to initialize blink classifier")?;

    let source = match args.image {
        Some(ref path) => fs::load_image(path).map_err(PredictError::ImageLoad)?,
        None => fs::sample_image(),
    };
    info!(
        "predicting on {} ({}x{})",
        source.path, source.width, source.height
    );

    let predictor = Predictor::new(&detector, &classifier, args.params());
    let faces = predictor.predict(&source)?;
    info!("found {} face(s)", faces.len());

    let report = PredictReport {
        path: source.path.clone(),
        timestamp: rfc3339_timestamp(),
        dimensions: ImageDimensions::new(source.width, source.height),
        faces,
    };

    let output = JsonOutput::stdout(args.pretty);
    output.write(&report)?;
    output.flush()?;

    if let Some(ref out_path) = args.annotate {
        let overlay = match args.font {
            Some(ref font) => Overlay::with_font_file(font)?,
            None => Overlay::new(),
        };
        let mut canvas = source.image.to_rgb8();
        overlay.draw(&mut canvas, &report.faces);
        canvas
            .save(out_path)
            .with_context(|| format!("failed to write annotated image: {}", out_path.display()))?;
        info!("annotated image written to {}", out_path.display());
    }

    Ok(())
}

/// Generate an RFC 3339 UTC timestamp.
fn rfc3339_timestamp() -> String {
    match time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339) {
        Ok(ts) => ts,
        Err(e) => {
            debug!("timestamp format failed: {e}");
            String::from("1970-01-01T00:00:00Z")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_args() -> PredictArgs {
        PredictArgs {
            image: None,
            iou_threshold: None,
            confidence_threshold: None,
            annotate: None,
            font: None,
            pretty: false,
            models_dir: None,
        }
    }

    #[test]
    fn test_parse_threshold_accepts_range() {
        assert_eq!(parse_threshold("0.0"), Ok(0.0));
        assert_eq!(parse_threshold("0.5"), Ok(0.5));
        assert_eq!(parse_threshold("1.0"), Ok(1.0));
    }

    #[test]
    fn test_parse_threshold_rejects_out_of_range() {
        assert!(parse_threshold("1.5").is_err());
        assert!(parse_threshold("-0.1").is_err());
        assert!(parse_threshold("abc").is_err());
    }

    #[test]
    fn test_params_fall_back_to_defaults() {
        let params = bare_args().params();
        assert!((params.iou_threshold - 0.5).abs() < f32::EPSILON);
        assert!((params.confidence_threshold - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn test_with_config_cli_wins() {
        let mut args = bare_args();
        args.iou_threshold = Some(0.9);

        let mut config = AppConfig::default();
        config.detector.iou_threshold = Some(0.2);
        config.detector.confidence_threshold = Some(0.6);

        let merged = PredictArgs::with_config(args, &config);
        assert_eq!(merged.iou_threshold, Some(0.9));
        assert_eq!(merged.confidence_threshold, Some(0.6));
    }

    #[test]
    fn test_with_config_fills_models_dir_and_output() {
        let mut config = AppConfig::default();
        config.models.dir = Some(PathBuf::from("/opt/models"));
        config.output.pretty = Some(true);

        let merged = PredictArgs::with_config(bare_args(), &config);
        assert_eq!(merged.models_dir, Some(PathBuf::from("/opt/models")));
        assert!(merged.pretty);
    }

    #[test]
    fn test_rfc3339_timestamp_shape() {
        let ts = rfc3339_timestamp();
        assert!(ts.contains('T'));
        assert!(ts.len() >= 20);
    }
}
