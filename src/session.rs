//! Per-process drawing session: the live canvas and its version counter.
//!
//! The version identifies the canvas element the page is showing.  A clear
//! bumps it, so the page re-renders a fresh canvas and anything submitted
//! for an older version is discarded.

use crate::canvas::RawCanvasImage;
use crate::classify::{Classifier, ClassifyError, PredictionResult};
use crate::preprocess::{prepare, PreprocessOptions};

/// What a predict action produced.
#[derive(Debug, Clone, PartialEq)]
pub enum PredictOutcome {
    /// There was nothing to classify; show a warning.
    NoDrawing,
    Prediction(PredictionResult),
}

#[derive(Debug, Default)]
pub struct Session {
    version: u64,
    canvas: Option<RawCanvasImage>,
}

impl Session {
    pub fn new() -> Session {
        Session::default()
    }

    /// Version of the canvas currently on screen.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Discards every stroke and moves to a fresh canvas identity.
    pub fn clear(&mut self) {
        self.version += 1;
        self.canvas = None;
        log::debug!("canvas cleared, now at version {}", self.version);
    }

    /// Records the raster the page sent for canvas `version`.  Returns
    /// `false` (and keeps the current state) when `version` is stale.
    pub fn submit(&mut self, version: u64, canvas: Option<RawCanvasImage>) -> bool {
        if version != self.version {
            log::debug!("dropping raster for stale canvas version {} (live: {})", version, self.version);
            return false;
        }
        self.canvas = canvas;
        true
    }

    /// The current raster, if the user has drawn anything on it.
    pub fn drawing(&self) -> Option<&RawCanvasImage> {
        self.canvas.as_ref().filter(|c| c.has_strokes())
    }

    /// Classifies the current drawing.  The classifier is called exactly
    /// once when there is a drawing and never otherwise.
    pub fn predict<C: Classifier>(
        &self,
        classifier: &C,
        options: &PreprocessOptions,
    ) -> Result<PredictOutcome, ClassifyError> {
        let tensor = match prepare(self.drawing(), options) {
            Some(t) => t,
            None    => return Ok(PredictOutcome::NoDrawing),
        };
        let distribution = classifier.classify(&tensor)?;
        let result = PredictionResult::from_distribution(&distribution, &classifier.labels())?;
        Ok(PredictOutcome::Prediction(result))
    }
}
