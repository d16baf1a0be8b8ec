pub mod math;
pub mod activation;
pub mod layers;
pub mod network;
pub mod canvas;
pub mod preprocess;
pub mod classify;
pub mod session;
pub mod config;

// Convenience re-exports
pub use math::matrix::Matrix;
pub use activation::activation::ActivationFunction;
pub use layers::dense::Layer;
pub use network::{Network, ModelError, ModelMetadata, InputType};
pub use canvas::{RawCanvasImage, CanvasError, CANVAS_SIZE, STROKE_WIDTH};
pub use preprocess::{prepare, preprocess, NormalizedTensor, PreprocessOptions, ChannelOrder, Interpolation};
pub use classify::{load_digit_model, Classifier, ClassifyError, PredictionResult, DIGIT_LABELS, NUM_CLASSES};
pub use session::{Session, PredictOutcome};
pub use config::{AppConfig, ConfigError, CONFIG_FILE};
