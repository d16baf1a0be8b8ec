use std::cell::Cell;
use std::path::PathBuf;

use digit_canvas::{
    load_digit_model, preprocess, ActivationFunction, Classifier, ClassifyError, InputType,
    Layer, Matrix, ModelError, ModelMetadata, Network, NormalizedTensor, PredictOutcome,
    PreprocessOptions, RawCanvasImage, Session, DIGIT_LABELS, STROKE_WIDTH,
};

fn draw(strokes: &[&[(f32, f32)]]) -> RawCanvasImage {
    let mut canvas = RawCanvasImage::blank();
    for s in strokes {
        canvas.paint_stroke(s, STROKE_WIDTH);
    }
    canvas
}

fn seven() -> RawCanvasImage {
    draw(&[&[(70.0, 70.0), (210.0, 70.0), (120.0, 235.0)]])
}

fn one() -> RawCanvasImage {
    draw(&[&[(140.0, 45.0), (140.0, 235.0)]])
}

fn zero() -> RawCanvasImage {
    draw(&[&[
        (100.0, 40.0), (180.0, 40.0), (195.0, 140.0), (180.0, 240.0),
        (100.0, 240.0), (85.0, 140.0), (100.0, 40.0),
    ]])
}

/// A single softmax layer whose weight columns are mean-centred digit
/// templates, so a drawing scores highest against the template it resembles.
fn template_network() -> Network {
    let opts = PreprocessOptions::default();
    let mut weights = Matrix::zeros(784, 10);
    for (digit, canvas) in [(0, zero()), (1, one()), (7, seven())] {
        let t = preprocess(&canvas, &opts);
        let mean = t.as_slice().iter().sum::<f64>() / t.len() as f64;
        for (i, v) in t.as_slice().iter().enumerate() {
            weights.data[i][digit] = v - mean;
        }
    }
    Network::new(vec![Layer::from_parts(weights, Matrix::zeros(1, 10), ActivationFunction::Softmax)])
        .with_metadata(ModelMetadata {
            description: Some("digit templates".into()),
            input_type: Some(InputType::ImageGrayscale { width: 28, height: 28 }),
            output_labels: Some(DIGIT_LABELS.iter().map(|s| s.to_string()).collect()),
        })
}

fn temp_model_path(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("digit-canvas-{}-{}.json", tag, std::process::id()))
}

struct Counting<'a> {
    inner: &'a Network,
    calls: Cell<usize>,
}

impl Classifier for Counting<'_> {
    fn classify(&self, tensor: &NormalizedTensor) -> Result<Vec<f64>, ClassifyError> {
        self.calls.set(self.calls.get() + 1);
        self.inner.classify(tensor)
    }
}

#[test]
fn centred_seven_is_recognised() {
    let network = template_network();
    // Drawn a little off the template, as a user would.
    let drawing = draw(&[&[(75.0, 66.0), (205.0, 72.0), (125.0, 230.0)]]);

    let mut session = Session::new();
    assert!(session.submit(0, Some(drawing)));
    match session.predict(&network, &PreprocessOptions::default()).unwrap() {
        PredictOutcome::Prediction(result) => {
            assert_eq!(result.label, 7);
            assert_eq!(result.name, "Seven");
            assert!(result.confidence > 50.0, "confidence {}", result.confidence);
        }
        PredictOutcome::NoDrawing => panic!("drawing was not classified"),
    }
}

#[test]
fn distribution_has_ten_probabilities() {
    let network = template_network();
    let tensor = preprocess(&one(), &PreprocessOptions::default());
    let dist = network.classify(&tensor).unwrap();
    assert_eq!(dist.len(), 10);
    assert!((dist.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    let best = dist.iter().cloned().fold(f64::MIN, f64::max);
    assert_eq!(dist[1], best);
}

#[test]
fn model_file_round_trips_through_disk() {
    let path = temp_model_path("templates");
    template_network().save_json(&path).unwrap();
    let loaded = load_digit_model(&path);
    let _ = std::fs::remove_file(&path);

    let network = loaded.unwrap();
    assert_eq!(network.labels()[7], "Seven");
    let tensor = preprocess(&seven(), &PreprocessOptions::default());
    let dist = network.classify(&tensor).unwrap();
    let argmax = dist.iter().enumerate().max_by(|a, b| a.1.total_cmp(b.1)).unwrap().0;
    assert_eq!(argmax, 7);
}

#[test]
fn unusable_model_files_are_rejected() {
    assert!(matches!(load_digit_model("no/such/model.json"), Err(ModelError::Io(_))));

    let garbage = temp_model_path("garbage");
    std::fs::write(&garbage, "{\"layers\": 3}").unwrap();
    let parsed = load_digit_model(&garbage);
    let _ = std::fs::remove_file(&garbage);
    assert!(matches!(parsed, Err(ModelError::Parse(_))));

    let wrong_input = temp_model_path("wrong-input");
    Network::new(vec![Layer::from_parts(Matrix::zeros(10, 10), Matrix::zeros(1, 10), ActivationFunction::Softmax)])
        .save_json(&wrong_input)
        .unwrap();
    let loaded = load_digit_model(&wrong_input);
    let _ = std::fs::remove_file(&wrong_input);
    assert!(matches!(loaded, Err(ModelError::InputSize { expected: 784, got: 10 })));

    let rgb = temp_model_path("rgb");
    template_network()
        .with_metadata(ModelMetadata {
            input_type: Some(InputType::ImageRgb { width: 28, height: 28 }),
            ..Default::default()
        })
        .save_json(&rgb)
        .unwrap();
    let loaded = load_digit_model(&rgb);
    let _ = std::fs::remove_file(&rgb);
    assert!(matches!(loaded, Err(ModelError::IncompatibleInput(_))));
}

#[test]
fn clear_then_predict_warns_without_calling_the_model() {
    let network = template_network();
    let counting = Counting { inner: &network, calls: Cell::new(0) };
    let opts = PreprocessOptions::default();

    let mut session = Session::new();
    session.submit(0, Some(seven()));
    assert!(matches!(session.predict(&counting, &opts).unwrap(), PredictOutcome::Prediction(_)));
    assert_eq!(counting.calls.get(), 1);

    session.clear();
    assert_eq!(session.predict(&counting, &opts).unwrap(), PredictOutcome::NoDrawing);

    session.submit(session.version(), None);
    assert_eq!(session.predict(&counting, &opts).unwrap(), PredictOutcome::NoDrawing);
    assert_eq!(counting.calls.get(), 1);
}
