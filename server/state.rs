use digit_canvas::{Network, PreprocessOptions, Session};

/// Everything a request handler needs, built once in `main` and passed down
/// by `&mut`.  Requests are served one at a time, so no locking is involved.
pub struct App {
    /// Loaded at startup; read-only for the life of the process.
    pub classifier: Network,
    pub session:    Session,
    pub options:    PreprocessOptions,
}

impl App {
    pub fn new(classifier: Network, options: PreprocessOptions) -> Self {
        App {
            classifier,
            session: Session::new(),
            options,
        }
    }

    /// One-line model summary for the page footer.
    pub fn model_description(&self) -> String {
        let layers = self.classifier.layers.len();
        match self.classifier.metadata.as_ref().and_then(|m| m.description.as_deref()) {
            Some(desc) => format!("{} ({} layers)", desc, layers),
            None       => format!("Dense network, {} layers", layers),
        }
    }
}
