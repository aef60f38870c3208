/// Live status reported at the start of each article and each image fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub current_file: String,
    pub current_image: Option<String>,
}

impl ProgressUpdate {
    pub fn article(current_file: impl Into<String>) -> Self {
        Self {
            current_file: current_file.into(),
            current_image: None,
        }
    }

    pub fn image(current_file: impl Into<String>, current_image: impl Into<String>) -> Self {
        Self {
            current_file: current_file.into(),
            current_image: Some(current_image.into()),
        }
    }
}

/// Settled image fetches of one article.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageProgress {
    pub completed: usize,
    pub total: usize,
}

impl ImageProgress {
    /// Completed share in `0.0..=1.0`; an article without images counts as done.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.completed.min(self.total) as f64 / self.total as f64
    }
}
