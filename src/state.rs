use serde::Serialize;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
pub enum PresentationPhase {
    Idle,     // Waiting for a submission
    Starting, // Audio start attempt in flight, no epoch yet
    Running,  // Epoch stamped, schedulers armed
}

/// What the form collaborator has collected so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState<I> {
    pub images: Vec<I>,
    /// `None` picks a track at random.
    pub track: Option<String>,
    pub name: String,
}

impl<I> Default for FormState<I> {
    fn default() -> Self {
        Self {
            images: Vec::new(),
            track: None,
            name: String::new(),
        }
    }
}

impl<I> FormState<I> {
    pub fn clear(&mut self) {
        self.images.clear();
        self.track = None;
        self.name.clear();
    }
}
