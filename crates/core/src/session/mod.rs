use serde::{Deserialize, Serialize};

/// Descriptive metadata for a loaded score. Replaced wholesale on every load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScoreMetadata {
    pub title: String,
    pub composer: String,
    pub copyright: String,
    pub measure_count: u32,
    pub num_parts: u32,
    pub duration_seconds: f32,
}

/// Score-level state populated once per load: the metadata snapshot and the
/// total duration the time cursor is bounded by.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    metadata: ScoreMetadata,
    duration: f32,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a freshly decoded score. Negative or non-finite durations are
    /// stored as zero.
    pub fn populate(&mut self, metadata: ScoreMetadata, duration: f32) {
        self.duration = if duration.is_finite() { duration.max(0.0) } else { 0.0 };
        self.metadata = metadata;
        self.metadata.duration_seconds = self.duration;
    }

    pub fn reset(&mut self) {
        self.metadata = ScoreMetadata::default();
        self.duration = 0.0;
    }

    pub fn metadata(&self) -> &ScoreMetadata {
        &self.metadata
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn populate_then_reset() {
        let mut store = SessionStore::new();
        store.populate(
            ScoreMetadata {
                title: "Prelude".to_string(),
                measure_count: 32,
                ..Default::default()
            },
            95.5,
        );

        assert_eq!(store.duration(), 95.5);
        assert_eq!(store.metadata().title, "Prelude");
        assert_eq!(store.metadata().duration_seconds, 95.5);

        store.reset();
        assert_eq!(store.duration(), 0.0);
        assert_eq!(store.metadata(), &ScoreMetadata::default());
    }

    #[test]
    fn sanitises_invalid_durations() {
        let mut store = SessionStore::new();
        store.populate(ScoreMetadata::default(), -4.0);
        assert_eq!(store.duration(), 0.0);
        store.populate(ScoreMetadata::default(), f32::NAN);
        assert_eq!(store.duration(), 0.0);
    }
}
