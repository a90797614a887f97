use serde::{Deserialize, Serialize};

use crate::transport::clamp_volume;

/// Mixing state for one instrument or part of the loaded score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackInfo {
    pub index: usize,
    pub name: String,
    pub instrument: String,
    pub muted: bool,
    pub volume: f32,
}

impl Default for TrackInfo {
    fn default() -> Self {
        Self {
            index: 0,
            name: String::new(),
            instrument: String::new(),
            muted: false,
            volume: 1.0,
        }
    }
}

/// A track as produced by a decoder, before it is given an index. Mixing
/// fields are optional because most formats do not encode them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackSpec {
    pub name: String,
    #[serde(default)]
    pub instrument: String,
    #[serde(default)]
    pub muted: Option<bool>,
    #[serde(default)]
    pub volume: Option<f32>,
}

impl TrackSpec {
    pub fn new(name: impl Into<String>, instrument: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instrument: instrument.into(),
            ..Default::default()
        }
    }

    fn into_track(self, index: usize) -> TrackInfo {
        TrackInfo {
            index,
            name: self.name,
            instrument: self.instrument,
            muted: self.muted.unwrap_or(false),
            volume: clamp_volume(self.volume.unwrap_or(1.0)),
        }
    }
}

/// Ordered per-track mixing state. Indices are contiguous from zero and only
/// valid until the next [`TrackRegistry::replace`] or [`TrackRegistry::clear`].
///
/// Every index-taking mutator silently ignores indices that are out of range,
/// so stale references held by a UI across a reload are harmless.
#[derive(Debug, Default, Clone)]
pub struct TrackRegistry {
    tracks: Vec<TrackInfo>,
}

impl TrackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the registry from decoded tracks, assigning indices in order.
    pub fn replace(&mut self, specs: Vec<TrackSpec>) {
        self.tracks = specs
            .into_iter()
            .enumerate()
            .map(|(index, spec)| spec.into_track(index))
            .collect();
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
    }

    pub fn count(&self) -> usize {
        self.tracks.len()
    }

    pub fn get(&self, index: usize) -> Option<&TrackInfo> {
        self.tracks.get(index)
    }

    pub fn as_slice(&self) -> &[TrackInfo] {
        &self.tracks
    }

    pub fn set_muted(&mut self, index: usize, muted: bool) {
        if let Some(track) = self.tracks.get_mut(index) {
            track.muted = muted;
        }
    }

    pub fn set_volume(&mut self, index: usize, level: f32) {
        if let Some(track) = self.tracks.get_mut(index) {
            track.volume = clamp_volume(level);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> TrackRegistry {
        let mut registry = TrackRegistry::new();
        registry.replace(vec![
            TrackSpec::new("Violin I", "violin"),
            TrackSpec {
                name: "Cello".to_string(),
                instrument: "cello".to_string(),
                muted: Some(true),
                volume: Some(3.0),
            },
        ]);
        registry
    }

    #[test]
    fn assigns_contiguous_indices_and_defaults() {
        let registry = registry();
        assert_eq!(registry.count(), 2);

        let violin = registry.get(0).unwrap();
        assert_eq!(violin.index, 0);
        assert!(!violin.muted);
        assert_eq!(violin.volume, 1.0);

        let cello = registry.get(1).unwrap();
        assert_eq!(cello.index, 1);
        assert!(cello.muted);
        assert_eq!(cello.volume, 1.0);
    }

    #[test]
    fn clamps_track_volume() {
        let mut registry = registry();
        registry.set_volume(0, -0.5);
        assert_eq!(registry.get(0).unwrap().volume, 0.0);
        registry.set_volume(0, 0.25);
        assert_eq!(registry.get(0).unwrap().volume, 0.25);
    }

    #[test]
    fn ignores_out_of_range_indices() {
        let mut registry = registry();
        let before = registry.as_slice().to_vec();

        registry.set_muted(7, true);
        registry.set_volume(2, 0.1);

        assert_eq!(registry.as_slice(), before.as_slice());
        assert!(registry.get(2).is_none());
    }

    #[test]
    fn replace_discards_previous_tracks() {
        let mut registry = registry();
        registry.replace(vec![TrackSpec::new("Piano", "piano")]);
        assert_eq!(registry.count(), 1);
        assert_eq!(registry.get(0).unwrap().name, "Piano");

        registry.clear();
        assert_eq!(registry.count(), 0);
    }
}
