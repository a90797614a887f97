//! Contracts for the collaborators that turn a score reference into decoded
//! playback data, plus a JSON manifest decoder usable without a real score
//! engine.

use std::path::Path;

use serde::Deserialize;

use crate::{PlayerError, Result, ScoreMetadata, TrackSpec};

/// Everything the player needs from a decoded score.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedScore {
    pub tracks: Vec<TrackSpec>,
    pub metadata: ScoreMetadata,
    pub duration_seconds: f32,
}

/// Turns raw score bytes into tracks, metadata and a duration.
pub trait ScoreDecoder {
    fn decode(&self, bytes: &[u8], filename: &str) -> Result<DecodedScore>;
}

/// Raw score bytes retrieved from a URL.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedScore {
    pub bytes: Vec<u8>,
    pub filename: String,
}

/// Retrieves score bytes for a URL. Implementations may block; the player
/// never calls this itself, hosts do, between `load_from_url` and
/// `deliver_fetch`.
pub trait ScoreFetcher {
    fn fetch(&self, url: &str) -> Result<FetchedScore>;
}

/// Last path segment of `url`, without query string or fragment.
pub fn filename_from_url(url: &str) -> String {
    let trimmed = url.split(['?', '#']).next().unwrap_or_default();
    trimmed
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Decoder for JSON score manifests:
///
/// ```json
/// {
///   "title": "Canon in D",
///   "composer": "Pachelbel",
///   "measureCount": 57,
///   "durationSeconds": 10.0,
///   "parts": [{ "name": "Violin I", "instrument": "violin" }]
/// }
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct ManifestDecoder;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Manifest {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    composer: String,
    #[serde(default)]
    copyright: String,
    #[serde(default)]
    measure_count: u32,
    duration_seconds: f32,
    #[serde(default)]
    parts: Vec<TrackSpec>,
}

impl ScoreDecoder for ManifestDecoder {
    fn decode(&self, bytes: &[u8], filename: &str) -> Result<DecodedScore> {
        let manifest: Manifest = serde_json::from_slice(bytes)
            .map_err(|err| PlayerError::Decode(format!("{filename}: {err}")))?;

        if !manifest.duration_seconds.is_finite() || manifest.duration_seconds < 0.0 {
            return Err(PlayerError::Decode(format!(
                "{filename}: duration must be a non-negative number of seconds"
            )));
        }

        let title = manifest
            .title
            .filter(|title| !title.trim().is_empty())
            .unwrap_or_else(|| title_from_filename(filename));

        let metadata = ScoreMetadata {
            title,
            composer: manifest.composer,
            copyright: manifest.copyright,
            measure_count: manifest.measure_count,
            num_parts: manifest.parts.len() as u32,
            duration_seconds: manifest.duration_seconds,
        };

        Ok(DecodedScore {
            tracks: manifest.parts,
            metadata,
            duration_seconds: manifest.duration_seconds,
        })
    }
}

fn title_from_filename(filename: &str) -> String {
    Path::new(filename)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| filename.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_filenames_from_urls() {
        assert_eq!(filename_from_url("https://example.org/scores/canon.json"), "canon.json");
        assert_eq!(filename_from_url("https://example.org/a/b.xml?rev=3#top"), "b.xml");
        assert_eq!(filename_from_url("file:///tmp/scores/"), "scores");
        assert_eq!(filename_from_url("plain.json"), "plain.json");
    }

    #[test]
    fn decodes_manifest_with_defaults() {
        let json = br#"{
            "composer": "Pachelbel",
            "measureCount": 57,
            "durationSeconds": 10.0,
            "parts": [
                { "name": "Violin I", "instrument": "violin" },
                { "name": "Continuo", "instrument": "cello", "muted": true, "volume": 0.5 }
            ]
        }"#;

        let score = ManifestDecoder.decode(json, "canon.json").unwrap();
        assert_eq!(score.metadata.title, "canon");
        assert_eq!(score.metadata.num_parts, 2);
        assert_eq!(score.metadata.measure_count, 57);
        assert_eq!(score.duration_seconds, 10.0);
        assert_eq!(score.tracks[0].muted, None);
        assert_eq!(score.tracks[1].volume, Some(0.5));
    }

    #[test]
    fn rejects_bad_manifests() {
        let err = ManifestDecoder.decode(b"<score/>", "test.xml").unwrap_err();
        assert!(matches!(err, PlayerError::Decode(_)));
        assert!(err.to_string().contains("test.xml"));

        let err = ManifestDecoder
            .decode(br#"{ "durationSeconds": -1 }"#, "neg.json")
            .unwrap_err();
        assert!(err.to_string().contains("non-negative"));
    }
}
