use std::path::PathBuf;

use score_player_core::{source::filename_from_url, FetchedScore, PlayerError, Result, ScoreFetcher};

/// Fetcher for local scores. Accepts `file://` URLs and plain paths; any
/// other scheme is reported as a fetch failure.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileFetcher;

impl FileFetcher {
    fn resolve(url: &str) -> Result<PathBuf> {
        if let Some(path) = url.strip_prefix("file://") {
            return Ok(PathBuf::from(path));
        }
        if let Some((scheme, _)) = url.split_once("://") {
            return Err(PlayerError::Fetch(format!(
                "unsupported scheme `{scheme}` in `{url}`"
            )));
        }
        Ok(PathBuf::from(url))
    }
}

impl ScoreFetcher for FileFetcher {
    fn fetch(&self, url: &str) -> Result<FetchedScore> {
        let path = Self::resolve(url)?;
        let bytes = std::fs::read(&path)
            .map_err(|err| PlayerError::Fetch(format!("{}: {err}", path.display())))?;
        Ok(FetchedScore {
            bytes,
            filename: filename_from_url(url),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_file_urls_and_paths() {
        assert_eq!(
            FileFetcher::resolve("file:///tmp/canon.json").unwrap(),
            PathBuf::from("/tmp/canon.json")
        );
        assert_eq!(
            FileFetcher::resolve("scores/canon.json").unwrap(),
            PathBuf::from("scores/canon.json")
        );
    }

    #[test]
    fn rejects_remote_schemes_and_missing_files() {
        let err = FileFetcher.fetch("https://example.org/canon.json").unwrap_err();
        assert!(err.to_string().contains("https"));

        let err = FileFetcher.fetch("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, PlayerError::Fetch(_)));
    }
}
