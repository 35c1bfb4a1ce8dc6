//! Loader that builds the feed store from a directory of JSON files.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::types::{FeedConfig, FeedConfigStore, FeedDefinition};
use crate::error::{GelrssError, Result};

/// Outcome of scanning the config directory.
#[derive(Debug, Default)]
pub struct LoadResult {
    /// Feeds that loaded successfully.
    pub store: FeedConfigStore,
    /// Files that were skipped, with the reason.
    pub skipped: Vec<(String, String)>,
}

/// Loader for per-feed JSON files.
pub struct FeedLoader {
    config_dir: PathBuf,
    create_examples: bool,
}

impl FeedLoader {
    /// Create a loader for the given directory.
    pub fn new<P: AsRef<Path>>(config_dir: P) -> Self {
        Self {
            config_dir: config_dir.as_ref().to_path_buf(),
            create_examples: false,
        }
    }

    /// Write example feed files when the directory yields no usable feed.
    pub fn with_examples(mut self, create_examples: bool) -> Self {
        self.create_examples = create_examples;
        self
    }

    /// Scan the directory and build the feed store.
    ///
    /// A malformed file never aborts the load; it is logged and reported in
    /// [`LoadResult::skipped`].
    pub fn load(&self) -> Result<LoadResult> {
        if !self.config_dir.exists() {
            fs::create_dir_all(&self.config_dir)?;
            info!("Created feed config directory {}", self.config_dir.display());
        }

        let mut result = self.scan()?;

        if result.store.is_empty() && self.create_examples {
            info!("No feed configuration found, writing examples");
            self.write_examples()?;
            let reloaded = self.scan()?;
            result.store = reloaded.store;
            result.skipped.extend(reloaded.skipped);
        }

        info!("{} feed configuration(s) loaded", result.store.len());
        Ok(result)
    }

    fn scan(&self) -> Result<LoadResult> {
        let mut feeds = Vec::new();
        let mut skipped = Vec::new();

        let mut paths: Vec<PathBuf> = fs::read_dir(&self.config_dir)?
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        for path in paths {
            let name = path.display().to_string();
            match Self::load_file(&path) {
                Ok((feed_id, config)) => {
                    info!("Feed config loaded: {}", feed_id);
                    feeds.push((feed_id, config));
                }
                Err(e) => {
                    warn!("Skipping feed config {}: {}", name, e);
                    skipped.push((name, e.to_string()));
                }
            }
        }

        Ok(LoadResult {
            store: feeds.into_iter().collect(),
            skipped,
        })
    }

    /// Parse one file; the feed id is the file stem.
    fn load_file(path: &Path) -> Result<(String, FeedConfig)> {
        let feed_id = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .filter(|stem| !stem.is_empty())
            .ok_or_else(|| GelrssError::Config("file has no usable name".to_string()))?;

        let content = fs::read_to_string(path)?;
        let definition: FeedDefinition = serde_json::from_str(&content)
            .map_err(|e| GelrssError::Config(format!("invalid JSON: {e}")))?;

        let config = FeedConfig::resolve(&feed_id, definition)?;
        Ok((feed_id, config))
    }

    fn write_examples(&self) -> Result<()> {
        let examples = [
            (
                "khyle.json",
                FeedDefinition {
                    tag: Some("khyle_(artist)".to_string()),
                    artist_name: Some("Khyle".to_string()),
                    icon_url: Some("https://img.gelbooru.com/icon.png".to_string()),
                    feed_title: Some("Posts of Khyle from Gelbooru".to_string()),
                    feed_link: Some(
                        "https://gelbooru.com/index.php?page=post&s=list&tags=khyle_(artist)+"
                            .to_string(),
                    ),
                },
            ),
            (
                "optionaltypo.json",
                FeedDefinition {
                    tag: Some("optionaltypo".to_string()),
                    artist_name: Some("OptionalTypo".to_string()),
                    icon_url: Some(
                        "https://pbs.twimg.com/profile_images/1333723296584462336/p9ApAZjk_400x400.jpg"
                            .to_string(),
                    ),
                    feed_title: Some("Posts of OptionalTypo from Gelbooru".to_string()),
                    feed_link: Some(
                        "https://gelbooru.com/index.php?page=post&s=list&tags=optionaltypo+"
                            .to_string(),
                    ),
                },
            ),
        ];

        for (file, definition) in examples {
            let json = serde_json::to_string_pretty(&definition)
                .map_err(|e| GelrssError::Config(format!("failed to encode example: {e}")))?;
            fs::write(self.config_dir.join(file), json)?;
            info!("Example feed config written: {}", file);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) {
        fs::write(dir.path().join(name), content).unwrap();
    }

    #[test]
    fn test_load_valid_files() {
        let dir = TempDir::new().unwrap();
        write(&dir, "foo.json", r#"{"GELBOORU_TAG": "foo", "ARTIST_NAME": "Foo"}"#);
        write(&dir, "bar.json", r#"{"GELBOORU_TAG": "bar"}"#);

        let result = FeedLoader::new(dir.path()).load().unwrap();

        assert_eq!(result.store.len(), 2);
        assert!(result.skipped.is_empty());
        assert_eq!(result.store.get("foo").unwrap().artist_name, "Foo");
        assert_eq!(result.store.get("bar").unwrap().artist_name, "bar");
    }

    #[test]
    fn test_invalid_files_are_skipped() {
        let dir = TempDir::new().unwrap();
        write(&dir, "good.json", r#"{"GELBOORU_TAG": "good"}"#);
        write(&dir, "notag.json", r#"{"ARTIST_NAME": "No Tag"}"#);
        write(&dir, "broken.json", "{ not json");
        write(&dir, "readme.txt", "ignored");

        let result = FeedLoader::new(dir.path()).load().unwrap();

        assert_eq!(result.store.ids(), vec!["good".to_string()]);
        assert_eq!(result.skipped.len(), 2);
        assert!(result
            .skipped
            .iter()
            .any(|(file, reason)| file.ends_with("notag.json") && reason.contains("GELBOORU_TAG")));
        assert!(result
            .skipped
            .iter()
            .any(|(file, reason)| file.ends_with("broken.json") && reason.contains("invalid JSON")));
    }

    #[test]
    fn test_missing_directory_is_created() {
        let dir = TempDir::new().unwrap();
        let config_dir = dir.path().join("configs");

        let result = FeedLoader::new(&config_dir).load().unwrap();

        assert!(config_dir.is_dir());
        assert!(result.store.is_empty());
    }

    #[test]
    fn test_examples_written_when_empty() {
        let dir = TempDir::new().unwrap();

        let result = FeedLoader::new(dir.path())
            .with_examples(true)
            .load()
            .unwrap();

        assert_eq!(
            result.store.ids(),
            vec!["khyle".to_string(), "optionaltypo".to_string()]
        );
        assert!(dir.path().join("khyle.json").exists());
        assert_eq!(result.store.get("khyle").unwrap().tag, "khyle_(artist)");
    }

    #[test]
    fn test_examples_not_written_when_feeds_exist() {
        let dir = TempDir::new().unwrap();
        write(&dir, "foo.json", r#"{"GELBOORU_TAG": "foo"}"#);

        let result = FeedLoader::new(dir.path())
            .with_examples(true)
            .load()
            .unwrap();

        assert_eq!(result.store.len(), 1);
        assert!(!dir.path().join("khyle.json").exists());
    }
}
