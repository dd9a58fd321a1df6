//! Exports the [`build_site`] and [`build_feed`] functions which stitch
//! together the high-level steps of building the output: rendering the article
//! page ([`crate::page`]) and generating the RSS feed ([`crate::feed`]).

use crate::config::Config;
use crate::feed::{self, Error as FeedError};
use crate::highlight::{Error as HighlightError, Highlighter};
use crate::page::{self, Error as PageError, PAGE_FILE};
use crate::util;
use chrono::Utc;
use std::fmt;
use std::io;
use std::path::PathBuf;
use tracing::info;

/// What a build wrote.
#[derive(Debug)]
pub struct Summary {
    /// The article page, when the build rendered one.
    pub page: Option<PathBuf>,

    pub feed: PathBuf,

    /// The number of feed items.
    pub posts: usize,

    /// The number of posts published with empty content because their file
    /// couldn't be read.
    pub warnings: usize,
}

/// Builds the article page and the feed from a [`Config`] object.
pub fn build_site(config: &Config) -> Result<Summary> {
    let highlighter = Highlighter::new(&config.page.theme)?;
    let template = page::load_template(config)?;
    let html = page::render(config, Some(&highlighter), &template)?;

    let page_path = config.output_directory.join(PAGE_FILE);
    page::write_page(&html, &config.output_directory).map_err(|err| Error::Write {
        path: page_path.clone(),
        err,
    })?;
    info!(path = %page_path.display(), "wrote page");

    let mut summary = build_feed(config)?;
    summary.page = Some(page_path);
    Ok(summary)
}

/// Generates the feed for the configured posts and writes it to
/// `<output directory>/<feed path>`. The directory must already exist.
pub fn build_feed(config: &Config) -> Result<Summary> {
    let feed = feed::generate(&config.site, &config.posts, &config.content_root, Utc::now())?;

    let path = util::resolve(&config.output_directory, &config.site.feed_path);
    feed::write_feed(&feed, &path).map_err(|err| Error::Write {
        path: path.clone(),
        err,
    })?;
    info!(
        path = %path.display(),
        posts = config.posts.len(),
        warnings = feed.warnings.len(),
        "wrote feed"
    );

    Ok(Summary {
        page: None,
        feed: path,
        posts: config.posts.len(),
        warnings: feed.warnings.len(),
    })
}

/// The result type for building a site.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during rendering the
/// page, generating the feed, loading the highlighting theme, or writing
/// output files.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors rendering the article page.
    Page(PageError),

    /// Returned for errors generating the feed.
    Feed(FeedError),

    /// Returned when the configured highlighting theme can't be loaded.
    Highlight(HighlightError),

    /// Returned when an output file can't be written.
    Write { path: PathBuf, err: io::Error },
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Page(err) => err.fmt(f),
            Error::Feed(err) => err.fmt(f),
            Error::Highlight(err) => err.fmt(f),
            Error::Write { path, err } => {
                write!(f, "Writing output file `{}`: {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Page(err) => Some(err),
            Error::Feed(err) => Some(err),
            Error::Highlight(err) => Some(err),
            Error::Write { path: _, err } => Some(err),
        }
    }
}

impl From<PageError> for Error {
    /// Converts [`PageError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: PageError) -> Error {
        Error::Page(err)
    }
}

impl From<FeedError> for Error {
    /// Converts [`FeedError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: FeedError) -> Error {
        Error::Feed(err)
    }
}

impl From<HighlightError> for Error {
    /// Converts [`HighlightError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: HighlightError) -> Error {
        Error::Highlight(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;
    use std::path::Path;

    fn test_config(output: &Path) -> Config {
        Config::from_directory(Path::new("./testdata/project"), Some(output)).unwrap()
    }

    #[test]
    fn test_build_site() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let summary = build_site(&config)?;

        assert_eq!(Some(dir.path().join("index.html")), summary.page);
        assert_eq!(dir.path().join("rss.xml"), summary.feed);
        assert_eq!(1, summary.posts);
        assert_eq!(0, summary.warnings);

        let html = fs::read_to_string(dir.path().join("index.html")).unwrap();
        assert!(html.contains("<h2 id=\"getting-started\">"));
        assert!(html.contains("class=\"code-block\""));
        assert!(html.contains("class=\"code-block-copy\""));
        assert!(html.contains("navigator.clipboard.writeText"));

        let xml = fs::read_to_string(dir.path().join("rss.xml")).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<title>Test Post</title>"));
        assert!(xml.contains("<link>https://example.com/blog/posts/test-post</link>"));
        Ok(())
    }

    #[test]
    fn test_build_feed_only() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let summary = build_feed(&test_config(dir.path()))?;
        assert_eq!(None, summary.page);
        assert!(summary.feed.is_file());
        assert!(!dir.path().join("index.html").exists());
        Ok(())
    }

    #[test]
    fn test_build_feed_counts_warnings() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        config.posts[0].path = String::from("/content/missing.md");
        let summary = build_feed(&config)?;
        assert_eq!(1, summary.warnings);
        Ok(())
    }

    #[test]
    fn test_unknown_theme() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        config.page.theme = String::from("no-such-theme");
        assert!(matches!(build_site(&config), Err(Error::Highlight(_))));
    }

    #[test]
    fn test_build_feed_missing_output_directory() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("missing");
        match build_feed(&test_config(&output)) {
            Err(Error::Write { path, .. }) => assert_eq!(output.join("rss.xml"), path),
            other => panic!("wanted a write error, got {:?}", other),
        }
        assert!(!output.exists());
    }

    #[test]
    fn test_build_site_missing_output_directory() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("missing");
        match build_site(&test_config(&output)) {
            Err(Error::Write { path, .. }) => assert_eq!(output.join("index.html"), path),
            other => panic!("wanted a write error, got {:?}", other),
        }
    }

    #[test]
    fn test_write_failure_names_path() {
        let dir = tempfile::tempdir().unwrap();
        // a regular file where the output directory should be
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        match build_feed(&test_config(&blocker)) {
            Err(Error::Write { path, .. }) => assert_eq!(blocker.join("rss.xml"), path),
            other => panic!("wanted a write error, got {:?}", other),
        }
    }
}
