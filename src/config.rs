//! Loads the `folio.yaml` project file into an immutable [`Config`]. Nothing
//! in the crate reads configuration from anywhere else; every component takes
//! the pieces of [`Config`] it needs as arguments.

use crate::highlight::DEFAULT_THEME;
use crate::util::{self, OpenError};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

pub const PROJECT_FILE: &str = "folio.yaml";

const DEFAULT_CONTENT_DIRECTORY: &str = "public";

/// Feed-level metadata.
#[derive(Clone, Debug, Deserialize)]
pub struct Site {
    pub title: String,
    pub description: String,

    /// The site's home page. Always ends in `/` once loaded so relative post
    /// URLs resolve beneath it.
    pub url: Url,

    pub author: String,

    /// Published as `webMaster` and `managingEditor` alongside `author`.
    pub email: String,

    pub language: String,

    /// The channel image, usually the author's avatar.
    pub image: Url,

    #[serde(default = "default_generator")]
    pub generator: String,

    /// Where the feed is published, relative to both `url` and the output
    /// directory.
    #[serde(default = "default_feed_path")]
    pub feed_path: String,
}

impl Site {
    /// Resolves a site-relative URL such as `/` or `/posts/hello` against
    /// [`Site::url`]. A leading `/` means "relative to the site", so a site
    /// under `/blog/` keeps its path prefix.
    pub fn resolve(&self, relative: &str) -> std::result::Result<Url, url::ParseError> {
        self.url.join(relative.trim_start_matches('/'))
    }

    pub fn feed_url(&self) -> std::result::Result<Url, url::ParseError> {
        self.resolve(&self.feed_path)
    }
}

fn default_generator() -> String {
    String::from("folio")
}

fn default_feed_path() -> String {
    String::from("rss.xml")
}

/// A feed entry.
#[derive(Clone, Debug, Deserialize)]
pub struct Post {
    pub title: String,

    /// Derived from the content when absent or empty.
    #[serde(default)]
    pub description: Option<String>,

    /// The markdown source, relative to the content root.
    pub path: String,

    /// The post's URL relative to [`Site::url`].
    pub url: String,

    /// An ISO 8601 date or date-time.
    pub date: String,

    #[serde(default)]
    pub categories: Vec<String>,
}

/// The article rendered to `index.html`.
#[derive(Clone, Debug, Deserialize)]
pub struct PageConfig {
    pub title: String,

    /// The markdown source, relative to the content root.
    pub content: String,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub series: Option<String>,

    /// Display date, shown as written.
    #[serde(default)]
    pub date: Option<String>,

    #[serde(default)]
    pub read_time: Option<String>,

    #[serde(default)]
    pub avatar: Option<String>,

    /// A gtmpl template replacing the built-in page template, relative to the
    /// project root.
    #[serde(default)]
    pub template: Option<PathBuf>,

    /// A syntect theme name.
    #[serde(default = "default_theme")]
    pub theme: String,
}

fn default_theme() -> String {
    String::from(DEFAULT_THEME)
}

#[derive(Deserialize)]
struct Project {
    site: Site,

    #[serde(default)]
    posts: Vec<Post>,

    page: PageConfig,

    #[serde(default)]
    content_directory: Option<PathBuf>,

    #[serde(default)]
    output_directory: Option<PathBuf>,
}

/// The resolved project configuration. All paths are joined onto the
/// directory containing the project file.
#[derive(Clone, Debug)]
pub struct Config {
    pub site: Site,
    pub posts: Vec<Post>,
    pub page: PageConfig,

    /// The directory containing `folio.yaml`.
    pub project_root: PathBuf,

    /// Post and page content paths resolve beneath this directory.
    pub content_root: PathBuf,

    /// Where `index.html` and the feed are written.
    pub output_directory: PathBuf,
}

impl Config {
    /// Searches `dir` and then each of its ancestors for `folio.yaml` and
    /// loads the first one found. `output_directory` overrides the project
    /// file's output directory.
    pub fn from_directory(dir: &Path, output_directory: Option<&Path>) -> Result<Config> {
        let mut current = Some(dir);
        while let Some(candidate) = current {
            let path = candidate.join(PROJECT_FILE);
            if path.is_file() {
                return Config::from_project_file(&path, output_directory);
            }
            current = candidate.parent();
        }
        Err(Error::NotFound(dir.to_owned()))
    }

    pub fn from_project_file(path: &Path, output_directory: Option<&Path>) -> Result<Config> {
        let project: Project = serde_yaml::from_reader(util::open(path, "project")?)
            .map_err(|err| Error::DeserializeYaml {
                path: path.to_owned(),
                err,
            })?;
        let project_root = path
            .parent()
            .ok_or_else(|| Error::NoParent(path.to_owned()))?
            .to_owned();

        let content_root = project_root.join(
            project
                .content_directory
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONTENT_DIRECTORY)),
        );
        let output_directory = match (output_directory, project.output_directory) {
            (Some(dir), _) => dir.to_owned(),
            (None, Some(dir)) => project_root.join(dir),
            (None, None) => content_root.clone(),
        };

        let mut site = project.site;
        site.url = with_trailing_slash(site.url);

        Ok(Config {
            site,
            posts: project.posts,
            page: project.page,
            project_root,
            content_root,
            output_directory,
        })
    }

    /// The on-disk location of a post or page content path.
    pub fn content_path(&self, relative: &str) -> PathBuf {
        util::resolve(&self.content_root, relative)
    }
}

// `Url::join` treats the last path segment as a file unless it ends in `/`.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading the project file.
#[derive(Debug)]
pub enum Error {
    /// Returned when no `folio.yaml` exists in the directory or any ancestor.
    NotFound(PathBuf),

    /// Returned when the project file can't be opened.
    Open(OpenError),

    /// Returned when the project file isn't valid YAML or doesn't match the
    /// expected schema.
    DeserializeYaml { path: PathBuf, err: serde_yaml::Error },

    /// Returned when the project file path has no parent directory.
    NoParent(PathBuf),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::NotFound(dir) => write!(
                f,
                "Could not find `{}` in `{}` or any parent directory",
                PROJECT_FILE,
                dir.display()
            ),
            Error::Open(err) => err.fmt(f),
            Error::DeserializeYaml { path, err } => {
                write!(f, "Loading configuration `{}`: {}", path.display(), err)
            }
            Error::NoParent(path) => write!(
                f,
                "Can't get parent directory for provided project file path `{}`",
                path.display()
            ),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::NotFound(_) => None,
            Error::Open(err) => Some(err),
            Error::DeserializeYaml { path: _, err } => Some(err),
            Error::NoParent(_) => None,
        }
    }
}

impl From<OpenError> for Error {
    fn from(err: OpenError) -> Error {
        Error::Open(err)
    }
}
