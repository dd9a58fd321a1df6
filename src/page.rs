//! Renders the configured article into a single HTML page: the markdown body,
//! its table of contents, the article header and the scroll-spy hookup.

use crate::config::Config;
use crate::highlight::Highlighter;
use crate::markdown;
use crate::scrollspy::ROOT_MARGIN;
use crate::toc::{self, Heading};
use crate::util::{self, OpenError};
use crate::value::{html_text, optional_html_text};
use gtmpl::{Context, Template, Value};
use std::collections::HashMap;
use std::fmt;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::warn;

/// The page template used when the project doesn't name one.
pub const DEFAULT_TEMPLATE: &str = include_str!("../theme/article.html");

/// The output file name, relative to the output directory.
pub const PAGE_FILE: &str = "index.html";

/// The rendered article body and the headings its table of contents links to.
pub struct Article {
    pub content: String,
    pub toc: Vec<Heading>,
}

impl Article {
    /// Renders `markdown`. The TOC is extracted from the same source, so each
    /// entry's `id` matches an `id` attribute in `content`.
    pub fn from_markdown(markdown: &str, highlighter: Option<&Highlighter>) -> Result<Article> {
        let mut content = String::new();
        markdown::to_html(&mut content, markdown, highlighter)?;
        Ok(Article {
            content,
            toc: toc::extract_headings(markdown),
        })
    }
}

/// Loads the template named by the project's `page.template`, or the built-in
/// template when there isn't one.
pub fn load_template(config: &Config) -> Result<Template> {
    let contents = match &config.page.template {
        Some(relative) => {
            let path = config.project_root.join(relative);
            let mut contents = String::new();
            util::open(&path, "template")?
                .read_to_string(&mut contents)
                .map_err(|err| Error::Read { path, err })?;
            contents
        }
        None => String::from(DEFAULT_TEMPLATE),
    };
    let mut template = Template::default();
    template.parse(&contents).map_err(Error::ParseTemplate)?;
    Ok(template)
}

/// Reads, renders and templates the configured article. Content that can't be
/// read is logged and rendered as an empty article with an empty TOC.
pub fn render(
    config: &Config,
    highlighter: Option<&Highlighter>,
    template: &Template,
) -> Result<String> {
    let path = config.content_path(&config.page.content);
    let markdown = match std::fs::read_to_string(&path) {
        Ok(markdown) => markdown,
        Err(err) => {
            warn!(path = %path.display(), %err, "failed to read page content");
            String::new()
        }
    };
    let article = Article::from_markdown(&markdown, highlighter)?;
    execute(template, page_value(config, &article))
}

/// Writes `html` to `index.html` in `output_directory`, which must already
/// exist, and returns the file's path.
pub fn write_page(html: &str, output_directory: &Path) -> io::Result<PathBuf> {
    let path = output_directory.join(PAGE_FILE);
    std::fs::write(&path, html)?;
    Ok(path)
}

fn execute(template: &Template, value: Value) -> Result<String> {
    let mut out: Vec<u8> = Vec::new();
    template.execute(&mut out, &Context::from(value)?)?;
    Ok(String::from_utf8(out)?)
}

fn page_value(config: &Config, article: &Article) -> Value {
    let page = &config.page;
    let site = &config.site;
    let feed_url = site
        .feed_url()
        .map(|url| url.to_string())
        .unwrap_or_else(|_| site.feed_path.clone());

    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert("title".to_owned(), html_text(&page.title));
    m.insert("category".to_owned(), optional_html_text(page.category.as_deref()));
    m.insert("series".to_owned(), optional_html_text(page.series.as_deref()));
    m.insert("author".to_owned(), html_text(&site.author));
    m.insert("avatar".to_owned(), optional_html_text(page.avatar.as_deref()));
    m.insert("date".to_owned(), optional_html_text(page.date.as_deref()));
    m.insert("read_time".to_owned(), optional_html_text(page.read_time.as_deref()));
    m.insert("language".to_owned(), html_text(&site.language));
    m.insert("site_title".to_owned(), html_text(&site.title));
    m.insert("feed_url".to_owned(), html_text(&feed_url));
    m.insert("root_margin".to_owned(), Value::String(ROOT_MARGIN.to_owned()));
    m.insert("content".to_owned(), Value::String(article.content.clone()));
    m.insert(
        "toc".to_owned(),
        Value::Array(article.toc.iter().map(Value::from).collect()),
    );
    Value::Object(m)
}

pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error rendering the article page.
#[derive(Debug)]
pub enum Error {
    /// Returned when the template file can't be opened.
    Open(OpenError),

    /// Returned when the template file can't be read.
    Read { path: PathBuf, err: io::Error },

    /// Returned when the template doesn't parse.
    ParseTemplate(String),

    /// Returned when executing the template fails.
    Template(String),

    /// Returned for I/O errors while rendering markdown.
    Io(io::Error),

    /// Returned when the template produces invalid UTF-8.
    Encoding(std::string::FromUtf8Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Open(err) => err.fmt(f),
            Error::Read { path, err } => {
                write!(f, "Reading template file `{}`: {}", path.display(), err)
            }
            Error::ParseTemplate(err) => write!(f, "Parsing template: {}", err),
            Error::Template(err) => write!(f, "Executing template: {}", err),
            Error::Io(err) => err.fmt(f),
            Error::Encoding(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Open(err) => Some(err),
            Error::Read { path: _, err } => Some(err),
            Error::ParseTemplate(_) => None,
            Error::Template(_) => None,
            Error::Io(err) => Some(err),
            Error::Encoding(err) => Some(err),
        }
    }
}

impl From<OpenError> for Error {
    fn from(err: OpenError) -> Error {
        Error::Open(err)
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<String> for Error {
    /// Converts a template error message ([`String`]) into an [`Error`]. This
    /// allows us to use the `?` operator for template execution.
    fn from(err: String) -> Error {
        Error::Template(err)
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(err: std::string::FromUtf8Error) -> Error {
        Error::Encoding(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    fn test_config() -> Config {
        Config::from_directory(Path::new("./testdata/project"), None).unwrap()
    }

    #[test]
    fn test_article_toc_matches_content() -> Result<()> {
        let article = Article::from_markdown("## One\n\n### Two & Three\n\ntext\n", None)?;
        assert_eq!(2, article.toc.len());
        for heading in &article.toc {
            assert!(article.content.contains(&format!("id=\"{}\"", heading.id)));
        }
        Ok(())
    }

    #[test]
    fn test_render_default_template() -> Result<()> {
        let config = test_config();
        let template = load_template(&config)?;
        let html = render(&config, None, &template)?;

        assert!(html.contains("<title>Test Post</title>"));
        assert!(html.contains("Case Studies"));
        assert!(html.contains("Test Series"));
        assert!(html.contains("Feb 25, 2026"));
        assert!(html.contains("1 min read"));
        assert!(html.contains("<h2 id=\"getting-started\">"));
        assert!(html.contains("href=\"#getting-started\""));
        assert!(html.contains("href=\"#cjk-you\" data-level=\"h3\" class=\"nested\""));
        assert!(html.contains("href=\"#wrap-up\" data-level=\"h2\">"));
        assert!(html.contains(&format!("rootMargin: '{}'", ROOT_MARGIN)));
        assert!(html.contains("href=\"https://example.com/blog/rss.xml\""));
        Ok(())
    }

    #[test]
    fn test_render_missing_content_is_empty() -> Result<()> {
        let mut config = test_config();
        config.page.content = String::from("/content/missing.md");
        let template = load_template(&config)?;
        let html = render(&config, None, &template)?;
        assert!(html.contains("<title>Test Post</title>"));
        assert!(!html.contains("href=\"#"));
        Ok(())
    }

    #[test]
    fn test_render_escapes_header_fields() -> Result<()> {
        let mut config = test_config();
        config.page.title = String::from("<script>&\"'");
        let mut template = Template::default();
        template.parse("{{.title}}").map_err(Error::ParseTemplate)?;
        let html = render(&config, None, &template)?;
        assert!(!html.contains('<'));
        assert!(html.starts_with("&lt;script&gt;&amp;"));
        Ok(())
    }

    #[test]
    fn test_custom_template() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("page.html"), "{{range .toc}}{{.id}};{{end}}").unwrap();
        let mut config = test_config();
        config.project_root = dir.path().to_owned();
        config.page.template = Some(PathBuf::from("page.html"));
        let template = load_template(&config)?;
        assert_eq!(
            "getting-started;cjk-you;wrap-up;",
            render(&config, None, &template)?
        );
        Ok(())
    }

    #[test]
    fn test_missing_template() {
        let mut config = test_config();
        config.page.template = Some(PathBuf::from("no-such-template.html"));
        assert!(matches!(load_template(&config), Err(Error::Open(_))));
    }

    #[test]
    fn test_write_page() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let path = write_page("<p>hi</p>", dir.path())?;
        assert_eq!(dir.path().join(PAGE_FILE), path);
        assert_eq!("<p>hi</p>", fs::read_to_string(path)?);
        Ok(())
    }

    #[test]
    fn test_write_page_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(write_page("<p>hi</p>", &dir.path().join("missing")).is_err());
    }
}
