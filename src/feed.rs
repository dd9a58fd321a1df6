//! Support for creating an RSS 2.0 feed from the configured posts.
//!
//! Each post's markdown is read from disk and embedded verbatim in
//! `content:encoded`. A post whose file can't be read is still published, with
//! empty content; the failure is logged and returned in [`Feed::warnings`].
//! Apart from `lastBuildDate` the output depends only on the inputs, so two
//! runs over the same posts produce the same document.

use crate::config::{Post, Site};
use crate::util;
use crate::xml::{self, XmlWriter};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use url::Url;

const CONTENT_NAMESPACE: &str = "http://purl.org/rss/1.0/modules/content/";
const ATOM_NAMESPACE: &str = "http://www.w3.org/2005/Atom";
const DC_NAMESPACE: &str = "http://purl.org/dc/elements/1.1/";

/// How many characters of content a derived description is cut from.
const DESCRIPTION_LENGTH: usize = 300;

/// A generated feed document.
#[derive(Debug)]
pub struct Feed {
    pub xml: String,

    /// One entry per post whose content could not be read.
    pub warnings: Vec<ContentReadWarning>,
}

/// Records a post whose content file could not be read. The post was
/// published with empty content.
#[derive(Debug)]
pub struct ContentReadWarning {
    pub path: PathBuf,
    pub err: io::Error,
}

impl fmt::Display for ContentReadWarning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Could not read content from `{}`: {}", self.path.display(), self.err)
    }
}

/// Generates the feed for `posts`. Post paths resolve beneath
/// `content_root`; `now` is stamped into `lastBuildDate`.
pub fn generate(
    site: &Site,
    posts: &[Post],
    content_root: &Path,
    now: DateTime<Utc>,
) -> Result<Feed> {
    tracing::debug!(posts = posts.len(), "generating feed");
    let mut warnings = Vec::new();
    let items = feed_items(site, posts, content_root, &mut warnings)?;
    Ok(Feed {
        xml: to_xml(site, &items, now)?,
        warnings,
    })
}

/// Writes the feed document to `path`, replacing any existing file.
pub fn write_feed(feed: &Feed, path: &Path) -> io::Result<()> {
    std::fs::write(path, &feed.xml)
}

struct Item<'a> {
    title: &'a str,
    link: Url,
    pub_date: String,
    description: String,
    categories: &'a [String],
    content: String,
}

fn feed_items<'a>(
    site: &Site,
    posts: &'a [Post],
    content_root: &Path,
    warnings: &mut Vec<ContentReadWarning>,
) -> Result<Vec<Item<'a>>> {
    let mut items = Vec::with_capacity(posts.len());
    for post in posts {
        let path = util::resolve(content_root, &post.path);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %err,
                    "could not read post content; publishing it empty"
                );
                warnings.push(ContentReadWarning { path, err });
                String::new()
            }
        };

        let description = match post.description.as_deref() {
            Some(description) if !description.is_empty() => description.to_owned(),
            _ => derive_description(&content),
        };

        items.push(Item {
            title: &post.title,
            link: site.resolve(&post.url)?,
            pub_date: rfc822(&parse_date(&post.date)?),
            description,
            categories: &post.categories,
            content,
        });
    }
    Ok(items)
}

fn to_xml(site: &Site, items: &[Item], now: DateTime<Utc>) -> Result<String> {
    let feed_url = site.feed_url()?;
    let editor = format!("{} ({})", site.email, site.author);

    let mut w = XmlWriter::new(Vec::new());
    w.declaration()?;
    w.open(
        "rss",
        &[
            ("version", "2.0"),
            ("xmlns:content", CONTENT_NAMESPACE),
            ("xmlns:atom", ATOM_NAMESPACE),
            ("xmlns:dc", DC_NAMESPACE),
        ],
    )?;
    w.open("channel", &[])?;
    w.text_element("title", &site.title)?;
    w.text_element("link", site.url.as_str())?;
    w.empty(
        "atom:link",
        &[
            ("href", feed_url.as_str()),
            ("rel", "self"),
            ("type", "application/rss+xml"),
        ],
    )?;
    w.text_element("description", &site.description)?;
    w.text_element("language", &site.language)?;
    w.text_element("lastBuildDate", &rfc822(&now))?;
    w.text_element("generator", &site.generator)?;
    w.text_element("webMaster", &editor)?;
    w.text_element("managingEditor", &editor)?;
    w.open("image", &[])?;
    w.text_element("url", site.image.as_str())?;
    w.text_element("title", &site.title)?;
    w.text_element("link", site.url.as_str())?;
    w.close("image")?;

    for item in items {
        w.open("item", &[])?;
        w.text_element("title", item.title)?;
        w.text_element("link", item.link.as_str())?;
        w.text_element_with("guid", &[("isPermaLink", "true")], item.link.as_str())?;
        w.text_element("pubDate", &item.pub_date)?;
        w.text_element("author", &site.author)?;
        w.text_element("description", &item.description)?;
        for category in item.categories {
            w.text_element("category", category)?;
        }
        w.cdata_element("content:encoded", &item.content)?;
        w.close("item")?;
    }

    w.close("channel")?;
    w.close("rss")?;

    let mut xml = String::from_utf8(w.into_inner()).map_err(Error::Encoding)?;
    xml.push('\n');
    Ok(xml)
}

/// Builds a description from the start of the post body: the first
/// [`DESCRIPTION_LENGTH`] characters with markdown punctuation (`#`, `*`,
/// backticks and brackets) removed, trimmed, and followed by `...`.
pub fn derive_description(content: &str) -> String {
    let stripped: String = content
        .chars()
        .take(DESCRIPTION_LENGTH)
        .filter(|c| !matches!(c, '#' | '*' | '`' | '[' | ']'))
        .collect();
    format!("{}...", stripped.trim())
}

/// Parses an ISO 8601 date (`2026-02-25`), date-time with offset
/// (`2026-02-25T10:00:00+02:00`) or naive date-time
/// (`2026-02-25T10:00:00`). Bare dates are midnight UTC and naive date-times
/// are taken to be UTC.
pub fn parse_date(date: &str) -> Result<DateTime<Utc>> {
    if let Ok(date_time) = DateTime::parse_from_rfc3339(date) {
        return Ok(date_time.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%M:%S") {
        return Ok(Utc.from_utc_datetime(&naive));
    }
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|midnight| Utc.from_utc_datetime(&midnight))
        .ok_or_else(|| Error::InvalidDate(date.to_owned()))
}

/// Formats a timestamp the way RSS `pubDate` and `lastBuildDate` expect, e.g.
/// `Wed, 25 Feb 2026 00:00:00 GMT`.
pub fn rfc822(date_time: &DateTime<Utc>) -> String {
    date_time.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem creating a feed. A missing post content file is not
/// an error; see [`ContentReadWarning`].
#[derive(Debug)]
pub enum Error {
    /// Returned when a post's date isn't an ISO 8601 date or date-time.
    InvalidDate(String),

    /// Returned when a post URL can't be resolved against the site URL.
    Url(url::ParseError),

    /// Returned when the XML document can't be written.
    Xml(xml::Error),

    /// Returned when the written document isn't UTF-8.
    Encoding(std::string::FromUtf8Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidDate(date) => {
                write!(f, "Invalid post date `{}`: expected an ISO 8601 date", date)
            }
            Error::Url(err) => err.fmt(f),
            Error::Xml(err) => err.fmt(f),
            Error::Encoding(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidDate(_) => None,
            Error::Url(err) => Some(err),
            Error::Xml(err) => Some(err),
            Error::Encoding(err) => Some(err),
        }
    }
}

impl From<url::ParseError> for Error {
    /// Converts [`url::ParseError`]s into [`Error`]. This allows us to use the
    /// `?` operator when resolving URLs.
    fn from(err: url::ParseError) -> Error {
        Error::Url(err)
    }
}

impl From<xml::Error> for Error {
    /// Converts [`xml::Error`]s into [`Error`]. This allows us to use the `?`
    /// operator while writing the document.
    fn from(err: xml::Error) -> Error {
        Error::Xml(err)
    }
}
