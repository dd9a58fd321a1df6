//! Extracts the table of contents from markdown source. The extractor is
//! line-based: it does not track fenced code blocks, so a `## line` inside a
//! code fence is reported as a heading.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

// The gap after the hashes must stay on the heading's own line.
static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(#{2,3})[^\S\n]+(.+)$").unwrap());

// Word characters are ASCII-only here.
static NOT_SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_\s-]").unwrap());

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// The heading levels that make it into the table of contents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Level {
    H2,
    H3,
}

impl Level {
    fn from_hashes(hashes: &str) -> Option<Level> {
        match hashes.len() {
            2 => Some(Level::H2),
            3 => Some(Level::H3),
            _ => None,
        }
    }

    pub fn depth(self) -> u8 {
        match self {
            Level::H2 => 2,
            Level::H3 => 3,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "h{}", self.depth())
    }
}

/// A single table-of-contents entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Heading {
    /// The anchor ID, see [`slugify`]. Not unique: two headings with the same
    /// text get the same ID.
    pub id: String,

    /// The heading title with surrounding whitespace trimmed.
    pub text: String,

    pub level: Level,
}

/// Returns the level-2 and level-3 headings of `markdown` in document order.
pub fn extract_headings(markdown: &str) -> Vec<Heading> {
    HEADING
        .captures_iter(markdown)
        .filter_map(|caps| {
            let level = Level::from_hashes(&caps[1])?;
            let text = caps[2].trim();
            Some(Heading {
                id: slugify(text),
                text: text.to_owned(),
                level,
            })
        })
        .collect()
}

/// Derives an anchor ID from heading text: lower-case it, drop everything that
/// isn't a word character, whitespace or `-`, then turn each whitespace run
/// into a single `-`.
///
/// ```
/// assert_eq!("getting-started", folio::toc::slugify("Getting Started!"));
/// ```
pub fn slugify(text: &str) -> String {
    let lower = text.to_lowercase();
    let stripped = NOT_SLUG.replace_all(&lower, "");
    WHITESPACE.replace_all(&stripped, "-").into_owned()
}

#[cfg(test)]
mod test {
    use super::*;

    fn heading(id: &str, text: &str, level: Level) -> Heading {
        Heading {
            id: id.to_owned(),
            text: text.to_owned(),
            level,
        }
    }

    #[test]
    fn test_slugify() {
        assert_eq!("getting-started", slugify("Getting Started!"));
        assert_eq!("cjk-you", slugify("CJK & You"));
        assert_eq!("already-hyphenated--twice", slugify("already-hyphenated--twice"));
        assert_eq!("snake_case-stays", slugify("snake_case stays"));
        assert_eq!("4-stage-pipeline", slugify("4-Stage   Pipeline"));
        assert_eq!("", slugify("!!!"));
    }

    #[test]
    fn test_slugify_strips_non_ascii() {
        assert_eq!("1688-", slugify("1688 采购"));
    }

    #[test]
    fn test_extract_empty() {
        assert!(extract_headings("").is_empty());
    }

    #[test]
    fn test_extract_levels() {
        let markdown = "# Title\n\
                        ## Getting Started!\n\
                        text\n\
                        ### Details\n\
                        #### Too deep\n\
                        ##NoSpace\n\
                        ##  Padded Title  \n";
        assert_eq!(
            vec![
                heading("getting-started", "Getting Started!", Level::H2),
                heading("details", "Details", Level::H3),
                heading("padded-title", "Padded Title", Level::H2),
            ],
            extract_headings(markdown)
        );
    }

    #[test]
    fn test_extract_count_matches_line_pattern() {
        let markdown = "## a\n### b\n# c\n#### d\n## e\nplain\n## \nJust a paragraph\n";
        let line_pattern = Regex::new(r"^#{2,3}\s+.+$").unwrap();
        let wanted = markdown.lines().filter(|l| line_pattern.is_match(l)).count();
        assert_eq!(wanted, extract_headings(markdown).len());
        assert_eq!(3, wanted);
    }

    #[test]
    fn test_bare_hashes_do_not_capture_next_line() {
        assert!(extract_headings("## \nJust a paragraph\n").is_empty());
        assert!(extract_headings("###\n\nText\n").is_empty());
    }

    #[test]
    fn test_duplicate_headings_collide() {
        let headings = extract_headings("## Notes\n## Notes\n");
        assert_eq!(2, headings.len());
        assert_eq!(headings[0].id, headings[1].id);
    }

    #[test]
    fn test_headings_inside_code_fences_are_extracted() {
        let markdown = "## Real\n```sh\n## not a heading\n```\n";
        let ids: Vec<_> = extract_headings(markdown).into_iter().map(|h| h.id).collect();
        assert_eq!(vec!["real", "not-a-heading"], ids);
    }

    #[test]
    fn test_crlf_titles_are_trimmed() {
        let headings = extract_headings("## Windows\r\nbody\r\n");
        assert_eq!(vec![heading("windows", "Windows", Level::H2)], headings);
    }
}
