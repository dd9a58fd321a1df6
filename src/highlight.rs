//! Syntax highlighting for fenced code blocks.

use std::fmt;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

pub const DEFAULT_THEME: &str = "InspiredGitHub";

/// Highlights code into inline-styled HTML using syntect's bundled syntaxes
/// and one of its bundled themes.
pub struct Highlighter {
    syntaxes: SyntaxSet,
    theme: Theme,
}

impl Highlighter {
    /// Loads the bundled syntaxes and the theme named `theme`.
    pub fn new(theme: &str) -> Result<Self> {
        let theme = ThemeSet::load_defaults()
            .themes
            // `remove` rather than `get` so we own the theme
            .remove(theme)
            .ok_or_else(|| Error::UnknownTheme(theme.to_owned()))?;
        Ok(Highlighter {
            syntaxes: SyntaxSet::load_defaults_newlines(),
            theme,
        })
    }

    /// Returns whether `language` (a name or file extension such as `rust` or
    /// `rs`) has a bundled syntax.
    pub fn supports(&self, language: &str) -> bool {
        self.syntaxes.find_syntax_by_token(language).is_some()
    }

    /// Highlights `code` as `language`. Returns `Ok(None)` when the language
    /// is unknown so the caller can fall back to a plain code block.
    pub fn highlight(&self, code: &str, language: &str) -> Result<Option<String>> {
        match self.syntaxes.find_syntax_by_token(language) {
            None => Ok(None),
            Some(syntax) => {
                highlighted_html_for_string(code, &self.syntaxes, syntax, &self.theme)
                    .map(Some)
                    .map_err(Error::Highlight)
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// Returned when the configured theme isn't one of syntect's bundled
    /// themes.
    UnknownTheme(String),

    /// Returned when syntect fails while highlighting.
    Highlight(syntect::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::UnknownTheme(theme) => {
                write!(f, "unknown highlighting theme `{}`", theme)
            }
            Error::Highlight(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::UnknownTheme(_) => None,
            Error::Highlight(err) => Some(err),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_known_language_is_highlighted() -> Result<()> {
        let highlighter = Highlighter::new(DEFAULT_THEME)?;
        let html = highlighter.highlight("const FOO: usize = 42;\n", "rust")?;
        let html = html.expect("rust should be a bundled syntax");
        assert!(html.starts_with("<pre"));
        assert!(html.contains("FOO"));
        Ok(())
    }

    #[test]
    fn test_extension_token_is_supported() -> Result<()> {
        let highlighter = Highlighter::new(DEFAULT_THEME)?;
        assert!(highlighter.supports("rs"));
        assert!(highlighter.supports("python"));
        Ok(())
    }

    #[test]
    fn test_unknown_language() -> Result<()> {
        let highlighter = Highlighter::new(DEFAULT_THEME)?;
        assert!(!highlighter.supports("klingon"));
        assert!(highlighter.highlight("qapla'", "klingon")?.is_none());
        Ok(())
    }

    #[test]
    fn test_unknown_theme() {
        match Highlighter::new("no-such-theme") {
            Err(Error::UnknownTheme(name)) => assert_eq!("no-such-theme", name),
            _ => panic!("wanted UnknownTheme"),
        }
    }
}
