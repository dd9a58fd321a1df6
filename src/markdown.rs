use crate::highlight::Highlighter;
use crate::htmlrenderer;
use pulldown_cmark::{Options, Parser};
use std::io;

/// Converts markdown to HTML, appending the result to `out`.
///
/// * `markdown` is the article source.
/// * `highlighter` highlights fenced code blocks; pass `None` to render every
///   code block plain.
pub fn to_html(
    out: &mut String,
    markdown: &str,
    highlighter: Option<&Highlighter>,
) -> io::Result<()> {
    htmlrenderer::push_html(out, Parser::new_ext(markdown, options()), highlighter)
}

// No smart punctuation: heading IDs are slugs of the rendered text and must
// match the TOC, which is slugged from the raw source.
fn options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

#[cfg(test)]
mod test {
    use super::*;

    fn render(markdown: &str) -> String {
        let mut out = String::new();
        to_html(&mut out, markdown, None).unwrap();
        out
    }

    #[test]
    fn test_tables() {
        assert_eq!(
            "<table><thead><tr><th>a</th><th align=\"right\">b</th></tr></thead>\
             <tbody><tr><td>1</td><td align=\"right\">2</td></tr></tbody></table>",
            render("| a | b |\n|---|--:|\n| 1 | 2 |\n")
        );
    }

    #[test]
    fn test_strikethrough_and_tasklist() {
        let html = render("- [x] ~~done~~\n");
        assert!(html.starts_with("<ul><li><input disabled=\"\" type=\"checkbox\" checked=\"\" />"));
        assert!(html.contains("<del>done</del>"));
    }

    #[test]
    fn test_raw_html_passes_through() {
        assert_eq!(
            "<div class=\"note\">hi</div>\n",
            render("<div class=\"note\">hi</div>\n")
        );
    }

    #[test]
    fn test_heading_ids_match_toc() {
        let markdown = "## Bridging the Gap\n\n### 4-Stage Pipeline\n\n\
                        ## Part 1 -- Setup\n\n### Don't \"Panic\"...\n";
        let html = render(markdown);
        for heading in crate::toc::extract_headings(markdown) {
            assert!(
                html.contains(&format!("id=\"{}\"", heading.id)),
                "missing id {} in {}",
                heading.id,
                html
            );
        }
        assert!(html.contains("<h2 id=\"part-1----setup\">Part 1 -- Setup</h2>"));
        assert!(html.contains("id=\"dont-panic\""));
    }
}
