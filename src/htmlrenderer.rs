//! Implements a custom [`push_html`] for article bodies. It differs from
//! [`pulldown_cmark::html::push_html`] in three ways: headings get an `id`
//! attribute derived with [`crate::toc::slugify`], fenced code blocks in a
//! known language are syntax highlighted, and images keep their alt text and
//! don't send a referrer.

use crate::highlight::Highlighter;
use crate::toc::slugify;
use pulldown_cmark::escape::{escape_href, escape_html, StrWrite};
use pulldown_cmark::{Alignment, CodeBlockKind, CowStr, Event, LinkType, Tag};
use std::fmt::{self, Display};
use std::io;

struct Adaptor<'a, T> {
    formatter: &'a mut T,
    result: fmt::Result,
}

impl<T> Adaptor<'_, T> {
    fn handle_result(&mut self, result: fmt::Result) -> io::Result<()> {
        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                self.result = result;
                Err(io::Error::new(io::ErrorKind::Other, e))
            }
        }
    }
}

impl<T: fmt::Write> StrWrite for Adaptor<'_, T> {
    fn write_str(&mut self, s: &str) -> io::Result<()> {
        let result = self.formatter.write_str(s);
        self.handle_result(result)
    }

    fn write_fmt(&mut self, args: fmt::Arguments) -> io::Result<()> {
        let result = self.formatter.write_fmt(args);
        self.handle_result(result)
    }
}

struct EscapeHref<'a>(&'a str);

impl Display for EscapeHref<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut adaptor = Adaptor {
            formatter: f,
            result: Ok(()),
        };
        let _ = escape_href(&mut adaptor, self.0);
        adaptor.result
    }
}

struct EscapeHtml<'a>(&'a str);

impl Display for EscapeHtml<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut adaptor = Adaptor {
            formatter: f,
            result: Ok(()),
        };
        let _ = escape_html(&mut adaptor, self.0);
        adaptor.result
    }
}

/// Copies the block's code to the clipboard; wired up by the page script.
const COPY_BUTTON: &str =
    r#"<button type="button" class="code-block-copy" aria-label="Copy code">Copy</button>"#;

enum TableState {
    Head,
    Body,
}

/// A fenced or indented code block whose text is still being collected.
struct CodeBlock {
    language: Option<String>,
    text: String,
}

/// Renders markdown [`Event`]s into HTML. This is largely modeled after
/// [`pulldown_cmark`]'s private `HtmlWriter` struct.
struct HtmlRenderer<'a, 'h> {
    table_alignments: Vec<Alignment>,
    table_state: TableState,
    table_cell_index: usize,

    /// Used for fenced code blocks. Without a highlighter every code block is
    /// rendered plain.
    highlighter: Option<&'h Highlighter>,

    /// The level and buffered inner events of the heading being rendered. The
    /// opening tag can't be written until the heading text, and thus its ID,
    /// is known.
    heading: Option<(u32, Vec<Event<'a>>)>,

    code_block: Option<CodeBlock>,

    /// Greater than zero while rendering an image's alt text.
    image_depth: usize,
}

impl<'a, 'h> HtmlRenderer<'a, 'h> {
    fn new(highlighter: Option<&'h Highlighter>) -> Self {
        HtmlRenderer {
            table_alignments: Vec::default(),
            table_state: TableState::Head,
            table_cell_index: usize::default(),
            highlighter,
            heading: None,
            code_block: None,
            image_depth: 0,
        }
    }

    fn on_event<W: StrWrite>(&mut self, w: &mut W, event: Event<'a>) -> io::Result<()> {
        if self.heading.is_some() {
            return match event {
                Event::End(Tag::Heading(level)) => self.end_heading(w, level),
                event => {
                    if let Some((_, buffered)) = self.heading.as_mut() {
                        buffered.push(event);
                    }
                    Ok(())
                }
            };
        }

        if self.code_block.is_some() {
            return self.on_code_block_event(w, event);
        }

        if self.image_depth > 0 {
            return self.on_alt_text_event(w, event);
        }

        match event {
            Event::Start(tag) => self.on_start(w, tag),
            Event::End(tag) => self.on_end(w, tag),
            Event::Code(code) => self.on_code(w, code),
            Event::FootnoteReference(name) => write!(
                w,
                r##"<sup class="footnote-reference"><a href="#{}">{}</a></sup>"##,
                EscapeHtml(&name),
                EscapeHtml(&name),
            ),
            Event::HardBreak => w.write_str("<br />"),
            Event::Html(html) => w.write_str(&html),
            Event::Rule => w.write_str("<hr />"),
            Event::SoftBreak => w.write_str("\n"),
            Event::TaskListMarker(checked) => write!(
                w,
                r#"<input disabled="" type="checkbox" {}/>"#,
                match checked {
                    true => r#"checked="" "#,
                    false => "",
                }
            ),
            Event::Text(text) => escape_html(w, &text),
        }
    }

    fn on_start<W: StrWrite>(&mut self, w: &mut W, tag: Tag<'a>) -> io::Result<()> {
        match tag {
            Tag::BlockQuote => w.write_str("<blockquote>"),
            Tag::CodeBlock(kind) => {
                self.code_block = Some(CodeBlock {
                    language: match kind {
                        CodeBlockKind::Fenced(info) => {
                            info.split_whitespace().next().map(str::to_owned)
                        }
                        CodeBlockKind::Indented => None,
                    },
                    text: String::new(),
                });
                Ok(())
            }
            Tag::Emphasis => w.write_str("<em>"),
            Tag::FootnoteDefinition(name) => {
                let name = EscapeHtml(&name);
                write!(
                    w,
                    r#"<div class="footnote-definition" id="{}">{}. &nbsp;"#,
                    &name, &name,
                )
            }
            Tag::Heading(level) => {
                self.heading = Some((level, Vec::new()));
                Ok(())
            }
            Tag::Image(_link_type, dest, title) => {
                self.image_depth = 1;
                write!(
                    w,
                    r#"<img src="{}" title="{}" referrerpolicy="no-referrer" alt=""#,
                    EscapeHref(&dest),
                    EscapeHtml(&title),
                )
            }
            Tag::Item => w.write_str("<li>"),
            Tag::Link(LinkType::Email, dest, title) => write!(
                w,
                r#"<a href="mailto:{}" title="{}">"#,
                EscapeHref(&dest),
                EscapeHtml(&title),
            ),
            Tag::Link(_link_type, dest, title) => write!(
                w,
                r#"<a href="{}" title="{}">"#,
                EscapeHref(&dest),
                EscapeHtml(&title),
            ),
            Tag::List(None) => w.write_str("<ul>"),
            Tag::List(Some(1)) => w.write_str("<ol>"),
            Tag::List(Some(start)) => write!(w, r#"<ol start="{}">"#, start),
            Tag::Paragraph => w.write_str("<p>"),
            Tag::Strikethrough => w.write_str("<del>"),
            Tag::Strong => w.write_str("<strong>"),
            Tag::Table(alignments) => {
                self.table_alignments = alignments;
                w.write_str("<table>")
            }
            Tag::TableHead => {
                self.table_state = TableState::Head;
                self.table_cell_index = 0;
                w.write_str("<thead><tr>")
            }
            Tag::TableRow => {
                self.table_cell_index = 0;
                w.write_str("<tr>")
            }
            Tag::TableCell => write!(
                w,
                "<{}{}>",
                match self.table_state {
                    TableState::Head => "th",
                    TableState::Body => "td",
                },
                match self.table_alignments.get(self.table_cell_index) {
                    Some(Alignment::Left) => r#" align="left""#,
                    Some(Alignment::Right) => r#" align="right""#,
                    Some(Alignment::Center) => r#" align="center""#,
                    _ => "",
                }
            ),
        }
    }

    fn on_end<W: StrWrite>(&mut self, w: &mut W, tag: Tag) -> io::Result<()> {
        match tag {
            Tag::BlockQuote => w.write_str("</blockquote>"),
            // code blocks and headings are closed by their own handlers
            Tag::CodeBlock(_) | Tag::Heading(_) => Ok(()),
            Tag::Emphasis => w.write_str("</em>"),
            Tag::FootnoteDefinition(_) => w.write_str("</div>"),
            Tag::Image(_, _, _) => Ok(()),
            Tag::Item => w.write_str("</li>"),
            Tag::Link(_, _, _) => w.write_str("</a>"),
            Tag::List(Some(_)) => w.write_str("</ol>"),
            Tag::List(None) => w.write_str("</ul>"),
            Tag::Paragraph => w.write_str("</p>"),
            Tag::Strikethrough => w.write_str("</del>"),
            Tag::Strong => w.write_str("</strong>"),
            Tag::Table(_) => w.write_str("</tbody></table>"),
            Tag::TableHead => {
                self.table_state = TableState::Body;
                w.write_str("</tr></thead><tbody>")
            }
            Tag::TableRow => w.write_str("</tr>"),
            Tag::TableCell => {
                self.table_cell_index += 1;
                w.write_str(match self.table_state {
                    TableState::Head => "</th>",
                    TableState::Body => "</td>",
                })
            }
        }
    }

    fn on_code<W: StrWrite>(&mut self, w: &mut W, s: CowStr) -> io::Result<()> {
        write!(w, "<code>{}</code>", EscapeHtml(&s))
    }

    fn end_heading<W: StrWrite>(&mut self, w: &mut W, level: u32) -> io::Result<()> {
        let buffered = match self.heading.take() {
            Some((_, buffered)) => buffered,
            None => Vec::new(),
        };
        write!(w, r#"<h{} id="{}">"#, level, EscapeHtml(&slugify(&plain_text(&buffered))))?;
        for event in buffered {
            self.on_event(w, event)?;
        }
        write!(w, "</h{}>", level)
    }

    fn on_code_block_event<W: StrWrite>(&mut self, w: &mut W, event: Event<'a>) -> io::Result<()> {
        match event {
            Event::Text(text) => {
                if let Some(block) = self.code_block.as_mut() {
                    block.text.push_str(&text);
                }
                Ok(())
            }
            Event::End(Tag::CodeBlock(_)) => match self.code_block.take() {
                Some(block) => self.write_code_block(w, block),
                None => Ok(()),
            },
            _ => Ok(()),
        }
    }

    fn write_code_block<W: StrWrite>(&mut self, w: &mut W, block: CodeBlock) -> io::Result<()> {
        if let (Some(language), Some(highlighter)) = (&block.language, self.highlighter) {
            match highlighter.highlight(&block.text, language) {
                Ok(Some(highlighted)) => {
                    write!(
                        w,
                        r#"<div class="code-block"><div class="code-block-header"><span class="code-block-language">{}</span>"#,
                        EscapeHtml(language),
                    )?;
                    w.write_str(COPY_BUTTON)?;
                    write!(w, "</div>{}</div>", highlighted)?;
                    return Ok(());
                }
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(language = %language, "highlighting code block: {}", err)
                }
            }
        }

        match &block.language {
            Some(language) => {
                write!(w, r#"<pre><code class="language-{}">"#, EscapeHtml(language))?
            }
            None => w.write_str("<pre><code>")?,
        }
        escape_html(&mut *w, &block.text)?;
        w.write_str("</code></pre>")
    }

    fn on_alt_text_event<W: StrWrite>(&mut self, w: &mut W, event: Event<'a>) -> io::Result<()> {
        match event {
            Event::Start(Tag::Image(..)) => {
                self.image_depth += 1;
                Ok(())
            }
            Event::End(Tag::Image(..)) => {
                self.image_depth -= 1;
                match self.image_depth {
                    0 => w.write_str(r#"" />"#),
                    _ => Ok(()),
                }
            }
            Event::Text(text) | Event::Code(text) => escape_html(w, &text),
            Event::SoftBreak | Event::HardBreak => w.write_str(" "),
            _ => Ok(()),
        }
    }
}

/// The text content of a run of inline events, without markup.
fn plain_text(events: &[Event]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::Text(s) | Event::Code(s) => text.push_str(s),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            _ => {}
        }
    }
    text
}

/// Converts [`Event`]s into an HTML string much like
/// `pulldown_cmark::html::push_html`. See the module description for how the
/// output differs.
pub fn push_html<'a, I>(
    out: &mut String,
    events: I,
    highlighter: Option<&Highlighter>,
) -> io::Result<()>
where
    I: Iterator<Item = Event<'a>>,
{
    let mut renderer = HtmlRenderer::new(highlighter);
    for event in events {
        renderer.on_event(out, event)?;
    }
    Ok(())
}
