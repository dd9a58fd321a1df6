//! Conversions from domain types into template [`Value`]s. Strings bound for
//! HTML are escaped here, since gtmpl doesn't escape on output.

use crate::toc::{Heading, Level};
use gtmpl::Value;
use pulldown_cmark::escape::escape_html;
use std::collections::HashMap;

/// HTML-escapes `s` into a [`Value::String`].
pub fn html_text(s: &str) -> Value {
    let mut escaped = String::with_capacity(s.len());
    // writing to a `String` can't fail
    let _ = escape_html(&mut escaped, s);
    Value::String(escaped)
}

/// Like [`html_text`], but `None` becomes [`Value::Nil`] so templates can
/// test for it with `{{if}}`.
pub fn optional_html_text(s: Option<&str>) -> Value {
    match s {
        Some(s) => html_text(s),
        None => Value::Nil,
    }
}

impl From<&Heading> for Value {
    /// Converts a [`Heading`] into an object with `id`, `text`, `level` (`h2`
    /// or `h3`) and `nested` (true for `h3`).
    fn from(heading: &Heading) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("id".to_owned(), html_text(&heading.id));
        m.insert("text".to_owned(), html_text(&heading.text));
        m.insert("level".to_owned(), Value::String(heading.level.to_string()));
        m.insert("nested".to_owned(), Value::Bool(heading.level == Level::H3));
        Value::Object(m)
    }
}
