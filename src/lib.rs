//! The library code for `folio`, which publishes a single markdown article as
//! an HTML page and the blog's posts as an RSS 2.0 feed. The work breaks down
//! into two independent halves:
//!
//! 1. Rendering the article page ([`crate::page`]): the markdown is rendered to
//!    HTML ([`crate::markdown`]), its `h2`/`h3` headings are extracted into a
//!    table of contents ([`crate::toc`]), and both are fed through a template
//!    along with the settings the in-page scroll-spy uses
//!    ([`crate::scrollspy`]).
//! 2. Generating the feed ([`crate::feed`]): each configured post's markdown
//!    is read and embedded in an RSS item, written with [`crate::xml`].
//!
//! [`crate::build`] runs both against a [`crate::config::Config`] loaded from
//! `folio.yaml`.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod feed;
pub mod highlight;
mod htmlrenderer;
pub mod markdown;
pub mod page;
pub mod scrollspy;
pub mod toc;
pub mod util;
pub mod value;
pub mod xml;
