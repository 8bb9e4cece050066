//! Browsable `index.html` for a run.
//!
//! One section per modifier category (in the order images were generated),
//! each a grid of thumbnails linking to the full-size image:
//!
//! ```text
//! outputs/
//! ├── index.html
//! └── Color/
//!     ├── red/Cat-0-full.png, Cat-0-thumb.png, ...
//!     └── blue/...
//! ```
//!
//! Rendered with [maud](https://maud.lambda.xyz/): the template is compiled
//! into the binary and all interpolation is escaped.

use crate::types::GeneratedImage;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use std::path::{Component, Path};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Template error: {0}")]
    Template(String),
}

/// Everything the index page is rendered from.
#[derive(Debug, Clone)]
pub struct IndexPage<'a> {
    pub title: &'a str,
    /// Directory the page is written to; image links are made relative to it.
    pub base: &'a Path,
    pub images: &'a [GeneratedImage],
}

/// Turns the accumulated records into an HTML document.
pub trait IndexRenderer {
    fn render(&self, page: &IndexPage<'_>) -> Result<String, RenderError>;
}

/// The built-in maud template.
#[derive(Debug, Default)]
pub struct MaudIndex;

impl IndexRenderer for MaudIndex {
    fn render(&self, page: &IndexPage<'_>) -> Result<String, RenderError> {
        Ok(render_index(page).into_string())
    }
}

const CSS: &str = r#"
body { font-family: system-ui, sans-serif; margin: 2rem; background: #fafafa; color: #111; }
h1 { font-weight: 400; }
h2 { font-weight: 400; border-bottom: 1px solid #e0e0e0; padding-bottom: .25rem; }
.grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(160px, 1fr)); gap: 1rem; }
figure { margin: 0; }
figure img { width: 100%; height: auto; display: block; }
figcaption { font-size: .8rem; color: #666; margin-top: .25rem; }
.empty { color: #666; }
"#;

fn render_index(page: &IndexPage<'_>) -> Markup {
    let sections = group_by_category(page.images);
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (page.title) }
                style { (PreEscaped(CSS)) }
            }
            body {
                h1 { (page.title) }
                @if sections.is_empty() {
                    p.empty { "No images were generated." }
                }
                @for (category, images) in &sections {
                    section {
                        h2 { (category) }
                        div.grid {
                            @for image in images {
                                (image_card(page.base, image))
                            }
                        }
                    }
                }
            }
        }
    }
}

fn image_card(base: &Path, image: &GeneratedImage) -> Markup {
    html! {
        figure {
            a href=(relative_url(base, &image.path)) {
                img src=(relative_url(base, &image.thumbnail())) alt=(image.label) loading="lazy";
            }
            figcaption { (image.label) }
        }
    }
}

/// Group records by category, keeping first-appearance order of categories
/// and insertion order within each.
fn group_by_category(images: &[GeneratedImage]) -> Vec<(&str, Vec<&GeneratedImage>)> {
    let mut groups: Vec<(&str, Vec<&GeneratedImage>)> = Vec::new();
    for image in images {
        match groups.iter_mut().find(|(c, _)| *c == image.category) {
            Some((_, list)) => list.push(image),
            None => groups.push((image.category.as_str(), vec![image])),
        }
    }
    groups
}

/// Characters escaped inside a single URL path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// `path` relative to `base` as a `/`-separated URL, each segment
/// percent-encoded. Paths outside `base` are kept as they are.
fn relative_url(base: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(base).unwrap_or(path);
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(part) => {
                Some(utf8_percent_encode(&part.to_string_lossy(), PATH_SEGMENT).to_string())
            }
            Component::RootDir => Some(String::new()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
