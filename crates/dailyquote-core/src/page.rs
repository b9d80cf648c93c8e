// Pages the widget renders into
use regex::Regex;
use std::collections::BTreeMap;
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::Result;

/// Minimal view of a document: elements found by id, text content settable
pub trait Page {
    fn has_element(&self, id: &str) -> bool;

    /// Replace the element's text. Unknown ids are ignored.
    fn set_text_content(&mut self, id: &str, text: &str);
}

/// Page held entirely in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryPage {
    elements: BTreeMap<String, String>,
}

impl MemoryPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Page with the given (empty) elements
    pub fn with_elements<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            elements: ids.into_iter().map(|id| (id.into(), String::new())).collect(),
        }
    }

    pub fn text_content(&self, id: &str) -> Option<&str> {
        self.elements.get(id).map(String::as_str)
    }
}

impl Page for MemoryPage {
    fn has_element(&self, id: &str) -> bool {
        self.elements.contains_key(id)
    }

    fn set_text_content(&mut self, id: &str, text: &str) {
        if let Some(slot) = self.elements.get_mut(id) {
            *slot = text.to_string();
        }
    }
}

/// An HTML document whose elements are located by their `id` attribute.
///
/// This is text surgery, not a DOM: the content between the element's start
/// tag and the next close tag of the same name is replaced, so an element
/// must not contain a nested element with its own tag name.
#[derive(Debug, Clone)]
pub struct HtmlPage {
    path: Option<PathBuf>,
    html: String,
    dirty: bool,
}

impl HtmlPage {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let html = std::fs::read_to_string(path)?;
        Ok(Self {
            path: Some(path.to_path_buf()),
            html,
            dirty: false,
        })
    }

    pub fn from_html(html: impl Into<String>) -> Self {
        Self {
            path: None,
            html: html.into(),
            dirty: false,
        }
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    /// True once anything has been rendered into the page
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Write the page back to where it was loaded from, if it changed
    pub fn save(&self) -> Result<bool> {
        match &self.path {
            Some(path) if self.dirty => {
                std::fs::write(path, &self.html)?;
                debug!("Wrote {}", path.display());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Byte range of the element's content
    fn content_range(&self, id: &str) -> Option<Range<usize>> {
        // Tag and attribute names are case-insensitive, id values are not
        let id = regex::escape(id);
        let pattern = format!(
            r#"<((?i:[a-z][a-z0-9-]*))\b[^>]*\s(?i:id)\s*=\s*(?:"{id}"|'{id}')[^>]*>"#,
            id = id
        );
        let start_tag = Regex::new(&pattern).ok()?;
        let caps = start_tag.captures(&self.html)?;
        let whole = caps.get(0)?;

        if whole.as_str().ends_with("/>") {
            return None;
        }

        let tag = regex::escape(caps.get(1)?.as_str());
        let close_tag = Regex::new(&format!(r"(?i)</{}\s*>", tag)).ok()?;
        let start = whole.end();
        let close = close_tag.find(&self.html[start..])?;

        Some(start..start + close.start())
    }
}

impl Page for HtmlPage {
    fn has_element(&self, id: &str) -> bool {
        self.content_range(id).is_some()
    }

    fn set_text_content(&mut self, id: &str, text: &str) {
        if let Some(range) = self.content_range(id) {
            let escaped = html_escape::encode_text(text);
            self.html.replace_range(range, &escaped);
            self.dirty = true;
        }
    }
}
