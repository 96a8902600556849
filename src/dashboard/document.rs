// Document targets the dashboard writes into (text content / inner HTML by element id)

use askama::Template;
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::{DEVICE_LIST_ID, OFFLINE_DEVICES_ID, ONLINE_DEVICES_ID, TOTAL_DEVICES_ID};

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("element #{0} not found")]
    MissingElement(String),
    #[error("failed to write page: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to render page: {0}")]
    Template(#[from] askama::Error),
}

/// The subset of a DOM the dashboard needs. Implementations must treat
/// `set_text_content` values as plain text; `set_inner_html` values are
/// already-escaped markup.
pub trait Document: Send + 'static {
    /// Whether an element with this id exists.
    fn contains(&self, id: &str) -> bool;

    fn set_text_content(&mut self, id: &str, text: &str) -> Result<(), DocumentError>;

    fn set_inner_html(&mut self, id: &str, html: &str) -> Result<(), DocumentError>;

    /// Called once after a complete render.
    fn commit(&mut self) -> Result<(), DocumentError> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Content {
    Text(String),
    Html(String),
}

/// In-memory document holding a fixed set of elements.
#[derive(Debug, Clone, Default)]
pub struct Page {
    elements: BTreeMap<String, Content>,
    mutations: u64,
}

#[derive(Template)]
#[template(path = "page.html")]
struct PageTemplate<'a> {
    total: &'a str,
    online: &'a str,
    offline: &'a str,
    device_list: &'a str,
}

impl Page {
    /// Empty page with the given element ids.
    pub fn with_elements<'a>(ids: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            elements: ids
                .into_iter()
                .map(|id| (id.to_string(), Content::Text(String::new())))
                .collect(),
            mutations: 0,
        }
    }

    /// Page containing the four dashboard targets.
    pub fn dashboard() -> Self {
        Self::with_elements([
            TOTAL_DEVICES_ID,
            ONLINE_DEVICES_ID,
            OFFLINE_DEVICES_ID,
            DEVICE_LIST_ID,
        ])
    }

    /// Text of an element as a browser's `textContent` would report it for
    /// text set through `set_text_content`; `None` for unknown ids or HTML content.
    pub fn text_content(&self, id: &str) -> Option<&str> {
        match self.elements.get(id)? {
            Content::Text(t) => Some(t),
            Content::Html(_) => None,
        }
    }

    pub fn inner_html(&self, id: &str) -> Option<&str> {
        match self.elements.get(id)? {
            Content::Html(h) => Some(h),
            Content::Text(_) => None,
        }
    }

    /// Number of successful writes since creation.
    pub fn mutation_count(&self) -> u64 {
        self.mutations
    }

    /// Full HTML document with the current element contents.
    pub fn to_html(&self) -> Result<String, DocumentError> {
        let text = |id: &str| self.text_content(id).unwrap_or_default();
        let template = PageTemplate {
            total: text(TOTAL_DEVICES_ID),
            online: text(ONLINE_DEVICES_ID),
            offline: text(OFFLINE_DEVICES_ID),
            device_list: self.inner_html(DEVICE_LIST_ID).unwrap_or_default(),
        };
        Ok(template.render()?)
    }

    fn element_mut(&mut self, id: &str) -> Result<&mut Content, DocumentError> {
        self.elements
            .get_mut(id)
            .ok_or_else(|| DocumentError::MissingElement(id.to_string()))
    }
}

impl Document for Page {
    fn contains(&self, id: &str) -> bool {
        self.elements.contains_key(id)
    }

    fn set_text_content(&mut self, id: &str, text: &str) -> Result<(), DocumentError> {
        *self.element_mut(id)? = Content::Text(text.to_string());
        self.mutations += 1;
        Ok(())
    }

    fn set_inner_html(&mut self, id: &str, html: &str) -> Result<(), DocumentError> {
        *self.element_mut(id)? = Content::Html(html.to_string());
        self.mutations += 1;
        Ok(())
    }
}

/// Dashboard page mirrored to an HTML file after every render.
#[derive(Debug)]
pub struct FilePage {
    page: Page,
    path: PathBuf,
}

impl FilePage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            page: Page::dashboard(),
            path: path.into(),
        }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }
}

impl Document for FilePage {
    fn contains(&self, id: &str) -> bool {
        self.page.contains(id)
    }

    fn set_text_content(&mut self, id: &str, text: &str) -> Result<(), DocumentError> {
        self.page.set_text_content(id, text)
    }

    fn set_inner_html(&mut self, id: &str, html: &str) -> Result<(), DocumentError> {
        self.page.set_inner_html(id, html)
    }

    fn commit(&mut self) -> Result<(), DocumentError> {
        let html = self.page.to_html()?;
        let tmp = self.path.with_extension("html.tmp");
        std::fs::write(&tmp, html)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
