// Turning a QuoteRecord into page text
use crate::models::QuoteRecord;
use crate::page::Page;

pub const ATTRIBUTION_MARKER: &str = "——";
pub const UNKNOWN_LABEL: &str = "unknown";
pub const SYSTEM_LABEL: &str = "system";
pub const PLACEHOLDER_TEXT: &str = "Nothing to say today. More tomorrow.";

/// The two elements a quote is rendered into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteTargets {
    pub text_id: String,
    pub from_id: String,
}

impl QuoteTargets {
    pub fn new(text_id: impl Into<String>, from_id: impl Into<String>) -> Self {
        Self {
            text_id: text_id.into(),
            from_id: from_id.into(),
        }
    }

    /// Both elements must exist before we do anything at all
    pub fn present_on(&self, page: &dyn Page) -> bool {
        page.has_element(&self.text_id) && page.has_element(&self.from_id)
    }
}

impl Default for QuoteTargets {
    fn default() -> Self {
        Self::new("quote-text", "quote-from")
    }
}

/// `—— source · author`, falling back to whichever is present, then `unknown`
pub fn attribution(record: &QuoteRecord) -> String {
    let label = match (present(&record.source), present(&record.author)) {
        (Some(source), Some(author)) => format!("{} · {}", source, author),
        (Some(one), None) | (None, Some(one)) => one.to_string(),
        (None, None) => UNKNOWN_LABEL.to_string(),
    };

    format!("{} {}", ATTRIBUTION_MARKER, label)
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

pub fn render_quote(page: &mut dyn Page, targets: &QuoteTargets, record: &QuoteRecord) {
    page.set_text_content(&targets.text_id, &record.text);
    page.set_text_content(&targets.from_id, &attribution(record));
}

pub fn render_placeholder(page: &mut dyn Page, targets: &QuoteTargets) {
    page.set_text_content(&targets.text_id, PLACEHOLDER_TEXT);
    page.set_text_content(
        &targets.from_id,
        &format!("{} {}", ATTRIBUTION_MARKER, SYSTEM_LABEL),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::MemoryPage;

    #[test]
    fn test_attribution_both() {
        let record = QuoteRecord::new("A").with_source("B").with_author("C");
        assert_eq!(attribution(&record), "—— B · C");
    }

    #[test]
    fn test_attribution_single_field() {
        assert_eq!(attribution(&QuoteRecord::new("A").with_source("B")), "—— B");
        assert_eq!(attribution(&QuoteRecord::new("A").with_author("C")), "—— C");
    }

    #[test]
    fn test_attribution_unknown() {
        assert_eq!(attribution(&QuoteRecord::new("A")), "—— unknown");
        let blank = QuoteRecord::new("A").with_source("").with_author("");
        assert_eq!(attribution(&blank), "—— unknown");
    }

    #[test]
    fn test_render_quote_fills_both_elements() {
        let targets = QuoteTargets::default();
        let mut page = MemoryPage::with_elements(["quote-text", "quote-from"]);

        render_quote(&mut page, &targets, &QuoteRecord::new("A").with_source("B"));

        assert_eq!(page.text_content("quote-text"), Some("A"));
        assert_eq!(page.text_content("quote-from"), Some("—— B"));
    }

    #[test]
    fn test_render_placeholder() {
        let targets = QuoteTargets::default();
        let mut page = MemoryPage::with_elements(["quote-text", "quote-from"]);

        render_placeholder(&mut page, &targets);

        assert_eq!(page.text_content("quote-text"), Some(PLACEHOLDER_TEXT));
        assert_eq!(page.text_content("quote-from"), Some("—— system"));
    }

    #[test]
    fn test_targets_require_both_elements() {
        let targets = QuoteTargets::default();
        assert!(!targets.present_on(&MemoryPage::with_elements(["quote-text"])));
        assert!(!targets.present_on(&MemoryPage::new()));
        assert!(targets.present_on(&MemoryPage::with_elements(["quote-from", "quote-text"])));
    }
}
