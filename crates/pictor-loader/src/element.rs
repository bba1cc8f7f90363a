#![forbid(unsafe_code)]

use std::sync::Arc;

use parking_lot::Mutex;

/// DOM boundary for the loader.
///
/// Every write the loader performs goes through this trait, and
/// implementations must make writes on a detached element a no-op — the
/// loader additionally guards on [`is_attached`](Self::is_attached)
/// before touching the element, so results arriving after removal are
/// discarded rather than leaking work into a dead node.
pub trait ImageElement: Send + Sync + 'static {
    /// Replace the element's visible source URL.
    fn set_source(&self, url: &str);

    /// Currently visible source, if any has been set.
    fn current_source(&self) -> Option<String>;

    /// Apply the short opacity fade-in used when the placeholder paints.
    fn apply_fade_in(&self);

    /// Tag the element for broken-image styling (alt text stays visible).
    fn mark_broken(&self);

    /// Whether the element is still part of the page.
    fn is_attached(&self) -> bool;

    /// Alternative text of the underlying image source.
    fn alt_text(&self) -> Option<String>;
}

#[derive(Debug, Default)]
struct TestImageState {
    source: Option<String>,
    alt_text: Option<String>,
    attached: bool,
    faded_in: bool,
    broken: bool,
}

/// In-memory [`ImageElement`] for tests and headless use.
#[derive(Clone, Debug)]
pub struct TestImage {
    state: Arc<Mutex<TestImageState>>,
}

impl TestImage {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(TestImageState {
                attached: true,
                ..TestImageState::default()
            })),
        }
    }

    #[must_use]
    pub fn with_alt<A: Into<String>>(self, alt: A) -> Self {
        self.state.lock().alt_text = Some(alt.into());
        self
    }

    /// Simulate removal from the page.
    pub fn detach(&self) {
        self.state.lock().attached = false;
    }

    pub fn faded_in(&self) -> bool {
        self.state.lock().faded_in
    }

    pub fn broken(&self) -> bool {
        self.state.lock().broken
    }
}

impl Default for TestImage {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageElement for TestImage {
    fn set_source(&self, url: &str) {
        let mut state = self.state.lock();
        if state.attached {
            state.source = Some(url.to_string());
        }
    }

    fn current_source(&self) -> Option<String> {
        self.state.lock().source.clone()
    }

    fn apply_fade_in(&self) {
        let mut state = self.state.lock();
        if state.attached {
            state.faded_in = true;
        }
    }

    fn mark_broken(&self) {
        let mut state = self.state.lock();
        if state.attached {
            state.broken = true;
        }
    }

    fn is_attached(&self) -> bool {
        self.state.lock().attached
    }

    fn alt_text(&self) -> Option<String> {
        self.state.lock().alt_text.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_after_detach_are_no_ops() {
        let img = TestImage::new();
        img.set_source("https://e.com/a.jpg");
        img.detach();
        img.set_source("https://e.com/b.jpg");
        img.mark_broken();
        assert_eq!(img.current_source().as_deref(), Some("https://e.com/a.jpg"));
        assert!(!img.broken());
    }
}
