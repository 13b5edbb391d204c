/// Outer HTML of the rendered container, captured once per tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSnapshot(String);

impl PageSnapshot {
    pub fn new(html: impl Into<String>) -> Self {
        Self(html.into())
    }

    pub fn html(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}
