use serde::Deserialize;

/// A food entry tracked by the remote service.
///
/// The title is the only handle the service gives us: it is shown to the user and
/// it addresses the item in rename/delete paths. Two items with the same title
/// cannot be told apart.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Item {
    pub title: String,
}

impl Item {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}

impl From<&str> for Item {
    fn from(title: &str) -> Self {
        Self::new(title)
    }
}

/// Titles of `items`, in order.
pub fn titles(items: &[Item]) -> Vec<&str> {
    items.iter().map(|i| i.title.as_str()).collect()
}
