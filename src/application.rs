use crate::core::filter::derive_filtered_list;
use crate::core::item::Item;
use crate::message::{Message, Request};
use crate::sync::client::check_key_title;
use crate::sync::error::RemoteError;

/// Client-side state of the food screen.
///
/// The item list only ever changes by being replaced with a fresh server listing;
/// every successful mutation asks for exactly one refetch instead of patching the
/// list locally. `filtered` is rederived whenever `items` or `query` changes.
#[derive(Debug, Default)]
pub struct FoodState {
    authenticated: bool,
    items: Vec<Item>,
    query: String,
    filtered: Vec<Item>,
    draft: String,
    error: Option<String>,
    notice: Option<String>,
}

impl FoodState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn filtered(&self) -> &[Item] {
        &self.filtered
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Apply one message. Returns the round trip to perform next, if any.
    pub fn update(&mut self, message: Message) -> Option<Request> {
        match message {
            Message::SubmitLogin { username, password } => {
                Some(Request::Login { username, password })
            }

            Message::LoginCompleted(result) => match result {
                Ok(()) => {
                    self.authenticated = true;
                    self.error = None;
                    self.notice = Some("Login successful".to_string());
                    Some(Request::List)
                }
                Err(RemoteError::Validation(msg)) => {
                    self.fail(msg);
                    None
                }
                Err(RemoteError::Transport(msg)) => {
                    self.fail(format!("Connection error: {}", msg));
                    None
                }
                Err(e) => {
                    log::warn!("Login rejected: {}", e);
                    self.fail("Invalid credentials".to_string());
                    None
                }
            },

            Message::DraftChanged(text) => {
                self.draft = text;
                None
            }

            Message::SearchChanged(query) => {
                self.query = query;
                self.refilter();
                None
            }

            Message::Refresh => {
                self.require_session()?;
                Some(Request::List)
            }

            Message::AddItem => {
                self.require_session()?;
                if self.draft.trim().is_empty() {
                    self.fail("Item name cannot be empty".to_string());
                    return None;
                }
                Some(Request::Create(self.draft.clone()))
            }

            Message::RenameItem {
                old_title,
                new_title,
            } => {
                self.require_session()?;
                self.require_key_title(&old_title)?;
                if new_title.trim().is_empty() {
                    self.fail("New item name cannot be empty".to_string());
                    return None;
                }
                Some(Request::Rename {
                    old_title,
                    new_title,
                })
            }

            Message::DeleteItem(title) => {
                self.require_session()?;
                self.require_key_title(&title)?;
                Some(Request::Delete(title))
            }

            Message::DeleteAllItems => {
                self.require_session()?;
                Some(Request::DeleteAll)
            }

            Message::ItemsLoaded(result) => {
                match result {
                    Ok(items) => {
                        log::debug!("Replacing {} items with {}", self.items.len(), items.len());
                        self.items = items;
                        self.error = None;
                        self.refilter();
                    }
                    Err(e) => self.fail(format!("Failed to fetch items: {}", e)),
                }
                None
            }

            Message::ItemAdded(result) => self.after_mutation(result, "Failed to add item", |state| {
                state.draft.clear();
                state.notice = Some("Item added".to_string());
            }),

            Message::ItemRenamed(result) => {
                self.after_mutation(result, "Failed to rename item", |_| {})
            }

            Message::ItemDeleted(result) => {
                self.after_mutation(result, "Failed to delete item", |_| {})
            }

            Message::AllItemsDeleted(result) => {
                self.after_mutation(result, "Failed to delete all items", |_| {})
            }

            Message::DismissNotice => {
                self.notice = None;
                None
            }
        }
    }

    /// Shared tail of every mutation: refetch on success, report on failure.
    fn after_mutation(
        &mut self,
        result: Result<(), RemoteError>,
        context: &str,
        on_success: impl FnOnce(&mut Self),
    ) -> Option<Request> {
        match result {
            Ok(()) => {
                self.error = None;
                on_success(self);
                Some(Request::List)
            }
            Err(e) => {
                self.fail(format!("{}: {}", context, e));
                None
            }
        }
    }

    fn require_session(&mut self) -> Option<()> {
        if self.authenticated {
            Some(())
        } else {
            self.fail("Not logged in".to_string());
            None
        }
    }

    fn require_key_title(&mut self, title: &str) -> Option<()> {
        match check_key_title(title) {
            Ok(()) => Some(()),
            Err(e) => {
                self.fail(e.to_string());
                None
            }
        }
    }

    fn fail(&mut self, message: String) {
        log::error!("{}", message);
        self.notice = None;
        self.error = Some(message);
    }

    fn refilter(&mut self) {
        self.filtered = derive_filtered_list(&self.items, &self.query);
    }
}
