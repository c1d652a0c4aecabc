use crate::core::item::Item;
use crate::sync::error::RemoteError;
use crate::sync::session;
use crate::sync::TaskRemote;

/// Everything that can change [`FoodState`](crate::application::FoodState):
/// user intents and request completions alike.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Login
    SubmitLogin { username: String, password: String },
    LoginCompleted(Result<(), RemoteError>),

    // Input fields
    DraftChanged(String),
    SearchChanged(String),

    // Item intents
    Refresh,
    AddItem,
    RenameItem { old_title: String, new_title: String },
    DeleteItem(String),
    DeleteAllItems,

    // Completions
    ItemsLoaded(Result<Vec<Item>, RemoteError>),
    ItemAdded(Result<(), RemoteError>),
    ItemRenamed(Result<(), RemoteError>),
    ItemDeleted(Result<(), RemoteError>),
    AllItemsDeleted(Result<(), RemoteError>),

    DismissNotice,
}

/// A round trip the state asks the runtime to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Login { username: String, password: String },
    List,
    Create(String),
    Rename { old_title: String, new_title: String },
    Delete(String),
    DeleteAll,
}

impl Request {
    /// Run the request and wrap its outcome in the matching completion message.
    pub async fn perform<R: TaskRemote>(self, remote: &R) -> Message {
        match self {
            Request::Login { username, password } => {
                Message::LoginCompleted(session::authenticate(remote, &username, &password).await)
            }
            Request::List => Message::ItemsLoaded(remote.list_items().await),
            Request::Create(title) => Message::ItemAdded(remote.create_item(&title).await),
            Request::Rename {
                old_title,
                new_title,
            } => Message::ItemRenamed(remote.rename_item(&old_title, &new_title).await),
            Request::Delete(title) => Message::ItemDeleted(remote.delete_item(&title).await),
            Request::DeleteAll => Message::AllItemsDeleted(remote.delete_all().await),
        }
    }

    /// The completion message for this request when it never produced an outcome.
    pub fn failed(&self, error: RemoteError) -> Message {
        match self {
            Request::Login { .. } => Message::LoginCompleted(Err(error)),
            Request::List => Message::ItemsLoaded(Err(error)),
            Request::Create(_) => Message::ItemAdded(Err(error)),
            Request::Rename { .. } => Message::ItemRenamed(Err(error)),
            Request::Delete(_) => Message::ItemDeleted(Err(error)),
            Request::DeleteAll => Message::AllItemsDeleted(Err(error)),
        }
    }
}
