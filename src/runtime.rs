use std::sync::Arc;

use tokio::sync::mpsc;

use crate::application::FoodState;
use crate::message::{Message, Request};
use crate::sync::TaskRemote;
use crate::sync::error::RemoteError;

/// Single-writer loop around [`FoodState`].
///
/// Requests run concurrently on tokio tasks; their completions come back over a
/// channel and are applied one at a time, so the state never sees interleaved
/// writes. Completion order is arrival order and there is no cancellation: when two
/// refetches race, the last one to land wins.
pub struct Runtime<R> {
    remote: Arc<R>,
    state: FoodState,
    tx: mpsc::UnboundedSender<Message>,
    rx: mpsc::UnboundedReceiver<Message>,
    in_flight: usize,
}

impl<R: TaskRemote + 'static> Runtime<R> {
    pub fn new(remote: R) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            remote: Arc::new(remote),
            state: FoodState::new(),
            tx,
            rx,
            in_flight: 0,
        }
    }

    pub fn state(&self) -> &FoodState {
        &self.state
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Apply a message and start whatever request it asks for.
    pub fn send(&mut self, message: Message) {
        if let Some(request) = self.state.update(message) {
            self.dispatch(request);
        }
    }

    fn dispatch(&mut self, request: Request) {
        log::debug!("Dispatching {:?}", redact(&request));
        self.in_flight += 1;
        let remote = Arc::clone(&self.remote);
        let tx = self.tx.clone();
        let fallback = redact(&request);
        let task = tokio::spawn(async move { request.perform(remote.as_ref()).await });
        tokio::spawn(async move {
            // A panicking request still completes, or `settle` would wait forever.
            let message = match task.await {
                Ok(message) => message,
                Err(e) => {
                    log::error!("Request {:?} aborted: {}", fallback, e);
                    fallback.failed(RemoteError::Transport(format!("Request aborted: {}", e)))
                }
            };
            // The receiver lives as long as the runtime; a send error means it is gone.
            let _ = tx.send(message);
        });
    }

    /// Wait for the next completion and apply it. Returns `false` when nothing is
    /// in flight.
    pub async fn step(&mut self) -> bool {
        if self.in_flight == 0 {
            return false;
        }
        match self.rx.recv().await {
            Some(message) => {
                self.in_flight -= 1;
                self.send(message);
                true
            }
            None => false,
        }
    }

    /// Drive completions, including follow-up refetches, until nothing is in flight.
    pub async fn settle(&mut self) {
        while self.step().await {}
    }
}

/// Keep passwords out of the debug log.
fn redact(request: &Request) -> Request {
    match request {
        Request::Login { username, .. } => Request::Login {
            username: username.clone(),
            password: "***".to_string(),
        },
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::item::{Item, titles};
    use crate::sync::testing::FakeRemote;

    async fn logged_in(remote: FakeRemote) -> Runtime<FakeRemote> {
        let mut runtime = Runtime::new(remote);
        runtime.send(Message::SubmitLogin {
            username: "ana".into(),
            password: "secret".into(),
        });
        runtime.settle().await;
        assert!(runtime.state().is_authenticated());
        runtime
    }

    #[tokio::test]
    async fn login_then_initial_fetch_then_filter() {
        let remote = FakeRemote::default();
        remote
            .listings
            .lock()
            .unwrap()
            .push_back(Ok(vec![Item::new("Rice"), Item::new("Beans")]));

        let mut runtime = logged_in(remote).await;
        assert_eq!(titles(runtime.state().items()), vec!["Rice", "Beans"]);

        runtime.send(Message::SearchChanged("ri".into()));
        assert_eq!(runtime.in_flight(), 0);
        assert_eq!(titles(runtime.state().filtered()), vec!["Rice"]);
    }

    #[tokio::test]
    async fn blank_login_makes_no_call() {
        let mut runtime = Runtime::new(FakeRemote::default());
        runtime.send(Message::SubmitLogin {
            username: "".into(),
            password: "secret".into(),
        });
        runtime.settle().await;
        assert!(!runtime.state().is_authenticated());
        assert_eq!(
            runtime.state().error(),
            Some("Username and password are required")
        );
        assert!(runtime.remote.calls().is_empty());
    }

    #[tokio::test]
    async fn add_triggers_exactly_one_refetch() {
        let mut runtime = logged_in(FakeRemote::with_server(&["Rice"])).await;

        runtime.send(Message::DraftChanged("Pizza".into()));
        runtime.send(Message::AddItem);
        runtime.settle().await;

        assert_eq!(
            runtime.remote.calls(),
            vec!["login ana", "list", "create Pizza", "list"]
        );
        assert_eq!(titles(runtime.state().items()), vec!["Rice", "Pizza"]);
        assert_eq!(runtime.state().draft(), "");
    }

    #[tokio::test]
    async fn blank_add_is_local_only() {
        let mut runtime = logged_in(FakeRemote::with_server(&["Rice"])).await;
        let before = runtime.remote.calls().len();

        runtime.send(Message::DraftChanged(String::new()));
        runtime.send(Message::AddItem);
        runtime.settle().await;

        assert_eq!(runtime.remote.calls().len(), before);
        assert_eq!(titles(runtime.state().items()), vec!["Rice"]);
    }

    #[tokio::test]
    async fn failed_delete_does_not_refetch() {
        let mut runtime = logged_in(FakeRemote::with_server(&["Rice", "Beans"])).await;
        runtime
            .remote
            .fail_next(RemoteError::Transport("connection reset".into()));

        runtime.send(Message::DeleteItem("Rice".into()));
        runtime.settle().await;

        assert_eq!(
            runtime.remote.calls(),
            vec!["login ana", "list", "delete Rice"]
        );
        assert_eq!(titles(runtime.state().items()), vec!["Rice", "Beans"]);
        assert_eq!(
            runtime.state().error(),
            Some("Failed to delete item: connection reset")
        );
    }

    #[tokio::test]
    async fn rename_delete_and_clear_resync_from_server() {
        let mut runtime = logged_in(FakeRemote::with_server(&["Rice", "Beans"])).await;

        runtime.send(Message::RenameItem {
            old_title: "Rice".into(),
            new_title: "Brown rice".into(),
        });
        runtime.settle().await;
        assert_eq!(titles(runtime.state().items()), vec!["Brown rice", "Beans"]);

        runtime.send(Message::DeleteItem("Beans".into()));
        runtime.settle().await;
        assert_eq!(titles(runtime.state().items()), vec!["Brown rice"]);

        runtime.send(Message::SearchChanged("brown".into()));
        runtime.send(Message::DeleteAllItems);
        runtime.settle().await;
        assert!(runtime.state().items().is_empty());
        assert!(runtime.state().filtered().is_empty());
    }

    /// Logs in fine, then panics on every item call.
    struct PanickingRemote;

    impl TaskRemote for PanickingRemote {
        async fn login(&self, _username: &str, _password: &str) -> Result<(), RemoteError> {
            Ok(())
        }

        async fn list_items(&self) -> Result<Vec<Item>, RemoteError> {
            panic!("list exploded")
        }

        async fn create_item(&self, _title: &str) -> Result<(), RemoteError> {
            panic!("create exploded")
        }

        async fn rename_item(&self, _old: &str, _new: &str) -> Result<(), RemoteError> {
            panic!("rename exploded")
        }

        async fn delete_item(&self, _title: &str) -> Result<(), RemoteError> {
            panic!("delete exploded")
        }

        async fn delete_all(&self) -> Result<(), RemoteError> {
            panic!("delete all exploded")
        }
    }

    #[tokio::test]
    async fn panicking_request_still_settles() {
        let mut runtime = Runtime::new(PanickingRemote);
        runtime.send(Message::SubmitLogin {
            username: "ana".into(),
            password: "secret".into(),
        });
        // Login succeeds, the initial list panics.
        runtime.settle().await;
        assert_eq!(runtime.in_flight(), 0);
        assert!(runtime.state().is_authenticated());
        let error = runtime.state().error().unwrap();
        assert!(error.starts_with("Failed to fetch items: Request aborted"), "{}", error);

        runtime.send(Message::DeleteItem("Rice".into()));
        runtime.settle().await;
        assert_eq!(runtime.in_flight(), 0);
        assert!(runtime
            .state()
            .error()
            .unwrap()
            .starts_with("Failed to delete item: Request aborted"));
    }

    #[tokio::test]
    async fn concurrent_mutations_all_settle() {
        let mut runtime = logged_in(FakeRemote::with_server(&[])).await;

        runtime.send(Message::DraftChanged("Rice".into()));
        runtime.send(Message::AddItem);
        runtime.send(Message::DraftChanged("Beans".into()));
        runtime.send(Message::AddItem);
        assert_eq!(runtime.in_flight(), 2);
        runtime.settle().await;

        let mut seen = titles(runtime.state().items())
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>();
        seen.sort();
        assert_eq!(seen, vec!["Beans", "Rice"]);
        assert_eq!(runtime.in_flight(), 0);
    }
}
