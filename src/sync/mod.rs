pub mod client;
pub mod error;
pub mod session;

use std::future::Future;

use crate::core::item::Item;
pub use client::FoodClient;
pub use error::RemoteError;

/// The operations the food service offers.
///
/// Every call resolves to exactly one outcome. Implemented over HTTP by
/// [`FoodClient`]; tests drive the store with an in-memory double.
pub trait TaskRemote: Send + Sync {
    fn login(
        &self,
        username: &str,
        password: &str,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;

    fn list_items(&self) -> impl Future<Output = Result<Vec<Item>, RemoteError>> + Send;

    fn create_item(&self, title: &str) -> impl Future<Output = Result<(), RemoteError>> + Send;

    fn rename_item(
        &self,
        old_title: &str,
        new_title: &str,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;

    fn delete_item(&self, title: &str) -> impl Future<Output = Result<(), RemoteError>> + Send;

    fn delete_all(&self) -> impl Future<Output = Result<(), RemoteError>> + Send;
}
