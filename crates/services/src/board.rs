//! # Item Board
//!
//! The single owner of the in-memory item collection. Every mutation runs in
//! two phases:
//! 1. guard and apply the change locally, so callers see it at once;
//! 2. confirm it with the catalog in a background task, which either leaves
//!    the local state alone or runs the mutation's compensating action.
//!
//! | Mutation | Backend call | On failure |
//! |---|---|---|
//! | report | `create` | item removed again |
//! | claim | `claim` | CLAIMED → OPEN, claimant cleared |
//! | delete | `delete` | kept deleted, warning only |
//! | resolve, update | none | n/a |

use std::sync::Arc;

use domains::{
    CatalogError, FileUpload, ImageStore, Item, ItemCatalog, ItemStatus, NewItem, User,
    WorkflowError,
};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

use crate::demo::demo_items;
use crate::filter::ItemFilter;

/// Why the demo dataset is being shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    /// `URL_NOT_CONFIGURED`, `CORS_OR_NETWORK_ERROR`, `HTTP_<status>` or `MALFORMED_RESPONSE`.
    pub reason: String,
    pub message: String,
}

impl From<&CatalogError> for FetchFailure {
    fn from(error: &CatalogError) -> Self {
        Self {
            reason: error.reason(),
            message: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Items came from the catalog.
    Live(usize),
    /// The catalog failed; the demo dataset is shown instead.
    Demo(FetchFailure),
}

/// Result of a background confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Confirmed,
    /// The backend rejected the mutation and the local change was undone.
    RolledBack(CatalogError),
    /// The backend rejected the mutation; the local change stands.
    Unconfirmed(CatalogError),
    /// The confirmation task did not finish.
    Aborted(String),
}

/// Handle on a background confirmation. Dropping it does not cancel the task.
#[must_use = "the confirmation outcome carries backend warnings"]
#[derive(Debug)]
pub struct PendingSync(JoinHandle<SyncOutcome>);

impl PendingSync {
    pub async fn wait(self) -> SyncOutcome {
        match self.0.await {
            Ok(outcome) => outcome,
            Err(e) => SyncOutcome::Aborted(e.to_string()),
        }
    }
}

#[derive(Debug, Default)]
struct BoardState {
    items: Vec<Item>,
    backend_error: Option<FetchFailure>,
}

pub struct ItemBoard {
    catalog: Arc<dyn ItemCatalog>,
    images: Option<Arc<dyn ImageStore>>,
    state: Arc<RwLock<BoardState>>,
}

impl ItemBoard {
    pub fn new(catalog: Arc<dyn ItemCatalog>) -> Self {
        Self {
            catalog,
            images: None,
            state: Arc::new(RwLock::new(BoardState::default())),
        }
    }

    pub fn with_image_store(mut self, images: Arc<dyn ImageStore>) -> Self {
        self.images = Some(images);
        self
    }

    /// Reloads from the catalog, substituting the demo dataset on any failure.
    #[instrument(skip_all)]
    pub async fn refresh(&self) -> LoadOutcome {
        match self.catalog.list().await {
            Ok(items) => {
                let count = items.len();
                let mut state = self.state.write().await;
                state.items = items;
                state.backend_error = None;
                info!(count, "loaded items from catalog");
                LoadOutcome::Live(count)
            }
            Err(e) => {
                let failure = FetchFailure::from(&e);
                warn!(reason = %failure.reason, error = %e, "catalog unavailable, showing demo data");
                let mut state = self.state.write().await;
                state.items = demo_items();
                state.backend_error = Some(failure.clone());
                LoadOutcome::Demo(failure)
            }
        }
    }

    pub async fn items(&self) -> Vec<Item> {
        self.state.read().await.items.clone()
    }

    pub async fn get(&self, id: &str) -> Option<Item> {
        self.state.read().await.items.iter().find(|i| i.id == id).cloned()
    }

    pub async fn backend_error(&self) -> Option<FetchFailure> {
        self.state.read().await.backend_error.clone()
    }

    pub async fn filtered(&self, filter: &ItemFilter) -> Vec<Item> {
        let state = self.state.read().await;
        filter.apply(&state.items).into_iter().cloned().collect()
    }

    pub async fn reported_by(&self, user_id: &str) -> Vec<Item> {
        self.select(|item| item.is_owned_by(user_id)).await
    }

    pub async fn claimed_by(&self, user_id: &str) -> Vec<Item> {
        self.select(|item| item.claimed_by.as_deref() == Some(user_id)).await
    }

    async fn select(&self, pred: impl Fn(&Item) -> bool) -> Vec<Item> {
        let state = self.state.read().await;
        state.items.iter().filter(|i| pred(i)).cloned().collect()
    }

    /// Uploads an item photo, keeping `local_reference` if the upload fails.
    #[instrument(skip_all, fields(image = %upload.name))]
    pub async fn upload_image(&self, upload: &FileUpload, local_reference: String) -> String {
        let Some(images) = &self.images else {
            return local_reference;
        };
        match images.upload(upload).await {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, "image upload failed, keeping local reference");
                local_reference
            }
        }
    }

    /// Adds a new OPEN item at the top of the list and confirms it with the catalog.
    #[instrument(skip_all, fields(owner = %owner.id))]
    pub async fn report(&self, fields: NewItem, owner: &User) -> (Item, PendingSync) {
        let item = Item::report(fields, owner);
        self.state.write().await.items.insert(0, item.clone());
        info!(item_id = %item.id, "item reported");

        let catalog = Arc::clone(&self.catalog);
        let state = Arc::clone(&self.state);
        let created = item.clone();
        let task = tokio::spawn(async move {
            match catalog.create(&created).await {
                Ok(_) => SyncOutcome::Confirmed,
                Err(e) => {
                    warn!(item_id = %created.id, error = %e, "create rejected, removing item");
                    state.write().await.items.retain(|i| i.id != created.id);
                    SyncOutcome::RolledBack(e)
                }
            }
        });
        (item, PendingSync(task))
    }

    /// Removes the caller's item. A failed backend delete is reported but not undone.
    #[instrument(skip(self, caller), fields(caller = %caller.id))]
    pub async fn delete(&self, id: &str, caller: &User) -> Result<PendingSync, WorkflowError> {
        {
            let mut state = self.state.write().await;
            let pos = state
                .items
                .iter()
                .position(|i| i.id == id)
                .ok_or_else(|| WorkflowError::NotFound(id.to_string()))?;
            if !state.items[pos].is_owned_by(&caller.id) {
                return Err(WorkflowError::NotOwner);
            }
            state.items.remove(pos);
        }

        let catalog = Arc::clone(&self.catalog);
        let id = id.to_string();
        Ok(PendingSync(tokio::spawn(async move {
            match catalog.delete(&id).await {
                Ok(()) => SyncOutcome::Confirmed,
                Err(e) => {
                    warn!(item_id = %id, error = %e, "backend delete failed, item stays removed locally");
                    SyncOutcome::Unconfirmed(e)
                }
            }
        })))
    }

    /// OPEN → CLAIMED for a signed-in non-owner. Guards run before any
    /// mutation or network call; a backend rejection reverts the claim.
    #[instrument(skip(self, caller))]
    pub async fn claim(&self, id: &str, caller: Option<&User>) -> Result<PendingSync, WorkflowError> {
        let claimant = {
            let mut state = self.state.write().await;
            let item = state
                .items
                .iter_mut()
                .find(|i| i.id == id)
                .ok_or_else(|| WorkflowError::NotFound(id.to_string()))?;
            let claimant = item.check_claim(caller)?;
            item.mark_claimed(claimant);
            claimant.id.clone()
        };
        info!(item_id = %id, claimant = %claimant, "item claimed");

        let catalog = Arc::clone(&self.catalog);
        let state = Arc::clone(&self.state);
        let id = id.to_string();
        Ok(PendingSync(tokio::spawn(async move {
            match catalog.claim(&id).await {
                Ok(()) => SyncOutcome::Confirmed,
                Err(e) => {
                    warn!(item_id = %id, error = %e, "claim rejected, reverting");
                    let mut state = state.write().await;
                    if let Some(item) = state.items.iter_mut().find(|i| i.id == id) {
                        // Only undo our own claim.
                        if item.claimed_by.as_deref() == Some(claimant.as_str()) {
                            item.revert_claim();
                        }
                    }
                    SyncOutcome::RolledBack(e)
                }
            }
        })))
    }

    /// CLAIMED → RESOLVED by the owner. No backend endpoint exists, so this is local only.
    pub async fn resolve(&self, id: &str, caller: &User) -> Result<(), WorkflowError> {
        let mut state = self.state.write().await;
        let item = state
            .items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| WorkflowError::NotFound(id.to_string()))?;
        item.check_resolve(caller)?;
        item.mark_resolved();
        info!(item_id = %id, "item resolved");
        Ok(())
    }

    /// Replaces the editable fields of the caller's item. Local only.
    pub async fn update(&self, edited: Item, caller: &User) -> Result<Item, WorkflowError> {
        let mut state = self.state.write().await;
        let item = state
            .items
            .iter_mut()
            .find(|i| i.id == edited.id)
            .ok_or_else(|| WorkflowError::NotFound(edited.id.clone()))?;
        if !item.is_owned_by(&caller.id) {
            return Err(WorkflowError::NotOwner);
        }
        item.title = edited.title;
        item.description = edited.description;
        item.category = edited.category;
        item.location = edited.location;
        item.date = edited.date;
        item.image_url = edited.image_url;
        item.contact_info = edited.contact_info;
        Ok(item.clone())
    }

    /// Count of items per status, for summaries.
    pub async fn status_counts(&self) -> [(ItemStatus, usize); 3] {
        let state = self.state.read().await;
        [ItemStatus::Open, ItemStatus::Claimed, ItemStatus::Resolved]
            .map(|s| (s, state.items.iter().filter(|i| i.status == s).count()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use chrono::NaiveDate;
    use domains::{ItemCategory, ItemType, MockImageStore, MockItemCatalog};

    fn user(id: &str) -> User {
        User {
            id: id.to_string(),
            email: format!("{id}@campus.edu"),
            name: id.to_string(),
        }
    }

    fn new_item() -> NewItem {
        NewItem {
            kind: ItemType::Lost,
            title: "Red Umbrella".into(),
            description: "Folding umbrella".into(),
            category: ItemCategory::Other,
            location: "Bus stop".into(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            image_url: "file:///tmp/umbrella.jpg".into(),
            contact_info: None,
        }
    }

    /// A board preloaded with the demo dataset through a failing `list`.
    async fn demo_board(mut catalog: MockItemCatalog) -> ItemBoard {
        catalog
            .expect_list()
            .returning(|| Err(CatalogError::Network("connection refused".into())));
        let board = ItemBoard::new(Arc::new(catalog));
        board.refresh().await;
        board
    }

    #[tokio::test]
    async fn failed_list_substitutes_demo_data() {
        let mut catalog = MockItemCatalog::new();
        catalog
            .expect_list()
            .returning(|| Err(CatalogError::Status { status: 502, body: "bad gateway".into() }));
        let board = ItemBoard::new(Arc::new(catalog));

        let outcome = board.refresh().await;
        assert!(matches!(&outcome, LoadOutcome::Demo(f) if f.reason == "HTTP_502"));
        assert_eq!(board.items().await.len(), 5);
        assert_eq!(board.backend_error().await.unwrap().reason, "HTTP_502");
    }

    #[tokio::test]
    async fn successful_list_clears_backend_error() {
        let mut catalog = MockItemCatalog::new();
        let mut calls = 0;
        catalog.expect_list().returning(move || {
            calls += 1;
            if calls == 1 {
                Err(CatalogError::Network("offline".into()))
            } else {
                Ok(vec![])
            }
        });
        let board = ItemBoard::new(Arc::new(catalog));
        board.refresh().await;
        assert_eq!(board.refresh().await, LoadOutcome::Live(0));
        assert!(board.backend_error().await.is_none());
        assert!(board.items().await.is_empty());
    }

    #[tokio::test]
    async fn repeated_refresh_yields_the_same_item_set() {
        let mut catalog = MockItemCatalog::new();
        let mut calls = 0;
        catalog.expect_list().times(2).returning(move || {
            calls += 1;
            let mut items = demo_items();
            if calls == 2 {
                items.reverse();
            }
            Ok(items)
        });
        let board = ItemBoard::new(Arc::new(catalog));

        let sorted = |mut items: Vec<Item>| {
            items.sort_by(|a, b| a.id.cmp(&b.id));
            items
        };
        assert_eq!(board.refresh().await, LoadOutcome::Live(5));
        let first = sorted(board.items().await);
        assert_eq!(board.refresh().await, LoadOutcome::Live(5));
        let second = sorted(board.items().await);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn claim_is_applied_then_confirmed() {
        let mut catalog = MockItemCatalog::new();
        catalog
            .expect_claim()
            .withf(|id| id == "1")
            .times(1)
            .returning(|_| Ok(()));
        let board = demo_board(catalog).await;
        let bob = user("bob");

        let pending = board.claim("1", Some(&bob)).await.unwrap();
        let item = board.get("1").await.unwrap();
        assert_eq!(item.status, ItemStatus::Claimed);
        assert_eq!(item.claimed_by.as_deref(), Some("bob"));

        assert_eq!(pending.wait().await, SyncOutcome::Confirmed);
        assert_eq!(board.claimed_by("bob").await.len(), 1);
    }

    #[tokio::test]
    async fn rejected_claim_reverts_to_open() {
        let mut catalog = MockItemCatalog::new();
        catalog
            .expect_claim()
            .returning(|_| Err(CatalogError::Status { status: 409, body: "already claimed".into() }));
        let board = demo_board(catalog).await;

        let pending = board.claim("2", Some(&user("bob"))).await.unwrap();
        assert!(matches!(pending.wait().await, SyncOutcome::RolledBack(_)));

        let item = board.get("2").await.unwrap();
        assert_eq!(item.status, ItemStatus::Open);
        assert_eq!(item.claimed_by, None);
    }

    #[tokio::test]
    async fn invalid_claims_never_reach_the_backend() {
        let mut catalog = MockItemCatalog::new();
        catalog.expect_claim().times(1).returning(|_| Ok(()));
        let board = demo_board(catalog).await;

        assert_eq!(
            board.claim("1", None).await.unwrap_err(),
            WorkflowError::AuthenticationRequired
        );
        assert_eq!(
            board.claim("1", Some(&user("user-mock-1"))).await.unwrap_err(),
            WorkflowError::OwnItem
        );
        assert_eq!(
            board.claim("missing", Some(&user("bob"))).await.unwrap_err(),
            WorkflowError::NotFound("missing".into())
        );

        board.claim("1", Some(&user("bob"))).await.unwrap().wait().await;
        assert_eq!(
            board.claim("1", Some(&user("carol"))).await.unwrap_err(),
            WorkflowError::NotClaimable(ItemStatus::Claimed)
        );
        assert_eq!(board.get("1").await.unwrap().claimed_by.as_deref(), Some("bob"));
    }

    #[tokio::test]
    async fn only_owner_resolves_claimed_item() {
        let mut catalog = MockItemCatalog::new();
        catalog.expect_claim().returning(|_| Ok(()));
        let board = demo_board(catalog).await;
        let owner = user("user-mock-3");

        assert_eq!(
            board.resolve("4", &owner).await.unwrap_err(),
            WorkflowError::NotClaimed(ItemStatus::Open)
        );
        board.claim("4", Some(&user("bob"))).await.unwrap().wait().await;
        assert_eq!(board.resolve("4", &user("bob")).await.unwrap_err(), WorkflowError::NotOwner);

        board.resolve("4", &owner).await.unwrap();
        assert_eq!(board.get("4").await.unwrap().status, ItemStatus::Resolved);
        assert_eq!(
            board.claim("4", Some(&user("dave"))).await.unwrap_err(),
            WorkflowError::NotClaimable(ItemStatus::Resolved)
        );
    }

    #[tokio::test]
    async fn rejected_create_removes_the_item() {
        let mut catalog = MockItemCatalog::new();
        catalog
            .expect_create()
            .returning(|_| Err(CatalogError::Network("timeout".into())));
        let board = demo_board(catalog).await;

        let (item, pending) = board.report(new_item(), &user("alice")).await;
        assert_eq!(board.items().await[0].id, item.id);
        assert!(matches!(pending.wait().await, SyncOutcome::RolledBack(_)));
        assert!(board.get(&item.id).await.is_none());
    }

    #[tokio::test]
    async fn confirmed_create_keeps_the_item() {
        let mut catalog = MockItemCatalog::new();
        catalog
            .expect_create()
            .withf(|item| item.status == ItemStatus::Open && item.user_id.as_deref() == Some("alice"))
            .returning(|item| Ok(item.clone()));
        let board = demo_board(catalog).await;

        let (item, pending) = board.report(new_item(), &user("alice")).await;
        assert_eq!(pending.wait().await, SyncOutcome::Confirmed);
        assert_eq!(board.reported_by("alice").await, vec![item]);
    }

    #[tokio::test]
    async fn failed_delete_is_not_rolled_back() {
        let mut catalog = MockItemCatalog::new();
        catalog
            .expect_delete()
            .returning(|_| Err(CatalogError::Status { status: 500, body: String::new() }));
        let board = demo_board(catalog).await;

        assert_eq!(
            board.delete("3", &user("bob")).await.unwrap_err(),
            WorkflowError::NotOwner
        );
        let pending = board.delete("3", &user("user-mock-1")).await.unwrap();
        assert!(matches!(pending.wait().await, SyncOutcome::Unconfirmed(_)));
        assert!(board.get("3").await.is_none());
    }

    #[tokio::test]
    async fn update_preserves_identity_and_state() {
        let board = demo_board(MockItemCatalog::new()).await;
        let mut edited = board.get("3").await.unwrap();
        edited.title = "Black Leather Wallet".into();
        edited.kind = ItemType::Found;
        edited.status = ItemStatus::Resolved;
        edited.user_id = Some("mallory".into());

        assert_eq!(
            board.update(edited.clone(), &user("bob")).await.unwrap_err(),
            WorkflowError::NotOwner
        );
        let updated = board.update(edited, &user("user-mock-1")).await.unwrap();
        assert_eq!(updated.title, "Black Leather Wallet");
        assert_eq!(updated.kind, ItemType::Lost);
        assert_eq!(updated.status, ItemStatus::Open);
        assert_eq!(updated.user_id.as_deref(), Some("user-mock-1"));
    }

    #[tokio::test]
    async fn failed_upload_keeps_local_reference() {
        let mut images = MockImageStore::new();
        images
            .expect_upload()
            .returning(|_| Err(CatalogError::Network("offline".into())));
        let board = ItemBoard::new(Arc::new(MockItemCatalog::new())).with_image_store(Arc::new(images));
        let upload = FileUpload {
            name: "a.jpg".into(),
            mime_type: "image/jpeg".into(),
            body: Bytes::from_static(b"\xFF\xD8\xFF"),
        };

        let url = board.upload_image(&upload, "file:///tmp/a.jpg".into()).await;
        assert_eq!(url, "file:///tmp/a.jpg");
    }

    #[tokio::test]
    async fn status_counts_follow_transitions() {
        let mut catalog = MockItemCatalog::new();
        catalog.expect_claim().returning(|_| Ok(()));
        let board = demo_board(catalog).await;
        board.claim("5", Some(&user("bob"))).await.unwrap().wait().await;

        let counts = board.status_counts().await;
        assert_eq!(counts[0], (ItemStatus::Open, 4));
        assert_eq!(counts[1], (ItemStatus::Claimed, 1));
    }
}
