//! # Lost & Found Items
//!
//! The catalog entities and the per-item claim state machine.
//!
//! ```text
//!   OPEN ──claim (non-owner)──▶ CLAIMED ──resolve (owner)──▶ RESOLVED
//!     ▲                            │
//!     └──── backend rejection ─────┘
//! ```
//!
//! The guards here run before any local mutation or network call; callers
//! apply the transition only after the guard passes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::WorkflowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ItemType {
    Lost,
    Found,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemCategory {
    Electronics,
    Clothing,
    Documents,
    Accessories,
    Keys,
    /// Also absorbs categories this client does not know about.
    #[serde(other)]
    Other,
}

impl ItemCategory {
    pub const ALL: [ItemCategory; 6] = [
        ItemCategory::Electronics,
        ItemCategory::Clothing,
        ItemCategory::Documents,
        ItemCategory::Accessories,
        ItemCategory::Keys,
        ItemCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemCategory::Electronics => "Electronics",
            ItemCategory::Clothing => "Clothing",
            ItemCategory::Documents => "Documents",
            ItemCategory::Accessories => "Accessories",
            ItemCategory::Keys => "Keys",
            ItemCategory::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ItemStatus {
    Open,
    Claimed,
    Resolved,
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ItemStatus::Open => "OPEN",
            ItemStatus::Claimed => "CLAIMED",
            ItemStatus::Resolved => "RESOLVED",
        })
    }
}

/// A person as described by the identity provider's claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
}

/// A reported lost or found item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Generated client-side at creation.
    pub id: String,
    /// Immutable after creation.
    #[serde(rename = "type")]
    pub kind: ItemType,
    pub title: String,
    pub description: String,
    pub category: ItemCategory,
    pub location: String,
    pub date: NaiveDate,
    /// Remote URL, or a `file://` reference while an upload is pending.
    pub image_url: String,
    pub status: ItemStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_info: Option<String>,
    /// Reporting user; immutable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Set only while CLAIMED or RESOLVED.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claimed_by: Option<String>,
}

/// Caller-supplied fields for a new report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub kind: ItemType,
    pub title: String,
    pub description: String,
    pub category: ItemCategory,
    pub location: String,
    pub date: NaiveDate,
    pub image_url: String,
    pub contact_info: Option<String>,
}

impl Item {
    /// Builds an OPEN item owned by `owner` with a fresh v4 id.
    pub fn report(fields: NewItem, owner: &User) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind: fields.kind,
            title: fields.title,
            description: fields.description,
            category: fields.category,
            location: fields.location,
            date: fields.date,
            image_url: fields.image_url,
            status: ItemStatus::Open,
            contact_info: fields.contact_info,
            user_id: Some(owner.id.clone()),
            claimed_by: None,
        }
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id.as_deref() == Some(user_id)
    }

    /// Guard for OPEN → CLAIMED. Returns the claimant on success.
    pub fn check_claim<'a>(&self, caller: Option<&'a User>) -> Result<&'a User, WorkflowError> {
        if self.status != ItemStatus::Open {
            return Err(WorkflowError::NotClaimable(self.status));
        }
        let caller = caller.ok_or(WorkflowError::AuthenticationRequired)?;
        if self.is_owned_by(&caller.id) {
            return Err(WorkflowError::OwnItem);
        }
        Ok(caller)
    }

    /// Applies OPEN → CLAIMED after [`Item::check_claim`] passed.
    pub fn mark_claimed(&mut self, claimant: &User) {
        self.status = ItemStatus::Claimed;
        self.claimed_by = Some(claimant.id.clone());
    }

    /// Compensates a rejected claim: CLAIMED → OPEN, claimant cleared.
    pub fn revert_claim(&mut self) {
        if self.status == ItemStatus::Claimed {
            self.status = ItemStatus::Open;
            self.claimed_by = None;
        }
    }

    /// Guard for CLAIMED → RESOLVED ("mark as returned").
    pub fn check_resolve(&self, caller: &User) -> Result<(), WorkflowError> {
        if !self.is_owned_by(&caller.id) {
            return Err(WorkflowError::NotOwner);
        }
        if self.status != ItemStatus::Claimed {
            return Err(WorkflowError::NotClaimed(self.status));
        }
        Ok(())
    }

    pub fn mark_resolved(&mut self) {
        self.status = ItemStatus::Resolved;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> User {
        User {
            id: id.to_string(),
            email: format!("{id}@campus.edu"),
            name: id.to_string(),
        }
    }

    fn wallet(owner: &User) -> Item {
        Item::report(
            NewItem {
                kind: ItemType::Lost,
                title: "Brown Leather Wallet".into(),
                description: "Vintage, contains ID card".into(),
                category: ItemCategory::Accessories,
                location: "Student Center".into(),
                date: NaiveDate::from_ymd_opt(2023, 10, 24).unwrap(),
                image_url: "https://img.example/wallet.jpg".into(),
                contact_info: None,
            },
            owner,
        )
    }

    #[test]
    fn report_starts_open_and_owned() {
        let owner = user("alice");
        let item = wallet(&owner);
        assert_eq!(item.status, ItemStatus::Open);
        assert!(item.is_owned_by("alice"));
        assert!(item.claimed_by.is_none());
        assert!(Uuid::parse_str(&item.id).is_ok());
    }

    #[test]
    fn non_owner_can_claim_open_item() {
        let owner = user("alice");
        let bob = user("bob");
        let mut item = wallet(&owner);

        let claimant = item.check_claim(Some(&bob)).unwrap();
        item.mark_claimed(claimant);

        assert_eq!(item.status, ItemStatus::Claimed);
        assert_eq!(item.claimed_by.as_deref(), Some("bob"));
    }

    #[test]
    fn claim_requires_authentication() {
        let item = wallet(&user("alice"));
        assert_eq!(item.check_claim(None), Err(WorkflowError::AuthenticationRequired));
    }

    #[test]
    fn owner_cannot_claim_own_item() {
        let owner = user("alice");
        let item = wallet(&owner);
        assert_eq!(item.check_claim(Some(&owner)), Err(WorkflowError::OwnItem));
    }

    #[test]
    fn claimed_and_resolved_items_reject_claims() {
        let owner = user("alice");
        let bob = user("bob");
        let carol = user("carol");
        let mut item = wallet(&owner);
        item.mark_claimed(&bob);

        assert_eq!(
            item.check_claim(Some(&carol)),
            Err(WorkflowError::NotClaimable(ItemStatus::Claimed))
        );

        item.mark_resolved();
        assert_eq!(
            item.check_claim(Some(&carol)),
            Err(WorkflowError::NotClaimable(ItemStatus::Resolved))
        );
        // Status is rejected even for anonymous callers.
        assert_eq!(
            item.check_claim(None),
            Err(WorkflowError::NotClaimable(ItemStatus::Resolved))
        );
    }

    #[test]
    fn only_owner_resolves_a_claimed_item() {
        let owner = user("alice");
        let bob = user("bob");
        let mut item = wallet(&owner);

        assert_eq!(item.check_resolve(&owner), Err(WorkflowError::NotClaimed(ItemStatus::Open)));

        item.mark_claimed(&bob);
        assert_eq!(item.check_resolve(&bob), Err(WorkflowError::NotOwner));
        assert!(item.check_resolve(&owner).is_ok());

        item.mark_resolved();
        assert_eq!(item.status, ItemStatus::Resolved);
        assert_eq!(item.claimed_by.as_deref(), Some("bob"));
    }

    #[test]
    fn revert_clears_claimant() {
        let mut item = wallet(&user("alice"));
        item.mark_claimed(&user("bob"));
        item.revert_claim();
        assert_eq!(item.status, ItemStatus::Open);
        assert!(item.claimed_by.is_none());
    }

    #[test]
    fn item_json_uses_catalog_field_names() {
        let mut item = wallet(&user("alice"));
        item.id = "3".into();
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "LOST");
        assert_eq!(json["status"], "OPEN");
        assert_eq!(json["category"], "Accessories");
        assert_eq!(json["date"], "2023-10-24");
        assert_eq!(json["userId"], "alice");
        assert!(json.get("claimedBy").is_none());
    }

    #[test]
    fn unknown_category_reads_as_other() {
        let raw = serde_json::json!({
            "id": "9", "type": "FOUND", "title": "Umbrella", "description": "",
            "category": "Umbrellas", "location": "Gate B", "date": "2024-01-02",
            "imageUrl": "", "status": "OPEN"
        });
        let item: Item = serde_json::from_value(raw).unwrap();
        assert_eq!(item.category, ItemCategory::Other);
        assert!(item.user_id.is_none());
    }
}
