//! # Gallery Filter

use chrono::NaiveDate;
use domains::{Item, ItemCategory, ItemType};

/// Gallery criteria. Every unset field matches all items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    /// `None` shows both lost and found items.
    pub kind: Option<ItemType>,
    /// Empty means every category.
    pub categories: Vec<ItemCategory>,
    /// Case-insensitive substring of title, description or location.
    pub search: String,
    /// Inclusive lower bound.
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound.
    pub to: Option<NaiveDate>,
}

impl ItemFilter {
    pub fn is_active(&self) -> bool {
        self.kind.is_some()
            || !self.categories.is_empty()
            || !self.search.is_empty()
            || self.from.is_some()
            || self.to.is_some()
    }

    pub fn matches(&self, item: &Item) -> bool {
        if self.kind.is_some_and(|k| k != item.kind) {
            return false;
        }
        if !self.categories.is_empty() && !self.categories.contains(&item.category) {
            return false;
        }
        if self.from.is_some_and(|from| item.date < from) || self.to.is_some_and(|to| item.date > to) {
            return false;
        }
        let needle = self.search.to_lowercase();
        needle.is_empty()
            || [&item.title, &item.description, &item.location]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
    }

    pub fn apply<'a>(&self, items: &'a [Item]) -> Vec<&'a Item> {
        items.iter().filter(|item| self.matches(item)).collect()
    }
}
