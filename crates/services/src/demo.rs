//! # Demo Dataset
//!
//! Shown when the catalog cannot be listed.

use chrono::NaiveDate;
use domains::{Item, ItemCategory, ItemStatus, ItemType};

struct DemoRow {
    id: &'static str,
    kind: ItemType,
    title: &'static str,
    description: &'static str,
    category: ItemCategory,
    location: &'static str,
    date: (i32, u32, u32),
    image: &'static str,
    owner: &'static str,
}

const ROWS: &[DemoRow] = &[
    DemoRow {
        id: "1",
        kind: ItemType::Lost,
        title: "Silver Macbook Pro 14\"",
        description: "Lost in the library study room 3B. Has a distinct \"NASA\" sticker on the lid. \
                      Slightly scratched on the bottom right corner.",
        category: ItemCategory::Electronics,
        location: "Central Library",
        date: (2023, 10, 25),
        image: "photo-1517336714731-489689fd1ca8",
        owner: "user-mock-1",
    },
    DemoRow {
        id: "2",
        kind: ItemType::Found,
        title: "Blue Water Bottle",
        description: "Found on the bench near the main park entrance. 32oz size, has a few dents \
                      near the base. Sticker on bottom.",
        category: ItemCategory::Other,
        location: "City Park Entrance",
        date: (2023, 10, 26),
        image: "photo-1616118132534-381148898bb4",
        owner: "user-mock-2",
    },
    DemoRow {
        id: "3",
        kind: ItemType::Lost,
        title: "Brown Leather Wallet",
        description: "Contains ID card and driving license. Reward offered! It is a vintage leather wallet.",
        category: ItemCategory::Accessories,
        location: "Student Center Cafeteria",
        date: (2023, 10, 24),
        image: "photo-1627123424574-181ce5171c98",
        owner: "user-mock-1",
    },
    DemoRow {
        id: "4",
        kind: ItemType::Found,
        title: "Car Keys (Toyota)",
        description: "Found these keys on the 3rd floor hallway. Has a red keychain attached.",
        category: ItemCategory::Keys,
        location: "Science Building",
        date: (2023, 10, 27),
        image: "photo-1589829085413-56de8ae18c73",
        owner: "user-mock-3",
    },
    DemoRow {
        id: "5",
        kind: ItemType::Found,
        title: "Wireless Headphones",
        description: "Black over-ear headphones found in the gym locker room. Sony branding.",
        category: ItemCategory::Electronics,
        location: "Campus Gym",
        date: (2023, 10, 28),
        image: "photo-1505740420928-5e560c06d30e",
        owner: "user-mock-4",
    },
];

/// The fixed demonstration items, all OPEN.
pub fn demo_items() -> Vec<Item> {
    ROWS.iter()
        .map(|row| {
            let (y, m, d) = row.date;
            Item {
                id: row.id.to_string(),
                kind: row.kind,
                title: row.title.to_string(),
                description: row.description.to_string(),
                category: row.category,
                location: row.location.to_string(),
                date: NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default(),
                image_url: format!(
                    "https://images.unsplash.com/{}?auto=format&fit=crop&q=80&w=800",
                    row.image
                ),
                status: ItemStatus::Open,
                contact_info: None,
                user_id: Some(row.owner.to_string()),
                claimed_by: None,
            }
        })
        .collect()
}
