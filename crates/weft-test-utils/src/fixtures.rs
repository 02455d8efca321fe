//! Reusable list fixtures.
//!
//! [`Item`] embeds two links so one record can sit in an insertion-order list
//! and a priority list at the same time:
//!
//! - [`ByOrder`] threads the `order` member.
//! - [`ByPriority`] threads the `priority` member.

use weft_list::{link_adapter, Adapter, Link, List};

/// A record participating in up to two lists.
#[derive(Debug)]
pub struct Item {
    pub id: u32,
    pub weight: i64,
    pub order: Link,
    pub priority: Link,
}

impl Item {
    pub fn new(id: u32, weight: i64) -> Self {
        Self {
            id,
            weight,
            order: Link::new(),
            priority: Link::new(),
        }
    }
}

link_adapter!(
    /// Selects [`Item::order`].
    pub ByOrder = Item { order }
);
link_adapter!(
    /// Selects [`Item::priority`].
    pub ByPriority = Item { priority }
);

/// `n` items with ids `0..n` and weight equal to the id.
pub fn items(n: u32) -> Vec<Item> {
    (0..n).map(|id| Item::new(id, i64::from(id))).collect()
}

/// Ids of `list` front to back.
pub fn ids<A: Adapter<Entry = Item>>(list: &List<'_, A>) -> Vec<u32> {
    list.iter().map(|item| item.id).collect()
}

/// Ids of `list` back to front.
pub fn ids_rev<A: Adapter<Entry = Item>>(list: &List<'_, A>) -> Vec<u32> {
    list.iter().rev().map(|item| item.id).collect()
}
