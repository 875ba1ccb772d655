//! In-memory filtering, sorting and pagination of fetched review items.
//!
//! These helpers only shape what is displayed. The workflow controller's
//! "next item" search always runs over the raw queue snapshot.

use std::cmp::Ordering;
use std::str::FromStr;

use crate::error::CoreError;
use crate::types::{review_type_label, ReviewItem, ReviewStatus};

/// Default number of rows per page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Maximum number of rows per page.
pub const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    CreatedAt,
    Priority,
    Address,
    Creator,
}

impl FromStr for SortKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "createdAt" | "created_at" | "created" => Ok(Self::CreatedAt),
            "priority" => Ok(Self::Priority),
            "address" => Ok(Self::Address),
            "creator" => Ok(Self::Creator),
            other => Err(CoreError::Validation(format!(
                "Invalid sort key '{other}'. Must be one of: createdAt, priority, address, creator"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Display query over a list of review items.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    /// Only keep pending / under-review items.
    pub open_only: bool,
    /// Keep only these statuses (empty = all).
    pub statuses: Vec<ReviewStatus>,
    /// Case-insensitive substring over address, creator and review type.
    pub search: Option<String>,
    pub sort: Option<(SortKey, SortDirection)>,
    /// 1-based page number; `0` is treated as `1`.
    pub page: usize,
    /// Rows per page, clamped to `1..=MAX_PAGE_SIZE`; `0` means the default.
    pub page_size: usize,
}

/// One page of results.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

/// Clamp a requested page size into the allowed window.
pub fn clamp_page_size(page_size: usize) -> usize {
    if page_size == 0 {
        DEFAULT_PAGE_SIZE
    } else {
        page_size.min(MAX_PAGE_SIZE)
    }
}

fn matches_search(item: &ReviewItem, needle: &str) -> bool {
    [
        item.full_address.as_str(),
        item.created_by_user_name.as_str(),
        review_type_label(&item.review_type),
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(needle))
}

fn compare(a: &ReviewItem, b: &ReviewItem, key: SortKey) -> Ordering {
    match key {
        SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
        SortKey::Priority => a.priority.cmp(&b.priority),
        SortKey::Address => a
            .full_address
            .to_lowercase()
            .cmp(&b.full_address.to_lowercase()),
        SortKey::Creator => a
            .created_by_user_name
            .to_lowercase()
            .cmp(&b.created_by_user_name.to_lowercase()),
    }
}

/// Apply filter, stable sort and pagination to a slice of items.
pub fn apply(items: &[ReviewItem], query: &ListQuery) -> Page<ReviewItem> {
    let needle = query
        .search
        .as_deref()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());

    let mut rows: Vec<ReviewItem> = items
        .iter()
        .filter(|item| !query.open_only || item.is_open())
        .filter(|item| query.statuses.is_empty() || query.statuses.contains(&item.status))
        .filter(|item| needle.as_deref().map_or(true, |n| matches_search(item, n)))
        .cloned()
        .collect();

    if let Some((key, direction)) = query.sort {
        rows.sort_by(|a, b| {
            let ord = compare(a, b, key);
            match direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        });
    }

    let page_size = clamp_page_size(query.page_size);
    let total_items = rows.len();
    let total_pages = total_items.div_ceil(page_size).max(1);
    let page = query.page.clamp(1, total_pages);

    let items = rows
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .collect();

    Page {
        items,
        page,
        page_size,
        total_items,
        total_pages,
    }
}
