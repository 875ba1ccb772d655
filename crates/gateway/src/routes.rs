//! Gateway endpoint paths, as segments appended to the configured base URL.
//!
//! Ids are passed as single segments; the client percent-encodes each one,
//! so an id containing `/`, `?` or `#` cannot escape its position.

pub const LOGIN: &[&str] = &["employee", "login"];
pub const LOGOUT: &[&str] = &["employee", "logout"];
pub const PENDING_REVIEWS: &[&str] = &["employee", "site-reviews", "pending-reviews"];
pub const AREAS: &[&str] = &["employee", "areas"];
pub const OVERVIEW: &[&str] = &["employee", "dashboard", "overview"];

pub fn review(id: &str) -> [&str; 4] {
    ["employee", "site-reviews", "review", id]
}

pub fn review_action(id: &str) -> [&str; 5] {
    ["employee", "site-reviews", "review", id, "action"]
}

pub fn update_site(site_id: &str) -> [&str; 5] {
    ["employee", "site-reviews", "site", site_id, "update-details"]
}

pub fn area_blocks(area_id: &str) -> [&str; 4] {
    ["employee", "areas", area_id, "blocks"]
}
