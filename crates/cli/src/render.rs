//! Plain-text rendering of queue rows, review details and catalog lists.

use std::fmt::Write;

use reviewdesk_core::listing::Page;
use reviewdesk_core::types::{review_type_label, Area, Block, ReviewDetail, ReviewItem};
use reviewdesk_gateway::types::DashboardOverview;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

pub fn item_row(item: &ReviewItem, selected: bool) -> String {
    format!(
        "{} {:<12} {:<9} {:<8} {:<22} {:<16} {} ({})",
        if selected { ">" } else { " " },
        item.id.as_str(),
        item.status.badge(),
        item.priority.as_str(),
        review_type_label(&item.review_type),
        item.created_at.format(TIME_FORMAT),
        item.full_address,
        item.created_by_user_name,
    )
}

pub fn page(page: &Page<ReviewItem>) -> String {
    let mut out = String::new();
    for item in &page.items {
        let _ = writeln!(out, "{}", item_row(item, false));
    }
    if page.items.is_empty() {
        out.push_str("No reviews found.\n");
    }
    let _ = write!(
        out,
        "Page {} of {} ({} reviews)",
        page.page,
        page.total_pages.max(1),
        page.total_items
    );
    out
}

pub fn detail(detail: &ReviewDetail) -> String {
    let site = &detail.site;
    let mut out = String::new();
    let _ = writeln!(out, "Review {} [{}]", detail.id, detail.status.badge());
    let _ = writeln!(out, "  Address:    {}", detail.full_address);
    let _ = writeln!(out, "  Priority:   {}", detail.priority);
    let _ = writeln!(
        out,
        "  Submitted:  {} by {} ({})",
        detail.created_at.format(TIME_FORMAT),
        detail.created_by_user_name,
        detail.created_by_user_type
    );
    if let Some(consumer_no) = &detail.created_by_consumer_no {
        let _ = writeln!(out, "  Consumer:   {consumer_no}");
    }
    let _ = writeln!(out, "  Site:       {}", detail.site_id);
    let _ = writeln!(out, "  Area:       {} ({})", site.area_name, site.area_id);
    let _ = writeln!(out, "  Block:      {} ({})", site.block_name, site.block_id);
    let location = [
        site.house_no.as_deref(),
        site.street.as_deref(),
        site.nearest_landmark.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(", ");
    if !location.is_empty() {
        let _ = writeln!(out, "  Location:   {location}");
    }
    if let (Some(lat), Some(lng)) = (site.pin_lat, site.pin_lng) {
        let _ = writeln!(out, "  Pin:        {lat:.5}, {lng:.5}");
    }
    let _ = write!(out, "  Documents:  {}", detail.documents.len());
    out
}

pub fn areas(areas: &[Area]) -> String {
    areas
        .iter()
        .map(|a| format!("{:>6}  {}", a.id, a.name))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn blocks(blocks: &[Block]) -> String {
    blocks
        .iter()
        .map(|b| format!("{:>6}  {}", b.id, b.name))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn overview(overview: &DashboardOverview) -> String {
    overview
        .0
        .iter()
        .map(|(name, value)| match value {
            serde_json::Value::String(s) => format!("{name}: {s}"),
            other => format!("{name}: {other}"),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
