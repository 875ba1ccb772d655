//! One-shot subcommands talking to the gateway directly.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::Args;

use reviewdesk_core::approval::{Decision, Outcome, REJECTION_REASONS};
use reviewdesk_core::listing::{self, ListQuery, SortDirection, SortKey, DEFAULT_PAGE_SIZE};
use reviewdesk_core::time_range::TimeRange;
use reviewdesk_core::types::{AreaId, ReviewId};
use reviewdesk_gateway::types::QueueFilter;
use reviewdesk_gateway::{GatewayClient, ReviewGateway};

use crate::render;

#[derive(Debug, Args)]
pub struct QueueArgs {
    /// Time range: daily, yesterday, weekly, monthly or START..END
    #[arg(long)]
    pub range: Option<TimeRange>,

    /// Case-insensitive search over address, creator and review type
    #[arg(long)]
    pub search: Option<String>,

    /// Sort column: createdAt, priority, address or creator
    #[arg(long)]
    pub sort: Option<SortKey>,

    /// Sort descending
    #[arg(long, requires = "sort")]
    pub desc: bool,

    /// Include approved and rejected items
    #[arg(long)]
    pub all: bool,

    #[arg(long, default_value_t = 1)]
    pub page: usize,

    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: usize,
}

impl QueueArgs {
    pub fn list_query(&self) -> ListQuery {
        let direction = if self.desc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        ListQuery {
            open_only: !self.all,
            statuses: Vec::new(),
            search: self.search.clone(),
            sort: self.sort.map(|key| (key, direction)),
            page: self.page,
            page_size: self.page_size,
        }
    }
}

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Pending-reviews filter for an optional time range, resolved against `today`.
pub fn queue_filter(range: Option<TimeRange>, today: NaiveDate) -> QueueFilter {
    QueueFilter {
        dates: range.map(|r| r.resolve(today)),
        ..QueueFilter::default()
    }
}

/// Free-text reason, or the preset with the given 1-based number.
pub fn rejection_reason(reason: Option<&str>, preset: Option<usize>) -> Result<String> {
    match (reason, preset) {
        (Some(reason), _) => Ok(reason.to_string()),
        (None, Some(n)) => REJECTION_REASONS
            .get(n.wrapping_sub(1))
            .map(|r| r.to_string())
            .with_context(|| {
                format!("Preset must be between 1 and {}", REJECTION_REASONS.len())
            }),
        (None, None) => bail!("Please provide a reason for rejection"),
    }
}

pub fn require_login(client: &GatewayClient) -> Result<()> {
    if !client.session().is_authenticated() {
        bail!("Not logged in. Run `reviewdesk login` first.");
    }
    Ok(())
}

pub async fn login(client: &GatewayClient, username: &str, password: &str) -> Result<()> {
    let data = client.login(username, password).await?;
    println!("Logged in as {} ({})", data.employee.full_name, data.role);
    Ok(())
}

pub async fn logout(client: &GatewayClient) {
    client.logout().await;
    println!("Logged out");
}

pub fn whoami(client: &GatewayClient) {
    match client.session().get() {
        Some(session) => println!(
            "{} <{}> {} [{}]",
            session.user.full_name, session.user.email, session.user.role, session.user.status
        ),
        None => println!("Not logged in"),
    }
}

pub async fn queue(client: &GatewayClient, args: &QueueArgs) -> Result<()> {
    require_login(client)?;
    let items = client
        .pending_reviews(&queue_filter(args.range, today()))
        .await?;
    let page = listing::apply(&items, &args.list_query());
    println!("{}", render::page(&page));
    Ok(())
}

pub async fn show(client: &GatewayClient, id: &str) -> Result<()> {
    require_login(client)?;
    let detail = client.review_detail(&ReviewId::from(id)).await?;
    println!("{}", render::detail(&detail));
    Ok(())
}

pub async fn decide(
    client: &GatewayClient,
    id: &str,
    outcome: Outcome,
    reason: Option<&str>,
) -> Result<()> {
    require_login(client)?;
    let decision = Decision::new(outcome, reason)?;
    let receipt = client
        .submit_decision(&ReviewId::from(id), &decision)
        .await?;
    println!("Review {id} {}", receipt.status.badge());
    Ok(())
}

pub fn reasons() {
    for (i, reason) in REJECTION_REASONS.iter().enumerate() {
        println!("{:>2}. {reason}", i + 1);
    }
}

pub async fn areas(client: &GatewayClient) -> Result<()> {
    require_login(client)?;
    println!("{}", render::areas(&client.areas().await?));
    Ok(())
}

pub async fn blocks(client: &GatewayClient, area_id: AreaId) -> Result<()> {
    require_login(client)?;
    println!("{}", render::blocks(&client.blocks(area_id).await?));
    Ok(())
}

pub async fn overview(client: &GatewayClient, range: &TimeRange) -> Result<()> {
    require_login(client)?;
    let overview = client.overview(range).await?;
    println!("{}", range.label());
    println!("{}", render::overview(&overview));
    Ok(())
}
