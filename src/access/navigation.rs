//! Sidebar navigation filtered by role and active business.

use serde::Serialize;

use crate::access::guard::{is_business_admin, is_super_admin};
use crate::types::{BusinessId, Profile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    SuperAdmin,
    BusinessAdmin,
    Staff,
    Viewer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NavCategory {
    Main,
    Ai,
    Financial,
    People,
    Insights,
    Settings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NavTarget {
    Fixed(&'static str),
    /// Path under the active business
    Business(&'static str),
}

struct NavEntry {
    title: &'static str,
    target: NavTarget,
    category: NavCategory,
    audience: &'static [Audience],
}

use Audience::*;

const ALL: &[Audience] = &[SuperAdmin, BusinessAdmin, Staff, Viewer];
const OPERATORS: &[Audience] = &[SuperAdmin, BusinessAdmin, Staff];
const ADMINS: &[Audience] = &[SuperAdmin, BusinessAdmin];

#[rustfmt::skip]
const NAVIGATION: &[NavEntry] = &[
    NavEntry { title: "Business Dashboard", target: NavTarget::Business("dashboard"), category: NavCategory::Main, audience: &[BusinessAdmin] },
    NavEntry { title: "My Dashboard", target: NavTarget::Fixed("/dashboard"), category: NavCategory::Main, audience: &[Staff, Viewer] },
    NavEntry { title: "AI Voice Assistant", target: NavTarget::Fixed("/voice-assistant"), category: NavCategory::Ai, audience: ALL },
    NavEntry { title: "Transactions", target: NavTarget::Fixed("/transactions"), category: NavCategory::Financial, audience: OPERATORS },
    NavEntry { title: "Invoices", target: NavTarget::Fixed("/invoices"), category: NavCategory::Financial, audience: OPERATORS },
    NavEntry { title: "Cash Flow", target: NavTarget::Fixed("/cash-flow"), category: NavCategory::Financial, audience: ADMINS },
    NavEntry { title: "Credit", target: NavTarget::Fixed("/credit"), category: NavCategory::Financial, audience: ADMINS },
    NavEntry { title: "Suppliers", target: NavTarget::Fixed("/suppliers"), category: NavCategory::People, audience: OPERATORS },
    NavEntry { title: "Clients", target: NavTarget::Fixed("/clients"), category: NavCategory::People, audience: OPERATORS },
    NavEntry { title: "AI Insights", target: NavTarget::Fixed("/insights"), category: NavCategory::Insights, audience: ADMINS },
    NavEntry { title: "Proactive Alerts", target: NavTarget::Fixed("/proactive-alerts"), category: NavCategory::Insights, audience: ADMINS },
    NavEntry { title: "Settings", target: NavTarget::Fixed("/settings"), category: NavCategory::Settings, audience: ALL },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub title: &'static str,
    pub path: String,
    pub category: NavCategory,
}

/// Items visible to this profile. Business-scoped items need an active business.
pub fn visible_items(profile: Option<&Profile>, active_business: Option<BusinessId>) -> Vec<NavItem> {
    let super_admin = is_super_admin(profile);
    let business_admin = active_business
        .map(|id| is_business_admin(profile, id))
        .unwrap_or(false);
    let has_memberships = profile
        .map(|p| !p.business_memberships.is_empty())
        .unwrap_or(false);

    NAVIGATION
        .iter()
        .filter(|entry| {
            (super_admin && entry.audience.contains(&SuperAdmin))
                || (business_admin && entry.audience.contains(&BusinessAdmin))
                || (has_memberships && (entry.audience.contains(&Staff) || entry.audience.contains(&Viewer)))
        })
        .filter_map(|entry| {
            let path = match entry.target {
                NavTarget::Fixed(path) => path.to_string(),
                NavTarget::Business(page) => format!("/business/{}/{}", active_business?, page),
            };
            Some(NavItem {
                title: entry.title,
                path,
                category: entry.category,
            })
        })
        .collect()
}
