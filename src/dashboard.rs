//! Dashboard read model derived from the state tree.
//!
//! [`DashboardView`] is what the dashboard, sidebar, and header render. It is
//! rebuilt from scratch on every broadcast; see [`DashboardView::attach`].

use std::sync::{Arc, Mutex, PoisonError};

use crate::model::{AppState, Role};
use crate::store::StateStore;
use crate::subscription::SubscriptionId;

/// How many notifications the dashboard lists.
pub const RECENT_NOTIFICATIONS: usize = 3;

/// Progress above which a project is shown as nearly done.
const NEARLY_DONE_THRESHOLD: u8 = 80;

/// The call-to-action shown in the header and welcome banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryAction {
    /// Performers are sent to the marketplace.
    FindWork,
    /// Customers are sent to the project wizard.
    CreateProject,
}

impl PrimaryAction {
    /// The action offered to a user acting as `role`.
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Performer => Self::FindWork,
            Role::Customer => Self::CreateProject,
        }
    }

    /// Button caption.
    pub fn label(self) -> &'static str {
        match self {
            Self::FindWork => "Find work",
            Self::CreateProject => "Create project",
        }
    }

    /// Page the action navigates to.
    pub fn target(self) -> &'static str {
        match self {
            Self::FindWork => "marketplace.html",
            Self::CreateProject => "create-project.html",
        }
    }
}

/// One line of the dashboard's recent-notifications card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRow {
    pub title: String,
    /// Display time, copied verbatim.
    pub time: String,
    /// Unread rows are highlighted.
    pub read: bool,
}

/// One active project with its progress bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRow {
    pub name: String,
    /// Client display name.
    pub client: String,
    pub deadline: String,
    /// Percentage in `0..=100`.
    pub progress: u8,
    /// Progress is above 80%; the bar switches to the success colour.
    pub nearly_done: bool,
}

/// Everything the dashboard shows, precomputed from one [`AppState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardView {
    /// First word of the user's name, for the welcome banner.
    pub first_name: String,
    /// Full name shown in the sidebar profile.
    pub user_name: String,
    pub user_status: String,
    pub role: Role,
    /// Human label for `role`, e.g. `"Performer"`.
    pub role_label: &'static str,
    /// Balance with currency symbol, e.g. `"$14,500.5"`.
    pub balance: String,
    /// At most [`RECENT_NOTIFICATIONS`], newest first.
    pub recent_notifications: Vec<NotificationRow>,
    /// Unread count across all notifications, not just the listed ones.
    pub unread_notifications: usize,
    pub projects: Vec<ProjectRow>,
    pub primary_action: PrimaryAction,
    /// The "find performers" navigation entry is hidden for performers.
    pub show_performer_search: bool,
}

impl DashboardView {
    /// Derive the view from one state snapshot.
    pub fn from_state(state: &AppState) -> Self {
        let user = &state.user;
        let first_name = user
            .name
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_owned();

        Self {
            first_name,
            user_name: user.name.clone(),
            user_status: user.status.clone(),
            role: user.role,
            role_label: role_label(user.role),
            balance: format!(
                "{}{}",
                state.wallet.currency,
                format_amount(state.wallet.balance)
            ),
            recent_notifications: state
                .notifications
                .iter()
                .take(RECENT_NOTIFICATIONS)
                .map(|n| NotificationRow {
                    title: n.title.clone(),
                    time: n.time.clone(),
                    read: n.read,
                })
                .collect(),
            unread_notifications: state.unread_notifications(),
            projects: state
                .active_projects
                .iter()
                .map(|p| ProjectRow {
                    name: p.name.clone(),
                    client: p.client.clone(),
                    deadline: p.deadline.clone(),
                    progress: p.progress,
                    nearly_done: p.progress > NEARLY_DONE_THRESHOLD,
                })
                .collect(),
            primary_action: PrimaryAction::for_role(user.role),
            show_performer_search: user.role == Role::Customer,
        }
    }

    /// Keep a view in sync with `store`.
    ///
    /// Builds the view from the current state, then subscribes so it is
    /// rebuilt after every broadcast. Unsubscribe with the returned id when
    /// the view is torn down.
    pub fn attach(store: &StateStore) -> (SubscriptionId, Arc<Mutex<Self>>) {
        let view = Arc::new(Mutex::new(store.read(Self::from_state)));
        let sink = Arc::clone(&view);
        let id = store.subscribe(move |state| {
            *sink.lock().unwrap_or_else(PoisonError::into_inner) = Self::from_state(state);
        });
        (id, view)
    }
}

fn role_label(role: Role) -> &'static str {
    match role {
        Role::Performer => "Performer",
        Role::Customer => "Customer",
    }
}

/// Format an amount with thousands separators and up to three decimals.
///
/// `14500.5` becomes `"14,500.5"`, `1200.0` becomes `"1,200"`.
pub fn format_amount(amount: f64) -> String {
    let fixed = format!("{:.3}", amount.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let is_zero = grouped == "0" && frac_part.is_empty();
    let mut out = String::new();
    if amount.is_sign_negative() && !is_zero {
        out.push('-');
    }
    out.push_str(&grouped);
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}
