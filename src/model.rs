//! The application state tree and its compiled-in default snapshot.
//!
//! Field names serialize in camelCase so that dotted paths such as
//! `"user.stats.trustQuotient"` or `"activeProjects.0.progress"` address the
//! same slots the marketplace front end has always written.

use serde::{Deserialize, Serialize};

use crate::error::StateError;

/// Upper bound of the percentage fields (`trustQuotient`, `progress`).
pub const MAX_PERCENT: u8 = 100;

/// Root of the persisted state. Every read and write goes through it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub user: User,
    pub wallet: Wallet,
    /// Newest first.
    pub notifications: Vec<Notification>,
    pub messages: Messages,
    pub active_projects: Vec<ActiveProject>,
}

/// Which side of the marketplace the user is currently acting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Posts projects and hires performers.
    Customer,
    /// Finds work and responds to projects.
    Performer,
}

impl Role {
    /// The wire name of the role (`"customer"` / `"performer"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Performer => "performer",
        }
    }
}

/// The signed-in user's profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Opaque user id.
    pub id: String,
    /// Full display name.
    pub name: String,
    pub role: Role,
    /// Free-form membership label, e.g. `"Pro Member"`.
    pub status: String,
    /// Image URL or a symbolic style id such as `"neon-glow-blue"`.
    pub avatar: String,
    pub stats: UserStats,
}

/// Reputation figures shown on the profile card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    /// Average review score.
    pub rating: f64,
    pub completed_projects: u32,
    /// Percentage in `0..=100`.
    pub trust_quotient: u8,
}

/// The user's balance and payment history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    /// Current balance in `currency`. May go negative after outgoing
    /// payments.
    pub balance: f64,
    /// Display symbol, e.g. `"$"`.
    pub currency: String,
    /// Newest first.
    pub transactions: Vec<Transaction>,
}

/// Direction of money movement relative to the user's wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money credited to the wallet.
    Incoming,
    /// Money debited from the wallet.
    Outgoing,
}

/// One wallet movement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Unique id, `tx_` prefixed.
    pub id: String,
    /// Serialized as `"type"`.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Always non-negative; the direction lives in `kind`.
    pub amount: f64,
    /// What the payment was for.
    pub label: String,
    /// ISO `YYYY-MM-DD` date.
    pub date: String,
}

/// An entry in the notification centre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Unique id, `nt_` prefixed.
    pub id: String,
    pub title: String,
    /// Body text.
    pub text: String,
    /// Human display string ("5 min ago"), not a machine timestamp.
    pub time: String,
    /// Whether the user has seen it.
    pub read: bool,
}

/// Inbox summary shown in the sidebar badge and chat list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Messages {
    /// Unread messages across all chats.
    pub unread_count: u32,
    /// Most recent conversation first.
    pub chats: Vec<ChatSummary>,
}

/// Preview row for one conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSummary {
    pub id: String,
    /// Display name of the other participant.
    pub user: String,
    pub avatar: String,
    /// Preview of the newest message.
    pub last_message: String,
    /// Display time of the newest message, e.g. `"14:20"`.
    pub time: String,
    /// Whether the other participant is online.
    pub online: bool,
}

/// A project the user is currently working on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveProject {
    pub id: String,
    pub name: String,
    /// Client display name.
    pub client: String,
    /// Display string, not parsed.
    pub deadline: String,
    /// Percentage in `0..=100`.
    pub progress: u8,
}

impl AppState {
    /// Build the compiled-in default snapshot.
    ///
    /// Each call constructs a brand new tree, so resetting the store can
    /// never hand out a value that aliases an earlier one.
    pub fn initial() -> Self {
        Self {
            user: User {
                id: "user_001".into(),
                name: "Alex Design".into(),
                role: Role::Performer,
                status: "Pro Member".into(),
                avatar: "neon-glow-blue".into(),
                stats: UserStats {
                    rating: 4.9,
                    completed_projects: 45,
                    trust_quotient: 98,
                },
            },
            wallet: Wallet {
                balance: 14500.50,
                currency: "$".into(),
                transactions: vec![
                    Transaction {
                        id: "tx_001".into(),
                        kind: TransactionKind::Incoming,
                        amount: 3500.0,
                        label: "UI/UX Dashboard redesign".into(),
                        date: "2025-12-18".into(),
                    },
                    Transaction {
                        id: "tx_002".into(),
                        kind: TransactionKind::Incoming,
                        amount: 1200.0,
                        label: "CryptoApp landing page".into(),
                        date: "2025-12-15".into(),
                    },
                    Transaction {
                        id: "tx_003".into(),
                        kind: TransactionKind::Outgoing,
                        amount: 150.0,
                        label: "Pro Member subscription".into(),
                        date: "2025-12-01".into(),
                    },
                ],
            },
            notifications: vec![
                Notification {
                    id: "nt_001".into(),
                    title: "New message".into(),
                    text: "Sarah Connor sent you a file".into(),
                    time: "5 min ago".into(),
                    read: false,
                },
                Notification {
                    id: "nt_002".into(),
                    title: "Payment received".into(),
                    text: "$3,500 credited for the \"Dashboard\" project".into(),
                    time: "2 hours ago".into(),
                    read: true,
                },
            ],
            messages: Messages {
                unread_count: 3,
                chats: vec![
                    ChatSummary {
                        id: "chat_001".into(),
                        user: "Sarah Connor".into(),
                        avatar: "https://images.unsplash.com/photo-1494790108377-be9c29b29330?w=100"
                            .into(),
                        last_message: "Ok, waiting for the prototypes".into(),
                        time: "14:20".into(),
                        online: true,
                    },
                    ChatSummary {
                        id: "chat_002".into(),
                        user: "John Doe".into(),
                        avatar: "https://images.unsplash.com/photo-1500648767791-00dcc994a43e?w=100"
                            .into(),
                        last_message: "When will it be ready?".into(),
                        time: "Yesterday".into(),
                        online: false,
                    },
                ],
            },
            active_projects: vec![ActiveProject {
                id: "prj_001".into(),
                name: "UI/UX Dashboard redesign".into(),
                client: "TechSolutions".into(),
                deadline: "2025-12-30".into(),
                progress: 65,
            }],
        }
    }

    /// Check the range constraints the types alone cannot express.
    ///
    /// `trustQuotient` and every `progress` must be at most
    /// [`MAX_PERCENT`]; every transaction amount and the balance must be
    /// finite, and amounts must be non-negative.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::InvalidValue`] naming the first offending path.
    pub fn validate(&self) -> Result<(), StateError> {
        let trust = self.user.stats.trust_quotient;
        if trust > MAX_PERCENT {
            return Err(StateError::invalid_value(
                "user.stats.trustQuotient",
                format!("must be at most {MAX_PERCENT}, got {trust}"),
            ));
        }

        if !self.wallet.balance.is_finite() {
            return Err(StateError::invalid_value(
                "wallet.balance",
                format!("must be finite, got {}", self.wallet.balance),
            ));
        }

        for (i, tx) in self.wallet.transactions.iter().enumerate() {
            if !tx.amount.is_finite() || tx.amount < 0.0 {
                return Err(StateError::invalid_value(
                    format!("wallet.transactions.{i}.amount"),
                    format!("must be a non-negative number, got {}", tx.amount),
                ));
            }
        }

        for (i, project) in self.active_projects.iter().enumerate() {
            if project.progress > MAX_PERCENT {
                return Err(StateError::invalid_value(
                    format!("activeProjects.{i}.progress"),
                    format!("must be at most {MAX_PERCENT}, got {}", project.progress),
                ));
            }
        }

        Ok(())
    }

    /// Number of notifications not yet marked read.
    pub fn unread_notifications(&self) -> usize {
        self.notifications.iter().filter(|n| !n.read).count()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::initial()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn initial_snapshot_matches_seed_values() {
        let state = AppState::initial();
        assert_eq!(state.user.name, "Alex Design");
        assert_eq!(state.user.role, Role::Performer);
        assert_eq!(state.wallet.balance, 14500.50);
        assert_eq!(state.wallet.transactions.len(), 3);
        assert_eq!(state.notifications.len(), 2);
        assert_eq!(state.messages.chats.len(), 2);
        assert_eq!(state.active_projects[0].progress, 65);
    }

    #[test]
    fn initial_calls_are_independent() {
        let mut first = AppState::initial();
        first.user.name = "Changed".into();
        first.wallet.transactions.clear();

        let second = AppState::initial();
        assert_eq!(second.user.name, "Alex Design");
        assert_eq!(second.wallet.transactions.len(), 3);
    }

    #[test]
    fn serializes_with_camel_case_and_lowercase_tags() {
        let value = serde_json::to_value(AppState::initial()).expect("serialize");

        assert_eq!(value["user"]["role"], json!("performer"));
        assert_eq!(value["user"]["stats"]["trustQuotient"], json!(98));
        assert_eq!(value["user"]["stats"]["completedProjects"], json!(45));
        assert_eq!(value["wallet"]["transactions"][2]["type"], json!("outgoing"));
        assert_eq!(value["messages"]["unreadCount"], json!(3));
        assert_eq!(
            value["messages"]["chats"][0]["lastMessage"],
            json!("Ok, waiting for the prototypes")
        );
        assert_eq!(value["activeProjects"][0]["id"], json!("prj_001"));
    }

    #[test]
    fn role_wire_names() {
        assert_eq!(Role::Customer.as_str(), "customer");
        assert_eq!(Role::Performer.as_str(), "performer");
        let parsed: Role = serde_json::from_value(json!("customer")).expect("parse role");
        assert_eq!(parsed, Role::Customer);
        assert!(serde_json::from_value::<Role>(json!("admin")).is_err());
    }

    #[test]
    fn initial_snapshot_is_valid() {
        AppState::initial()
            .validate()
            .expect("defaults must satisfy the range checks");
    }

    #[test]
    fn validate_rejects_out_of_range_percentages() {
        let mut state = AppState::initial();
        state.user.stats.trust_quotient = 101;
        let err = state.validate().expect_err("trust above 100");
        assert!(
            matches!(&err, StateError::InvalidValue { path, .. } if path == "user.stats.trustQuotient"),
            "got: {err}"
        );

        let mut state = AppState::initial();
        state.active_projects[0].progress = 200;
        let err = state.validate().expect_err("progress above 100");
        assert!(
            matches!(&err, StateError::InvalidValue { path, .. } if path == "activeProjects.0.progress"),
            "got: {err}"
        );

        let mut state = AppState::initial();
        state.user.stats.trust_quotient = MAX_PERCENT;
        state.active_projects[0].progress = MAX_PERCENT;
        assert!(state.validate().is_ok(), "100 is inclusive");
    }

    #[test]
    fn validate_rejects_negative_amounts() {
        let mut state = AppState::initial();
        state.wallet.transactions[2].amount = -5.0;
        let err = state.validate().expect_err("negative amount");
        assert!(
            matches!(&err, StateError::InvalidValue { path, .. } if path == "wallet.transactions.2.amount"),
            "got: {err}"
        );

        state.wallet.transactions[2].amount = 0.0;
        assert!(state.validate().is_ok(), "zero is allowed");
    }

    #[test]
    fn unread_notifications_counts_unread_only() {
        let mut state = AppState::initial();
        assert_eq!(state.unread_notifications(), 1);
        state.notifications[0].read = true;
        assert_eq!(state.unread_notifications(), 0);
    }
}
