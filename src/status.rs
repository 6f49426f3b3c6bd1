//! Invoice status resolution.
//!
//! Status is never stored: [`resolve`] derives it from the ledger, the due date and
//! the lifecycle markers every time it is asked. The [`DueDateBadge`] is a separate
//! decoration computed from the due date alone, the way the portal shows a
//! "3 days overdue" sub-label next to the status.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    entities::invoice::Invoice,
    error::{Error, Result},
    ledger,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Not yet finalized; line items and terms may still change.
    Draft,
    /// Finalized, nothing paid, not past due.
    Pending,
    /// Partly paid, not past due.
    Partial,
    /// Remaining balance is exactly zero. Terminal.
    Paid,
    /// Not fully paid and past the due date.
    Overdue,
    /// Portal label for an invoice awaiting payment. Never produced by [`resolve`];
    /// filters treat it as an alias of `Pending`.
    Unpaid,
    /// Superseded by a replacement invoice. Terminal.
    Closed,
}

impl InvoiceStatus {
    pub const ALL: [InvoiceStatus; 7] = [
        InvoiceStatus::Draft,
        InvoiceStatus::Pending,
        InvoiceStatus::Partial,
        InvoiceStatus::Paid,
        InvoiceStatus::Overdue,
        InvoiceStatus::Unpaid,
        InvoiceStatus::Closed,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Partial => "partial",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Overdue => "overdue",
            InvoiceStatus::Unpaid => "unpaid",
            InvoiceStatus::Closed => "closed",
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, InvoiceStatus::Paid | InvoiceStatus::Closed)
    }

    /// Whether a resolved status satisfies this one as a filter label.
    #[must_use]
    pub fn matches(&self, resolved: InvoiceStatus) -> bool {
        match self {
            InvoiceStatus::Unpaid => matches!(resolved, InvoiceStatus::Pending | InvoiceStatus::Unpaid),
            label => *label == resolved,
        }
    }

    /// Whether an invoice can move from `self` to `next`.
    ///
    /// Paid amounts only grow and dates only advance, so an invoice never returns to
    /// `Pending` once paid in part. Only an invoice with no payments can be closed.
    #[must_use]
    pub fn can_transition_to(&self, next: InvoiceStatus) -> bool {
        use InvoiceStatus::{Closed, Draft, Overdue, Paid, Partial, Pending};

        match (self, next) {
            (Draft, Pending | Partial | Paid | Overdue | Closed)
            | (Pending, Partial | Paid | Overdue | Closed)
            | (Partial, Paid | Overdue)
            | (Overdue, Paid | Closed) => true,
            _ => false,
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == needle)
            .ok_or_else(|| Error::invalid_input(format!("unknown invoice status {s:?}")))
    }
}

/// Resolve the status of `invoice` as of `today`.
#[must_use]
pub fn resolve(invoice: &Invoice, today: Date) -> InvoiceStatus {
    resolve_parts(
        invoice.is_finalized(),
        invoice.is_closed(),
        ledger::remaining_balance(invoice),
        ledger::paid_amount(invoice),
        invoice.due_date(),
        today,
    )
}

/// The status function itself, over the raw facts it depends on.
#[must_use]
pub fn resolve_parts(
    finalized: bool,
    closed: bool,
    remaining_balance: Decimal,
    paid_amount: Decimal,
    due_date: Date,
    today: Date,
) -> InvoiceStatus {
    if closed {
        InvoiceStatus::Closed
    } else if !finalized {
        InvoiceStatus::Draft
    } else if remaining_balance.is_zero() {
        InvoiceStatus::Paid
    } else if today > due_date {
        InvoiceStatus::Overdue
    } else if paid_amount > Decimal::ZERO {
        InvoiceStatus::Partial
    } else {
        InvoiceStatus::Pending
    }
}

/// Due-date decoration shown beside the status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DueDateBadge {
    /// Nothing left to pay.
    Settled,
    Overdue { days: i64 },
    DueToday,
    /// Due within the configured due-soon window.
    DueSoon { days: i64 },
    Upcoming { days: i64 },
}

impl DueDateBadge {
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            DueDateBadge::Settled => "Settled".to_string(),
            DueDateBadge::Overdue { days: 1 } => "1 day overdue".to_string(),
            DueDateBadge::Overdue { days } => format!("{days} days overdue"),
            DueDateBadge::DueToday => "Due today".to_string(),
            DueDateBadge::DueSoon { days: 1 } | DueDateBadge::Upcoming { days: 1 } => {
                "Due in 1 day".to_string()
            }
            DueDateBadge::DueSoon { days } | DueDateBadge::Upcoming { days } => {
                format!("Due in {days} days")
            }
        }
    }

    #[must_use]
    pub fn is_urgent(&self) -> bool {
        matches!(
            self,
            DueDateBadge::Overdue { .. } | DueDateBadge::DueToday | DueDateBadge::DueSoon { .. }
        )
    }
}

/// Due-date badge of `invoice` as of `today`; `None` for drafts and closed invoices.
#[must_use]
pub fn due_date_badge(invoice: &Invoice, today: Date, due_soon_days: i64) -> Option<DueDateBadge> {
    if !invoice.is_finalized() || invoice.is_closed() {
        return None;
    }
    if ledger::remaining_balance(invoice).is_zero() {
        return Some(DueDateBadge::Settled);
    }

    let days_until_due = (invoice.due_date() - today).whole_days();
    let badge = if days_until_due < 0 {
        DueDateBadge::Overdue {
            days: -days_until_due,
        }
    } else if days_until_due == 0 {
        DueDateBadge::DueToday
    } else if days_until_due <= due_soon_days {
        DueDateBadge::DueSoon {
            days: days_until_due,
        }
    } else {
        DueDateBadge::Upcoming {
            days: days_until_due,
        }
    };
    Some(badge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use time::macros::date;

    const DUE: Date = date!(2024 - 02 - 14);

    #[test]
    fn resolves_each_state() {
        let before = date!(2024 - 02 - 01);
        let after = date!(2024 - 02 - 20);

        assert_eq!(
            resolve_parts(false, false, dec!(100), dec!(0), DUE, before),
            InvoiceStatus::Draft
        );
        assert_eq!(
            resolve_parts(true, false, dec!(100), dec!(0), DUE, before),
            InvoiceStatus::Pending
        );
        assert_eq!(
            resolve_parts(true, false, dec!(60), dec!(40), DUE, before),
            InvoiceStatus::Partial
        );
        assert_eq!(
            resolve_parts(true, false, dec!(0), dec!(100), DUE, after),
            InvoiceStatus::Paid
        );
        assert_eq!(
            resolve_parts(true, false, dec!(100), dec!(0), DUE, after),
            InvoiceStatus::Overdue
        );
        assert_eq!(
            resolve_parts(true, false, dec!(60), dec!(40), DUE, after),
            InvoiceStatus::Overdue
        );
        assert_eq!(
            resolve_parts(true, true, dec!(100), dec!(0), DUE, before),
            InvoiceStatus::Closed
        );
    }

    #[test]
    fn due_date_itself_is_not_overdue() {
        assert_eq!(
            resolve_parts(true, false, dec!(60), dec!(40), DUE, DUE),
            InvoiceStatus::Partial
        );
    }

    #[test]
    fn paid_is_terminal_and_transitions_are_monotonic() {
        for next in InvoiceStatus::ALL {
            assert!(!InvoiceStatus::Paid.can_transition_to(next));
        }
        assert!(InvoiceStatus::Pending.can_transition_to(InvoiceStatus::Partial));
        assert!(InvoiceStatus::Partial.can_transition_to(InvoiceStatus::Overdue));
        assert!(!InvoiceStatus::Partial.can_transition_to(InvoiceStatus::Pending));
        assert!(!InvoiceStatus::Overdue.can_transition_to(InvoiceStatus::Partial));
    }

    #[test]
    fn unpaid_label_matches_pending() {
        assert!(InvoiceStatus::Unpaid.matches(InvoiceStatus::Pending));
        assert!(!InvoiceStatus::Unpaid.matches(InvoiceStatus::Partial));
        assert!(InvoiceStatus::Overdue.matches(InvoiceStatus::Overdue));
    }

    #[test]
    fn parses_labels() {
        assert_eq!("Overdue".parse::<InvoiceStatus>().ok(), Some(InvoiceStatus::Overdue));
        assert!("late".parse::<InvoiceStatus>().is_err());
    }

    #[test]
    fn badge_labels() {
        assert_eq!(DueDateBadge::Overdue { days: 3 }.label(), "3 days overdue");
        assert_eq!(DueDateBadge::Overdue { days: 1 }.label(), "1 day overdue");
        assert_eq!(DueDateBadge::DueSoon { days: 5 }.label(), "Due in 5 days");
        assert!(!DueDateBadge::Upcoming { days: 20 }.is_urgent());
    }
}
