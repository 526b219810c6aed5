//! Pure loan state machine.
//!
//! `transition` is the only place that knows which status changes are legal
//! and which stock side effect each one carries. It never touches storage;
//! the orchestrator in `services.rs` applies the returned [`StockEffect`]
//! atomically with the status write.

use std::fmt;

use crate::error::ApiError;
use crate::loans::repo::LoanStatus;

/// Actions that can be applied to an existing loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoanAction {
    Approve,
    Reject,
    Hold,
    Return,
}

impl fmt::Display for LoanAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoanAction::Approve => write!(f, "approve"),
            LoanAction::Reject => write!(f, "reject"),
            LoanAction::Hold => write!(f, "hold"),
            LoanAction::Return => write!(f, "return"),
        }
    }
}

/// Stock adjustment a transition requires on the loan's book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockEffect {
    None,
    /// Decrement `available_quantity` by one.
    Reserve,
    /// Increment `available_quantity` by one.
    Release,
}

/// Computes the next status for `action`, or rejects it.
///
/// Legal transitions:
/// pending → approved (reserve a copy), pending → rejected,
/// pending → on-hold (admin extension point), approved → returned
/// (release the copy). `rejected`, `returned` and `on-hold` are terminal.
pub fn transition(status: LoanStatus, action: LoanAction) -> Result<(LoanStatus, StockEffect), ApiError> {
    match (status, action) {
        (LoanStatus::Pending, LoanAction::Approve) => Ok((LoanStatus::Approved, StockEffect::Reserve)),
        (LoanStatus::Pending, LoanAction::Reject) => Ok((LoanStatus::Rejected, StockEffect::None)),
        (LoanStatus::Pending, LoanAction::Hold) => Ok((LoanStatus::OnHold, StockEffect::None)),
        (LoanStatus::Approved, LoanAction::Return) => Ok((LoanStatus::Returned, StockEffect::Release)),
        (status, action) => Err(ApiError::InvalidTransition { status, action }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approving_a_pending_loan_reserves_a_copy() {
        let (next, effect) = transition(LoanStatus::Pending, LoanAction::Approve).unwrap();
        assert_eq!(next, LoanStatus::Approved);
        assert_eq!(effect, StockEffect::Reserve);
    }

    #[test]
    fn rejecting_a_pending_loan_leaves_stock_alone() {
        let (next, effect) = transition(LoanStatus::Pending, LoanAction::Reject).unwrap();
        assert_eq!(next, LoanStatus::Rejected);
        assert_eq!(effect, StockEffect::None);
    }

    #[test]
    fn holding_a_pending_loan_leaves_stock_alone() {
        let (next, effect) = transition(LoanStatus::Pending, LoanAction::Hold).unwrap();
        assert_eq!(next, LoanStatus::OnHold);
        assert_eq!(effect, StockEffect::None);
    }

    #[test]
    fn returning_an_approved_loan_releases_the_copy() {
        let (next, effect) = transition(LoanStatus::Approved, LoanAction::Return).unwrap();
        assert_eq!(next, LoanStatus::Returned);
        assert_eq!(effect, StockEffect::Release);
    }

    #[test]
    fn every_other_pair_is_rejected() {
        let statuses = [
            LoanStatus::Pending,
            LoanStatus::Approved,
            LoanStatus::Rejected,
            LoanStatus::Returned,
            LoanStatus::OnHold,
        ];
        let actions = [
            LoanAction::Approve,
            LoanAction::Reject,
            LoanAction::Hold,
            LoanAction::Return,
        ];
        let legal = [
            (LoanStatus::Pending, LoanAction::Approve),
            (LoanStatus::Pending, LoanAction::Reject),
            (LoanStatus::Pending, LoanAction::Hold),
            (LoanStatus::Approved, LoanAction::Return),
        ];

        for status in statuses {
            for action in actions {
                if legal.contains(&(status, action)) {
                    continue;
                }
                match transition(status, action) {
                    Err(ApiError::InvalidTransition {
                        status: s,
                        action: a,
                    }) => {
                        assert_eq!(s, status);
                        assert_eq!(a, action);
                    }
                    other => panic!("expected InvalidTransition for ({status:?}, {action:?}), got {other:?}"),
                }
            }
        }
    }

    #[test]
    fn error_message_names_status_and_action() {
        let err = transition(LoanStatus::Returned, LoanAction::Return).unwrap_err();
        assert_eq!(err.to_string(), "Cannot return a loan that is returned");
    }
}
