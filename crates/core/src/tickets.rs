//! Support ticket status/priority vocabulary and transition rules.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Lifecycle status of a support ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl TicketStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "open" => Ok(Self::Open),
            "in_progress" => Ok(Self::InProgress),
            "resolved" => Ok(Self::Resolved),
            "closed" => Ok(Self::Closed),
            other => Err(CoreError::Validation(format!(
                "Unknown ticket status '{other}'"
            ))),
        }
    }
}

/// Triage priority of a support ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketPriority {
    Low,
    Normal,
    High,
}

impl TicketPriority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "low" => Ok(Self::Low),
            "normal" => Ok(Self::Normal),
            "high" => Ok(Self::High),
            other => Err(CoreError::Validation(format!(
                "Unknown ticket priority '{other}'"
            ))),
        }
    }
}

/// Whether a ticket may move from `from` to `to`.
///
/// `closed` is terminal. A `resolved` ticket may be reopened or closed.
/// Otherwise only forward moves are allowed. A no-op move is allowed.
pub fn can_transition(from: TicketStatus, to: TicketStatus) -> bool {
    use TicketStatus::*;
    if from == to {
        return true;
    }
    match from {
        Open => matches!(to, InProgress | Resolved | Closed),
        InProgress => matches!(to, Resolved | Closed),
        Resolved => matches!(to, Open | Closed),
        Closed => false,
    }
}

/// Validate a transition, returning a human-readable error when rejected.
pub fn validate_transition(from: TicketStatus, to: TicketStatus) -> Result<(), CoreError> {
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Cannot move ticket from '{}' to '{}'",
            from.as_str(),
            to.as_str()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_is_terminal() {
        assert!(!can_transition(TicketStatus::Closed, TicketStatus::Open));
        assert!(!can_transition(TicketStatus::Closed, TicketStatus::InProgress));
        assert!(can_transition(TicketStatus::Closed, TicketStatus::Closed));
    }

    #[test]
    fn resolved_can_reopen() {
        assert!(can_transition(TicketStatus::Resolved, TicketStatus::Open));
        assert!(!can_transition(TicketStatus::Resolved, TicketStatus::InProgress));
    }

    #[test]
    fn in_progress_cannot_go_back_to_open() {
        assert!(!can_transition(TicketStatus::InProgress, TicketStatus::Open));
        assert!(validate_transition(TicketStatus::InProgress, TicketStatus::Open).is_err());
    }

    #[test]
    fn parse_round_trips_labels() {
        for status in [
            TicketStatus::Open,
            TicketStatus::InProgress,
            TicketStatus::Resolved,
            TicketStatus::Closed,
        ] {
            assert_eq!(TicketStatus::parse(status.as_str()).unwrap(), status);
        }
        assert!(TicketStatus::parse("pending").is_err());
        assert!(TicketPriority::parse("urgent").is_err());
    }
}
