//! Booking lifecycle state machine.
//!
//! Stored status values: pending, confirmed, arriving, arrived, completed,
//! cancelled. Forward moves may skip ahead along the chain but never go
//! backwards; `completed` and `cancelled` are terminal. Cancellation is only
//! reachable before the provider has arrived.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Arriving,
    Arrived,
    Completed,
    Cancelled,
}

/// Statuses shown in the customer's "current" bookings list.
pub const CURRENT_STATUSES: [&str; 4] = ["pending", "confirmed", "arriving", "arrived"];
/// Statuses shown in the customer's "past" bookings list.
pub const PAST_STATUSES: [&str; 2] = ["completed", "cancelled"];

impl BookingStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Arriving => "arriving",
            BookingStatus::Arrived => "arrived",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(BookingStatus::Pending),
            "confirmed" => Some(BookingStatus::Confirmed),
            "arriving" => Some(BookingStatus::Arriving),
            "arrived" => Some(BookingStatus::Arrived),
            "completed" => Some(BookingStatus::Completed),
            "cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }

    /// Position along the forward chain; `cancelled` sits outside it.
    fn rank(self) -> Option<u8> {
        match self {
            BookingStatus::Pending => Some(0),
            BookingStatus::Confirmed => Some(1),
            BookingStatus::Arriving => Some(2),
            BookingStatus::Arrived => Some(3),
            BookingStatus::Completed => Some(4),
            BookingStatus::Cancelled => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }

    /// Cancellation window: before the provider has arrived.
    pub fn is_cancellable(self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed | BookingStatus::Arriving)
    }

    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        if self.is_terminal() || next == self {
            return false;
        }
        if next == BookingStatus::Cancelled {
            return self.is_cancellable();
        }
        match (self.rank(), next.rank()) {
            (Some(from), Some(to)) => to > from,
            _ => false,
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::BookingStatus::*;
    use super::*;

    const ALL: [BookingStatus; 6] = [Pending, Confirmed, Arriving, Arrived, Completed, Cancelled];

    #[test]
    fn round_trips_through_strings() {
        for s in ALL {
            assert_eq!(BookingStatus::parse(s.as_str()), Some(s));
        }
        assert_eq!(BookingStatus::parse(" Confirmed "), Some(Confirmed));
        assert_eq!(BookingStatus::parse("rejected"), None);
        assert_eq!(BookingStatus::parse(""), None);
    }

    #[test]
    fn forward_chain_is_ordered() {
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Confirmed.can_transition_to(Arriving));
        assert!(Arriving.can_transition_to(Arrived));
        assert!(Arrived.can_transition_to(Completed));
    }

    #[test]
    fn skipping_ahead_is_allowed() {
        assert!(Pending.can_transition_to(Completed));
        assert!(Confirmed.can_transition_to(Arrived));
    }

    #[test]
    fn backwards_moves_are_rejected() {
        assert!(!Confirmed.can_transition_to(Pending));
        assert!(!Arrived.can_transition_to(Arriving));
        assert!(!Completed.can_transition_to(Pending));
    }

    #[test]
    fn cancellation_window() {
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Cancelled));
        assert!(Arriving.can_transition_to(Cancelled));
        assert!(!Arrived.can_transition_to(Cancelled));
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Cancelled));
    }

    #[test]
    fn terminal_states_reject_everything() {
        for next in ALL {
            assert!(!Completed.can_transition_to(next), "completed -> {next}");
            assert!(!Cancelled.can_transition_to(next), "cancelled -> {next}");
        }
    }

    #[test]
    fn self_transition_is_rejected() {
        for s in ALL {
            assert!(!s.can_transition_to(s), "{s} -> {s}");
        }
    }

    #[test]
    fn cancelled_never_reenters_the_chain() {
        for next in [Pending, Confirmed, Arriving, Arrived, Completed] {
            assert!(!Cancelled.can_transition_to(next));
        }
    }
}
