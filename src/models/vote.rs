use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::ERR_INVALID_VOTE_TYPE;
use crate::error::AppError;

/// Direction of a single vote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteKind {
    Up,
    Down,
}

impl VoteKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VoteKind::Up => "up",
            VoteKind::Down => "down",
        }
    }
}

impl fmt::Display for VoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoteKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(VoteKind::Up),
            "down" => Ok(VoteKind::Down),
            _ => Err(AppError::Validation(ERR_INVALID_VOTE_TYPE.to_string())),
        }
    }
}

/// Vote ledger row stored in redb
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteRecord {
    pub kind: VoteKind,
    /// Last change (Unix milliseconds)
    pub updated_at: i64,
}

/// A user's standing on one post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VoteState {
    #[default]
    NoVote,
    Upvoted,
    Downvoted,
}

/// Change to apply to a post's denormalized counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CounterDelta {
    pub upvotes: i64,
    pub downvotes: i64,
}

impl CounterDelta {
    /// Change in `upvotes + downvotes`
    pub fn total(self) -> i64 {
        self.upvotes + self.downvotes
    }
}

impl VoteState {
    pub fn kind(self) -> Option<VoteKind> {
        match self {
            VoteState::NoVote => None,
            VoteState::Upvoted => Some(VoteKind::Up),
            VoteState::Downvoted => Some(VoteKind::Down),
        }
    }

    /// Resolve a requested vote against the current state.
    ///
    /// Repeating the held kind removes the vote, the opposite kind moves one
    /// unit between the counters, and a first vote adds one unit.
    pub fn transition(self, requested: VoteKind) -> (VoteState, CounterDelta) {
        use VoteKind::{Down, Up};
        use VoteState::{Downvoted, NoVote, Upvoted};

        match (self, requested) {
            (NoVote, Up) => (Upvoted, CounterDelta { upvotes: 1, downvotes: 0 }),
            (NoVote, Down) => (Downvoted, CounterDelta { upvotes: 0, downvotes: 1 }),
            (Upvoted, Up) => (NoVote, CounterDelta { upvotes: -1, downvotes: 0 }),
            (Downvoted, Down) => (NoVote, CounterDelta { upvotes: 0, downvotes: -1 }),
            (Upvoted, Down) => (Downvoted, CounterDelta { upvotes: -1, downvotes: 1 }),
            (Downvoted, Up) => (Upvoted, CounterDelta { upvotes: 1, downvotes: -1 }),
        }
    }
}

impl From<Option<VoteKind>> for VoteState {
    fn from(kind: Option<VoteKind>) -> Self {
        match kind {
            None => VoteState::NoVote,
            Some(VoteKind::Up) => VoteState::Upvoted,
            Some(VoteKind::Down) => VoteState::Downvoted,
        }
    }
}

/// Result of casting a vote, as returned to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoteOutcome {
    #[serde(rename = "postId")]
    pub post_id: String,
    pub upvotes: u64,
    pub downvotes: u64,
    #[serde(rename = "userVote")]
    pub user_vote: Option<VoteKind>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vote_kind() {
        assert_eq!("up".parse::<VoteKind>().unwrap(), VoteKind::Up);
        assert_eq!("down".parse::<VoteKind>().unwrap(), VoteKind::Down);

        for bad in ["", "UP", "sideways", "1"] {
            assert!(matches!(
                bad.parse::<VoteKind>(),
                Err(AppError::Validation(_))
            ));
        }
    }

    #[test]
    fn test_first_vote_adds_one() {
        let (state, delta) = VoteState::NoVote.transition(VoteKind::Up);
        assert_eq!(state, VoteState::Upvoted);
        assert_eq!(delta, CounterDelta { upvotes: 1, downvotes: 0 });
        assert_eq!(delta.total(), 1);

        let (state, delta) = VoteState::NoVote.transition(VoteKind::Down);
        assert_eq!(state, VoteState::Downvoted);
        assert_eq!(delta, CounterDelta { upvotes: 0, downvotes: 1 });
    }

    #[test]
    fn test_same_kind_toggles_off() {
        let (state, delta) = VoteState::Upvoted.transition(VoteKind::Up);
        assert_eq!(state, VoteState::NoVote);
        assert_eq!(delta.total(), -1);

        let (state, delta) = VoteState::Downvoted.transition(VoteKind::Down);
        assert_eq!(state, VoteState::NoVote);
        assert_eq!(delta, CounterDelta { upvotes: 0, downvotes: -1 });
    }

    #[test]
    fn test_switch_moves_one_unit() {
        let (state, delta) = VoteState::Upvoted.transition(VoteKind::Down);
        assert_eq!(state, VoteState::Downvoted);
        assert_eq!(delta, CounterDelta { upvotes: -1, downvotes: 1 });
        assert_eq!(delta.total(), 0);

        let (state, delta) = VoteState::Downvoted.transition(VoteKind::Up);
        assert_eq!(state, VoteState::Upvoted);
        assert_eq!(delta, CounterDelta { upvotes: 1, downvotes: -1 });
        assert_eq!(delta.total(), 0);
    }

    #[test]
    fn test_repeat_returns_to_start() {
        for start in [VoteState::NoVote, VoteState::Upvoted, VoteState::Downvoted] {
            for kind in [VoteKind::Up, VoteKind::Down] {
                let (mid, first) = start.transition(kind);
                let (end, second) = mid.transition(kind);
                if start.kind() == Some(kind) {
                    // toggle-off then re-vote
                    assert_eq!(end, start);
                    assert_eq!(first.upvotes + second.upvotes, 0);
                    assert_eq!(first.downvotes + second.downvotes, 0);
                } else {
                    assert_eq!(end, VoteState::NoVote);
                }
            }
        }
    }

    #[test]
    fn test_state_kind_round_trip() {
        for state in [VoteState::NoVote, VoteState::Upvoted, VoteState::Downvoted] {
            assert_eq!(VoteState::from(state.kind()), state);
        }
    }

    #[test]
    fn test_outcome_serialization() {
        let outcome = VoteOutcome {
            post_id: "p1".to_string(),
            upvotes: 3,
            downvotes: 1,
            user_vote: None,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["postId"], "p1");
        assert_eq!(json["upvotes"], 3);
        assert!(json["userVote"].is_null());

        let outcome = VoteOutcome {
            user_vote: Some(VoteKind::Down),
            ..outcome
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["userVote"], "down");
    }
}
