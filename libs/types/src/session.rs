//! Session lifecycle state
//!
//! A server hosts at most one session at a time. The session moves
//! lobby → running → ended; game time advances in whole-second ticks
//! delivered on the engine thread, so the end transition is serialized with
//! command handling.

use crate::config::GameConfig;
use crate::ids::{ParticipantId, SessionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Session status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Accepting participants, no trading
    Lobby,
    /// Trading open, timer running
    Running,
    /// Scored and frozen (terminal)
    Ended,
}

/// A single game session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: SessionId,
    /// None until the first participant joins and becomes host
    pub host: Option<ParticipantId>,
    pub status: SessionStatus,
    /// Configuration snapshot taken at creation
    pub config: GameConfig,
    /// Participants in admission order (stable tie-break for leaderboards)
    pub participants: Vec<ParticipantId>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    /// Whole seconds elapsed since start
    pub ticks_elapsed: u64,
}

impl Session {
    /// Create a new lobby session with a configuration snapshot
    pub fn new(config: GameConfig) -> Self {
        Self {
            session_id: SessionId::new(),
            host: None,
            status: SessionStatus::Lobby,
            config,
            participants: Vec::new(),
            created_at: Utc::now(),
            started_at: None,
            ended_at: None,
            ticks_elapsed: 0,
        }
    }

    /// Seconds left on the clock while running, 0 otherwise
    pub fn remaining_seconds(&self) -> u64 {
        match self.status {
            SessionStatus::Running => self
                .config
                .game_duration_seconds
                .saturating_sub(self.ticks_elapsed),
            _ => 0,
        }
    }

    /// Admission index of a participant, if joined
    pub fn admission_index(&self, participant_id: &ParticipantId) -> Option<usize> {
        self.participants.iter().position(|p| p == participant_id)
    }

    pub fn is_full(&self) -> bool {
        self.participants.len() >= self.config.max_players as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_starts_in_lobby() {
        let session = Session::new(GameConfig::default());
        assert_eq!(session.status, SessionStatus::Lobby);
        assert!(session.host.is_none());
        assert!(session.participants.is_empty());
    }

    #[test]
    fn test_remaining_seconds() {
        let mut session = Session::new(GameConfig::default());
        assert_eq!(session.remaining_seconds(), 0, "no clock in lobby");

        session.status = SessionStatus::Running;
        session.ticks_elapsed = 10;
        let expected = session.config.game_duration_seconds - 10;
        assert_eq!(session.remaining_seconds(), expected);

        session.ticks_elapsed = session.config.game_duration_seconds + 5;
        assert_eq!(session.remaining_seconds(), 0, "clock never goes negative");
    }

    #[test]
    fn test_is_full() {
        let mut session = Session::new(GameConfig::default());
        for _ in 0..session.config.max_players {
            session.participants.push(ParticipantId::new());
        }
        assert!(session.is_full());
    }
}
