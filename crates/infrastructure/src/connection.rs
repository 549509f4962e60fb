use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// ストア接続の状態
///
/// 数値コードはドライバの readyState と同じ並び（0..=3）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum ConnectionState {
    Disconnected = 0,
    Connected = 1,
    Connecting = 2,
    Disconnecting = 3,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connected => "connected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Disconnecting => "disconnecting",
        }
    }

    pub fn code(&self) -> u8 {
        *self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(ConnectionState::Disconnected),
            1 => Some(ConnectionState::Connected),
            2 => Some(ConnectionState::Connecting),
            3 => Some(ConnectionState::Disconnecting),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        *self == ConnectionState::Connected
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// リクエスト間で共有される接続状態
#[derive(Debug)]
pub struct ConnectionTracker {
    state: AtomicU8,
}

impl ConnectionTracker {
    pub fn new(initial: ConnectionState) -> Self {
        Self {
            state: AtomicU8::new(initial.code()),
        }
    }

    pub fn get(&self) -> ConnectionState {
        ConnectionState::from_code(self.state.load(Ordering::Acquire))
            .unwrap_or(ConnectionState::Disconnected)
    }

    /// 状態を更新し、変化があった場合のみログを出す
    pub fn set(&self, next: ConnectionState) {
        let previous = self.state.swap(next.code(), Ordering::AcqRel);
        if previous != next.code() {
            tracing::info!(
                from = %ConnectionState::from_code(previous).unwrap_or(ConnectionState::Disconnected),
                to = %next,
                "Database connection state changed"
            );
        }
    }
}

impl Default for ConnectionTracker {
    fn default() -> Self {
        Self::new(ConnectionState::Disconnected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip_and_labels() {
        let expected = [
            (0, "disconnected"),
            (1, "connected"),
            (2, "connecting"),
            (3, "disconnecting"),
        ];

        for (code, label) in expected {
            let state = ConnectionState::from_code(code).unwrap();
            assert_eq!(state.code(), code);
            assert_eq!(state.as_str(), label);
            assert_eq!(serde_json::to_value(state).unwrap(), label);
        }
        assert_eq!(ConnectionState::from_code(4), None);
    }

    #[test]
    fn test_only_connected_is_ready() {
        assert!(ConnectionState::Connected.is_ready());
        assert!(!ConnectionState::Connecting.is_ready());
        assert!(!ConnectionState::Disconnecting.is_ready());
        assert!(!ConnectionState::Disconnected.is_ready());
    }

    #[test]
    fn test_tracker_transitions() {
        let tracker = ConnectionTracker::default();
        assert_eq!(tracker.get(), ConnectionState::Disconnected);

        tracker.set(ConnectionState::Connecting);
        tracker.set(ConnectionState::Connected);

        assert_eq!(tracker.get(), ConnectionState::Connected);
    }
}
