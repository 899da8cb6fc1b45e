//! Room configuration.

use serde::{Deserialize, Serialize};

/// Limits the registry applies to every room it creates.
///
/// Deployments override the defaults through the server builder; the
/// fields map one-to-one onto environment settings in the server binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    /// Smallest accepted board side length.
    pub min_board_size: usize,

    /// Largest accepted board side length.
    pub max_board_size: usize,

    /// Chat lines kept per room; older lines are dropped first.
    pub max_messages: usize,

    /// Characters in a generated room code.
    pub code_length: usize,

    /// How many generated codes to try before giving up on a create.
    pub code_attempts: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            min_board_size: 3,
            max_board_size: 7,
            max_messages: 100,
            code_length: 4,
            code_attempts: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_config_default() {
        let config = RoomConfig::default();
        assert_eq!(config.min_board_size, 3);
        assert_eq!(config.max_board_size, 7);
        assert_eq!(config.max_messages, 100);
        assert_eq!(config.code_length, 4);
        assert_eq!(config.code_attempts, 100);
    }

    #[test]
    fn test_room_config_partial_json_uses_defaults() {
        let config: RoomConfig = serde_json::from_str(r#"{"max_board_size": 9}"#).unwrap();
        assert_eq!(config.max_board_size, 9);
        assert_eq!(config.max_messages, 100);
    }
}
