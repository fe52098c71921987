//! Messages exchanged with the network collaborator.
//!
//! The transport itself lives outside the core. Each tick the core reads a
//! drained snapshot of inbound messages through an [`Inbox`] and, in
//! learning mode, hands back an [`OutboundMessage`] describing the game.

use std::collections::HashMap;

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::components::{Direction, MoveDirection};
use crate::error::MessageError;
use crate::game::GameState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum OutboundMessage {
    #[serde(rename = "game-state")]
    GameState(GameStateMessage),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameStateMessage {
    /// Palette color names, column-major.
    pub board: Vec<Vec<String>>,
    pub player: PlayerSnapshot,
    pub ghosts: Vec<GhostSnapshot>,
    pub state: GameState,
}

/// Tile coordinates are absent while an actor is outside the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub x: Option<usize>,
    pub y: Option<usize>,
    #[serde(rename = "move")]
    pub moves: MoveDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GhostSnapshot {
    pub x: Option<usize>,
    pub y: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectionUpdate {
    pub color: String,
    pub direction: Direction,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    Directions(Vec<DirectionUpdate>),
    GameState(GameStateMessage),
}

#[derive(Debug, Deserialize)]
struct RawUpdate {
    #[serde(default)]
    color: String,
    direction: String,
}

fn parse_direction(name: &str) -> Result<Direction, MessageError> {
    match name {
        "up" => Ok(Direction::Up),
        "down" => Ok(Direction::Down),
        "left" => Ok(Direction::Left),
        "right" => Ok(Direction::Right),
        other => Err(MessageError::UnknownDirection(other.to_string())),
    }
}

fn update_from_value(value: Value) -> Result<DirectionUpdate, MessageError> {
    let raw: RawUpdate = serde_json::from_value(value)?;
    if raw.color.is_empty() {
        return Err(MessageError::EmptyColor);
    }
    Ok(DirectionUpdate {
        direction: parse_direction(&raw.direction)?,
        color: raw.color,
    })
}

/// Parses one inbound text frame: an array of `{color, direction}` records,
/// a single record, or a game-state echo.
pub fn decode_inbound(text: &str) -> Result<InboundMessage, MessageError> {
    let value: Value = serde_json::from_str(text)?;
    if let Value::Array(items) = value {
        let updates = items
            .into_iter()
            .map(update_from_value)
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(InboundMessage::Directions(updates));
    }

    let is_state = value.get("action").and_then(Value::as_str) == Some("game-state");
    if is_state {
        let OutboundMessage::GameState(state) = serde_json::from_value(value)?;
        Ok(InboundMessage::GameState(state))
    } else if value.get("direction").is_some() {
        Ok(InboundMessage::Directions(vec![update_from_value(value)?]))
    } else {
        Err(MessageError::UnexpectedShape(value.to_string()))
    }
}

/// Latest requested direction per actor color.
#[derive(Debug, Clone, Default)]
pub struct Inbox {
    latest: HashMap<String, Direction>,
    known: Option<Vec<String>>,
}

impl Inbox {
    /// An inbox that only accepts updates for the given actor colors.
    pub fn for_colors(colors: impl IntoIterator<Item = String>) -> Self {
        Self {
            latest: HashMap::new(),
            known: Some(colors.into_iter().collect()),
        }
    }

    pub fn absorb(&mut self, message: InboundMessage) {
        match message {
            InboundMessage::Directions(updates) => self.absorb_updates(updates),
            InboundMessage::GameState(_) => {
                warn!("[Inbox] discarding echoed game state");
            }
        }
    }

    pub fn absorb_updates(&mut self, updates: Vec<DirectionUpdate>) {
        for update in updates {
            if let Some(known) = &self.known {
                if !known.contains(&update.color) {
                    warn!("[Inbox] direction for unknown actor color {}", update.color);
                    continue;
                }
            }
            self.latest.insert(update.color, update.direction);
        }
    }

    pub fn direction_for(&self, color: &str) -> Option<Direction> {
        self.latest.get(color).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.latest.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn array_of_updates_is_accepted() {
        let message = decode_inbound(
            r#"[{"color": "pink", "direction": "up"}, {"color": "cyan", "direction": "left"}]"#,
        )
        .unwrap();
        assert_eq!(
            message,
            InboundMessage::Directions(vec![
                DirectionUpdate {
                    color: "pink".to_string(),
                    direction: Direction::Up,
                },
                DirectionUpdate {
                    color: "cyan".to_string(),
                    direction: Direction::Left,
                },
            ])
        );
    }

    #[test]
    fn single_update_is_accepted() {
        let message = decode_inbound(r#"{"color": "pink", "direction": "down"}"#).unwrap();
        let InboundMessage::Directions(updates) = message else {
            panic!("expected directions");
        };
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].direction, Direction::Down);
    }

    #[test]
    fn invalid_updates_are_rejected() {
        assert!(matches!(
            decode_inbound(r#"[{"color": "", "direction": "up"}]"#),
            Err(MessageError::EmptyColor)
        ));
        assert!(matches!(
            decode_inbound(r#"{"direction": "up"}"#),
            Err(MessageError::EmptyColor)
        ));
        assert!(matches!(
            decode_inbound(r#"{"color": "pink", "direction": "north"}"#),
            Err(MessageError::UnknownDirection(d)) if d == "north"
        ));
        assert!(matches!(decode_inbound("42"), Err(MessageError::UnexpectedShape(_))));
        assert!(matches!(decode_inbound("{not json"), Err(MessageError::Json(_))));
    }

    #[test]
    fn outbound_state_has_the_wire_shape() {
        let message = OutboundMessage::GameState(GameStateMessage {
            board: vec![vec!["slategray".to_string(), "black".to_string()]],
            player: PlayerSnapshot {
                x: Some(0),
                y: Some(1),
                moves: MoveDirection {
                    current: Direction::Left,
                    waiting: Direction::Up,
                },
            },
            ghosts: vec![GhostSnapshot { x: None, y: None }],
            state: GameState::Playing,
        });
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(
            value,
            json!({
                "action": "game-state",
                "board": [["slategray", "black"]],
                "player": {"x": 0, "y": 1, "move": {"current": "left", "waiting": "up"}},
                "ghosts": [{"x": null, "y": null}],
                "state": "playing",
            })
        );
    }

    #[test]
    fn echoed_state_is_recognised_and_discarded() {
        let text = json!({
            "action": "game-state",
            "board": [],
            "player": {"x": 1, "y": 2, "move": {"current": "right", "waiting": "right"}},
            "ghosts": [],
            "state": "lose",
        })
        .to_string();
        let message = decode_inbound(&text).unwrap();
        assert!(matches!(&message, InboundMessage::GameState(s) if s.state == GameState::Lose));

        let mut inbox = Inbox::default();
        inbox.absorb(message);
        assert!(inbox.is_empty());
    }

    #[test]
    fn inbox_keeps_the_latest_direction_per_color() {
        let mut inbox = Inbox::default();
        inbox.absorb(decode_inbound(r#"[{"color": "pink", "direction": "up"}]"#).unwrap());
        inbox.absorb(decode_inbound(r#"{"color": "pink", "direction": "right"}"#).unwrap());
        assert_eq!(inbox.direction_for("pink"), Some(Direction::Right));
        assert_eq!(inbox.direction_for("cyan"), None);
    }

    #[test]
    fn unknown_colors_are_dropped() {
        let mut inbox = Inbox::for_colors(vec!["pink".to_string()]);
        inbox.absorb(
            decode_inbound(r#"[{"color": "teal", "direction": "up"}, {"color": "pink", "direction": "down"}]"#)
                .unwrap(),
        );
        assert_eq!(inbox.direction_for("teal"), None);
        assert_eq!(inbox.direction_for("pink"), Some(Direction::Down));
    }
}
