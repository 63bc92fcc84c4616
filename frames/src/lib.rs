//! Shared frame model and JSON decoder for the simulation state stream.
//!
//! This crate owns the wire representation consumed by the `viewer` engine and
//! the `wsviz` CLI. Each socket message is one self-contained JSON object: either
//! a reset signal (`{"reset": true, "roomId": "A"}`) or a state snapshot using
//! the compact field names `t`, `rid`, `p`, `m` and `pr`.
//!
//! Absent fields are carried as explicit `None` values rather than inferred. A
//! field that is present with the wrong JSON type is treated as absent, and a
//! payload that is valid JSON but not an object decodes as a frame with every
//! field absent. Only text that is not JSON at all is a decode error.

#[cfg(test)]
#[path = "lib_test.rs"]
mod lib_test;

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Error returned by [`decode_message`].
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The payload is not valid JSON.
    #[error("failed to decode message: {0}")]
    Json(#[from] serde_json::Error),
}

/// Opaque identifier of a simulation room.
///
/// Rooms arrive as strings or integers on the wire; both are normalized to
/// their string form so `"7"` and `7` name the same room.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RoomId(String);

impl RoomId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RoomId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match EntityId::deserialize(deserializer)? {
            EntityId::Int(n) => Self(n.to_string()),
            EntityId::Str(s) => Self(s),
        })
    }
}

/// Stable identifier of a player or monster.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Int(i64),
    Str(String),
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for EntityId {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

/// Which way a player is looking.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Facing {
    Left,
    Right,
    /// No facing flag was sent this frame; no direction indicator is drawn.
    #[default]
    Unknown,
}

impl Facing {
    /// Interpret the optional `l` flag: truthy means left, falsy means right.
    fn from_flag(flag: Option<&Value>) -> Self {
        match flag {
            None | Some(Value::Null) => Self::Unknown,
            Some(v) if is_truthy(v) => Self::Left,
            Some(_) => Self::Right,
        }
    }
}

/// A positioned simulation object (monster or projectile).
#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    /// Projectiles are sent without an id.
    pub id: Option<EntityId>,
    /// World-space x (grows rightward).
    pub x: f64,
    /// World-space y (grows upward).
    pub y: f64,
}

/// A connected player.
#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub id: EntityId,
    pub x: f64,
    pub y: f64,
    pub facing: Facing,
}

/// One immutable simulation snapshot for a room.
///
/// A `None` entity list means the layer was absent from the message; an empty
/// list means the layer was present but held nothing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    /// Simulation tick; 0 for the reset state.
    pub tick: u64,
    pub room_id: Option<RoomId>,
    pub players: Option<Vec<Player>>,
    pub monsters: Option<Vec<Entity>>,
    pub projectiles: Option<Vec<Entity>>,
}

impl Frame {
    /// The cleared state installed by a reset: tick 0 with every layer empty.
    #[must_use]
    pub fn empty(room_id: Option<RoomId>) -> Self {
        Self {
            tick: 0,
            room_id,
            players: Some(Vec::new()),
            monsters: Some(Vec::new()),
            projectiles: Some(Vec::new()),
        }
    }

    /// Players in wire order, or an empty slice when the layer is absent.
    #[must_use]
    pub fn players(&self) -> &[Player] {
        self.players.as_deref().unwrap_or_default()
    }

    /// Monsters in wire order, or an empty slice when the layer is absent.
    #[must_use]
    pub fn monsters(&self) -> &[Entity] {
        self.monsters.as_deref().unwrap_or_default()
    }

    #[must_use]
    pub fn has_players(&self) -> bool {
        !self.players().is_empty()
    }
}

/// A decoded inbound socket message.
#[derive(Clone, Debug, PartialEq)]
pub enum Inbound {
    /// Clear the state of `room_id` (or of whatever room is tracked when absent).
    Reset { room_id: Option<RoomId> },
    /// A candidate snapshot for the state store.
    Frame(Frame),
}

/// Decode one text message from the state stream.
///
/// # Errors
///
/// Returns [`DecodeError::Json`] when the text is not valid JSON.
pub fn decode_message(text: &str) -> Result<Inbound, DecodeError> {
    // Only objects reach the schema. The derived struct visitor would also
    // fill fields by position from an array.
    let Value::Object(map) = serde_json::from_str::<Value>(text)? else {
        return Ok(Inbound::Frame(Frame::default()));
    };
    let wire = WireMessage::deserialize(Value::Object(map))?;
    Ok(wire.into_inbound())
}

// =============================================================
// Wire schema
// =============================================================

#[derive(Deserialize)]
struct WireMessage {
    #[serde(default)]
    reset: Option<Value>,
    #[serde(default, rename = "roomId", deserialize_with = "lenient")]
    reset_room: Option<RoomId>,
    #[serde(default, deserialize_with = "lenient")]
    t: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    rid: Option<RoomId>,
    #[serde(default, deserialize_with = "lenient")]
    p: Option<Vec<WirePlayer>>,
    #[serde(default, deserialize_with = "lenient")]
    m: Option<Vec<WireEntity>>,
    #[serde(default, deserialize_with = "lenient")]
    pr: Option<Vec<WireEntity>>,
}

/// Read a field as `T`, or as absent when it holds some other JSON type.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

#[derive(Deserialize)]
struct WirePlayer {
    id: EntityId,
    x: f64,
    y: f64,
    #[serde(default)]
    l: Option<Value>,
}

#[derive(Deserialize)]
struct WireEntity {
    #[serde(default)]
    id: Option<EntityId>,
    x: f64,
    y: f64,
}

impl WireMessage {
    fn into_inbound(self) -> Inbound {
        if self.reset.as_ref().is_some_and(is_truthy) {
            return Inbound::Reset { room_id: self.reset_room };
        }
        Inbound::Frame(Frame {
            tick: self.t.unwrap_or_default(),
            room_id: self.rid,
            players: self.p.map(|ps| ps.into_iter().map(WirePlayer::into_player).collect()),
            monsters: self.m.map(|ms| ms.into_iter().map(WireEntity::into_entity).collect()),
            projectiles: self.pr.map(|ps| ps.into_iter().map(WireEntity::into_entity).collect()),
        })
    }
}

impl WirePlayer {
    fn into_player(self) -> Player {
        Player {
            facing: Facing::from_flag(self.l.as_ref()),
            id: self.id,
            x: self.x,
            y: self.y,
        }
    }
}

impl WireEntity {
    fn into_entity(self) -> Entity {
        Entity { id: self.id, x: self.x, y: self.y }
    }
}

/// Loose flag truthiness: `null`, `false`, `0`, `NaN` and `""` are false.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
