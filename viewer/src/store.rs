//! Latest-frame state store with sticky room selection.
//!
//! The store keeps exactly one "current" [`Frame`]. Incoming frames replace it
//! wholesale; there is no merging. Until a room is selected the store follows
//! whatever arrives, and the first frame carrying at least one player pins its
//! room. From then on frames from other rooms are dropped until
//! [`StateStore::reset_selection`] is called.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use frames::{Frame, RoomId};

/// Summary pushed to the stats display whenever the current frame changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameStats {
    pub tick: u64,
    pub players: usize,
    pub monsters: usize,
    pub room_id: Option<RoomId>,
}

impl FrameStats {
    #[must_use]
    pub fn of(frame: &Frame) -> Self {
        Self {
            tick: frame.tick,
            players: frame.players().len(),
            monsters: frame.monsters().len(),
            room_id: frame.room_id.clone(),
        }
    }
}

/// Holds the latest accepted frame for the selected room.
#[derive(Debug, Default)]
pub struct StateStore {
    selected_room: Option<RoomId>,
    current: Option<Frame>,
}

impl StateStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the current frame if the reset targets the tracked room.
    ///
    /// A reset with no room id applies to whatever room is tracked. Returns the
    /// stats of the cleared state, or `None` when the reset was ignored.
    pub fn apply_reset(&mut self, room_id: Option<&RoomId>) -> Option<FrameStats> {
        let applies = match (&self.selected_room, room_id) {
            (None, _) | (Some(_), None) => true,
            (Some(selected), Some(room)) => selected == room,
        };
        if !applies {
            return None;
        }

        let room = room_id.cloned().or_else(|| self.selected_room.clone());
        let cleared = Frame::empty(room);
        let stats = FrameStats::of(&cleared);
        self.current = Some(cleared);
        Some(stats)
    }

    /// Offer a decoded frame to the store.
    ///
    /// Returns the new stats when the frame was accepted, `None` when it was
    /// dropped because it belongs to a different room.
    pub fn apply_frame(&mut self, frame: Frame) -> Option<FrameStats> {
        if self.selected_room.is_none() && frame.has_players() {
            self.selected_room.clone_from(&frame.room_id);
        }

        if let Some(selected) = &self.selected_room {
            if frame.room_id.as_ref() != Some(selected) {
                return None;
            }
        }

        let stats = FrameStats::of(&frame);
        self.current = Some(frame);
        Some(stats)
    }

    /// The latest accepted frame, if any frame has been accepted yet.
    #[must_use]
    pub fn current_frame(&self) -> Option<&Frame> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn selected_room(&self) -> Option<&RoomId> {
        self.selected_room.as_ref()
    }

    /// Return to auto-select mode. The current frame is kept.
    pub fn reset_selection(&mut self) {
        self.selected_room = None;
    }
}
