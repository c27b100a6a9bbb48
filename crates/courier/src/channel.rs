//! The channel adapter contract.
//!
//! The medium is a world object that holds one short string, such as a
//! message block. The core never owns it: a handle is resolved again for
//! every read or write because the object may be destroyed or rebuilt
//! between ticks.

use courier_actuation::ActuationRequest;

/// Location of the current medium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MediumHandle {
    /// Tile x.
    pub x: i32,
    /// Tile y.
    pub y: i32,
}

impl MediumHandle {
    /// Create a handle.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Host-side access to the medium.
pub trait ChannelAdapter {
    /// Find a medium to use right now, if any exists.
    fn locate_medium(&mut self) -> Option<MediumHandle>;

    /// Read the medium's current text.
    fn read_text(&mut self, handle: MediumHandle) -> anyhow::Result<String>;

    /// Maximum characters a single write may carry.
    fn char_budget(&self) -> usize;

    /// The actuation that writes `text` to the medium.
    ///
    /// Writing is a world-mutating interaction, so it goes through the
    /// actuation queue like any other.
    fn write_request(&self, handle: MediumHandle, text: String) -> ActuationRequest {
        ActuationRequest::write_text(handle.x, handle.y, text)
    }
}
