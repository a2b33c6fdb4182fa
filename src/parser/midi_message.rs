use std::fmt;

pub const NOTE_OFF: u8 = 0x80;
pub const NOTE_ON: u8 = 0x90;
pub const PROGRAM_CHANGE: u8 = 0xC0;

/// A channel voice message with its running status resolved.
///
/// `status` always holds the effective status byte, even when the file
/// omitted it. Single data byte messages (program change, channel pressure)
/// carry `data2 = 0`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct Message {
    pub status: u8,
    pub data1: u8,
    pub data2: u8,
}

impl Message {
    pub const fn new(status: u8, data1: u8, data2: u8) -> Self {
        Self {
            status,
            data1,
            data2,
        }
    }

    /// High nibble of the status byte.
    pub const fn command(&self) -> u8 {
        self.status & 0xF0
    }

    /// Low nibble of the status byte.
    pub const fn channel(&self) -> u8 {
        self.status & 0x0F
    }

    /// Note-on with a non-zero velocity.
    pub const fn is_note_on(&self) -> bool {
        self.command() == NOTE_ON && self.data2 > 0
    }

    /// Note-off, including the note-on with zero velocity shorthand.
    pub const fn is_note_off(&self) -> bool {
        self.command() == NOTE_OFF || (self.command() == NOTE_ON && self.data2 == 0)
    }

    /// True for messages carrying a single data byte.
    pub const fn has_single_data_byte(status: u8) -> bool {
        // 0xC0 program change and 0xD0 channel pressure
        status & 0xE0 == PROGRAM_CHANGE
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{:X},{},{}]", self.status, self.data1, self.data2)
    }
}
