pub mod byte_cursor;
pub mod midi_message;
mod primitive_parser;
pub mod smf_parser;
