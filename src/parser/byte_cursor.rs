use crate::parser::primitive_parser::{
    parse_be_u16, parse_be_u32, parse_bytes, parse_u8, parse_variable_length,
};
use crate::SmfError;
use nom::IResult;

/// Sequential reader over an immutable byte buffer.
///
/// The offset never moves past the end of the buffer: a read that would
/// need more bytes than remain fails with [`SmfError::OutOfData`] and leaves
/// the offset untouched.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ByteCursor<'a> {
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes not consumed yet.
    pub fn remaining(&self) -> &'a [u8] {
        self.data.get(self.offset..).unwrap_or_default()
    }

    pub const fn is_at_end(&self) -> bool {
        self.offset >= self.data.len()
    }

    /// Run `parser` on the remaining bytes and move past what it consumed.
    fn run<T>(
        &mut self,
        parser: impl FnOnce(&'a [u8]) -> IResult<&'a [u8], T>,
    ) -> Result<T, SmfError> {
        let input = self.remaining();
        match parser(input) {
            Ok((rest, value)) => {
                self.offset += input.len() - rest.len();
                Ok(value)
            }
            Err(err) => {
                log::debug!("read failed at offset {}: {err}", self.offset);
                Err(SmfError::OutOfData {
                    offset: self.offset,
                })
            }
        }
    }

    pub fn read_byte(&mut self) -> Result<u8, SmfError> {
        self.run(parse_u8)
    }

    pub fn peek_byte(&self) -> Result<u8, SmfError> {
        self.remaining()
            .first()
            .copied()
            .ok_or(SmfError::OutOfData {
                offset: self.offset,
            })
    }

    /// Skip `n` bytes.
    pub fn advance(&mut self, n: usize) -> Result<(), SmfError> {
        self.run(|i| parse_bytes(i, n)).map(|_| ())
    }

    /// Raw bytes used for chunk tag comparison.
    pub fn read_chars(&mut self, n: usize) -> Result<&'a [u8], SmfError> {
        self.run(|i| parse_bytes(i, n))
    }

    pub fn read_be_u16(&mut self) -> Result<u16, SmfError> {
        self.run(parse_be_u16)
    }

    pub fn read_be_u32(&mut self) -> Result<u32, SmfError> {
        self.run(parse_be_u32)
    }

    pub fn read_variable_length(&mut self) -> Result<u32, SmfError> {
        self.run(parse_variable_length)
    }
}
