use nom::{bytes, number, IResult};

/// Parse unsigned byte
pub fn parse_u8(i: &[u8]) -> IResult<&[u8], u8> {
    number::complete::be_u8(i)
}

/// Parse big-endian unsigned short
pub fn parse_be_u16(i: &[u8]) -> IResult<&[u8], u16> {
    number::complete::be_u16(i)
}

/// Parse big-endian unsigned int
pub fn parse_be_u32(i: &[u8]) -> IResult<&[u8], u32> {
    number::complete::be_u32(i)
}

/// Take `n` raw bytes.
pub fn parse_bytes(i: &[u8], n: usize) -> IResult<&[u8], &[u8]> {
    bytes::complete::take(n)(i)
}

/// Parse a MIDI variable-length quantity.
///
/// Each byte carries 7 bits of the value, most significant group first.
/// A set top bit means another byte follows.
/// Values longer than 4 bytes are not rejected, the extra high bits are shifted out.
pub fn parse_variable_length(i: &[u8]) -> IResult<&[u8], u32> {
    let mut rest = i;
    let mut value: u32 = 0;
    loop {
        let (next, byte) = parse_u8(rest)?;
        rest = next;
        value = (value << 7) | u32::from(byte & 0x7F);
        if byte & 0x80 == 0 {
            return Ok((rest, value));
        }
    }
}
