use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::{
    convert::Infallible,
    io::{self, Cursor, Read, Write},
    num::TryFromIntError,
    string::FromUtf16Error,
};

/// A value with a fixed little-endian layout on the wire. Packet payloads are
/// built out of these.
pub trait MessageComponent: Sized {
    fn read(cursor: &mut Cursor<&[u8]>) -> Result<Self, Error>;

    fn write(&self, cursor: &mut Cursor<Vec<u8>>) -> Result<(), Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io error: {0}")]
    StdIo(io::Error),
    #[error("stream ended short of a fixed-size field")]
    Truncated,
    #[error("invalid string: {0}")]
    InvalidString(#[from] FromUtf16Error),
    #[error("string missing its null terminator")]
    UnterminatedString,
    #[error("encountered a length parameter too long for its length field")]
    LengthTooLong(#[from] TryFromIntError),
    #[error("encountered unknown packet type {0}")]
    BadPacketType(u32),
    #[error("frame announced an impossible total length {0}")]
    BadFrameLength(u32),
    #[error("{packet} payload is {actual} bytes but its layout takes {expected}")]
    BadPayloadLength {
        packet: &'static str,
        expected: usize,
        actual: usize,
    },
}

// read_exact on a short cursor reports UnexpectedEof; that case is a protocol
// truncation, not a transport fault, and gets its own variant.
impl From<io::Error> for Error {
    fn from(error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::UnexpectedEof => Self::Truncated,
            _ => Self::StdIo(error),
        }
    }
}

impl From<Infallible> for Error {
    fn from(_: Infallible) -> Self {
        unreachable!()
    }
}

macro_rules! impl_int_message_component {
    ($ty:ty, $read:ident, $write:ident) => {
        impl MessageComponent for $ty {
            fn read(cursor: &mut Cursor<&[u8]>) -> Result<Self, Error> {
                cursor.$read::<LittleEndian>().map_err(Into::into)
            }

            fn write(&self, cursor: &mut Cursor<Vec<u8>>) -> Result<(), Error> {
                cursor.$write::<LittleEndian>(*self).map_err(Into::into)
            }
        }
    };
}

impl MessageComponent for u8 {
    fn read(cursor: &mut Cursor<&[u8]>) -> Result<Self, Error> {
        cursor.read_u8().map_err(Into::into)
    }

    fn write(&self, cursor: &mut Cursor<Vec<u8>>) -> Result<(), Error> {
        cursor.write_u8(*self).map_err(Into::into)
    }
}

impl MessageComponent for i8 {
    fn read(cursor: &mut Cursor<&[u8]>) -> Result<Self, Error> {
        cursor.read_i8().map_err(Into::into)
    }

    fn write(&self, cursor: &mut Cursor<Vec<u8>>) -> Result<(), Error> {
        cursor.write_i8(*self).map_err(Into::into)
    }
}

impl_int_message_component!(u16, read_u16, write_u16);
impl_int_message_component!(u32, read_u32, write_u32);
impl_int_message_component!(u64, read_u64, write_u64);
impl_int_message_component!(u128, read_u128, write_u128);
impl_int_message_component!(i16, read_i16, write_i16);
impl_int_message_component!(i32, read_i32, write_i32);
impl_int_message_component!(i64, read_i64, write_i64);
impl_int_message_component!(i128, read_i128, write_i128);

impl<const N: usize> MessageComponent for [u8; N] {
    fn read(cursor: &mut Cursor<&[u8]>) -> Result<Self, Error> {
        let mut dest = [0u8; N];
        cursor.read_exact(&mut dest).map_err(Error::from)?;
        Ok(dest)
    }

    fn write(&self, cursor: &mut Cursor<Vec<u8>>) -> Result<(), Error> {
        cursor.write_all(self.as_slice()).map_err(Into::into)
    }
}

// PTP string: a u8 count of UTF-16LE code units (null terminator included in
// the count when non-empty) followed by the units themselves. The empty
// string is the single byte 0x00. Reads consume exactly the declared units so
// a cursor shared with packet parsing stays positioned.
impl MessageComponent for String {
    fn read(cursor: &mut Cursor<&[u8]>) -> Result<Self, Error> {
        let num_chars = cursor.read_u8()?;
        if num_chars == 0 {
            return Ok(String::new());
        }

        let mut units = Vec::with_capacity(usize::from(num_chars));
        for _ in 0 .. num_chars {
            units.push(cursor.read_u16::<LittleEndian>()?);
        }
        if units.pop() != Some(0) {
            return Err(Error::UnterminatedString);
        }

        String::from_utf16(&units).map_err(Into::into)
    }

    fn write(&self, cursor: &mut Cursor<Vec<u8>>) -> Result<(), Error> {
        let units = self.encode_utf16().collect::<Vec<u16>>();
        if units.is_empty() {
            return cursor.write_u8(0).map_err(Into::into);
        }

        let num_chars = u8::try_from(units.len() + 1)?;
        cursor.write_u8(num_chars)?;
        for unit in units {
            cursor.write_u16::<LittleEndian>(unit)?;
        }
        cursor.write_u16::<LittleEndian>(0).map_err(Into::into)
    }
}

/// Reads a u32-count-prefixed array. A count of zero is an empty vec, not an
/// error.
pub fn read_array<T: MessageComponent>(cursor: &mut Cursor<&[u8]>) -> Result<Vec<T>, Error> {
    let count = usize::try_from(cursor.read_u32::<LittleEndian>()?)?;
    let mut elements = Vec::with_capacity(count.min(4096));
    for _ in 0 .. count {
        elements.push(T::read(cursor)?);
    }
    Ok(elements)
}

pub fn write_array<T: MessageComponent>(
    elements: &[T],
    cursor: &mut Cursor<Vec<u8>>,
) -> Result<(), Error> {
    cursor.write_u32::<LittleEndian>(u32::try_from(elements.len())?)?;
    for element in elements {
        element.write(cursor)?;
    }
    Ok(())
}

/// Encodes a single component to its canonical little-endian bytes.
pub fn to_bytes<T: MessageComponent>(component: &T) -> Result<Vec<u8>, Error> {
    let mut cursor = Cursor::new(Vec::new());
    component.write(&mut cursor)?;
    Ok(cursor.into_inner())
}

/// Decodes a single component from a byte slice, ignoring any trailing bytes.
pub fn from_bytes<T: MessageComponent>(bytes: &[u8]) -> Result<T, Error> {
    T::read(&mut Cursor::new(bytes))
}
