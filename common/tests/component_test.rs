use crate::helper::test_component;
use byteorder::{LittleEndian, ReadBytesExt};
use common::messages::{from_bytes, read_array, to_bytes, write_array, Error, MessageComponent};
use std::{fmt::Debug, io::Cursor};

fn roundtrip<T: MessageComponent + PartialEq + Debug>(value: T, width: usize) {
    let bytes = to_bytes(&value).unwrap();
    assert_eq!(bytes.len(), width, "width of {:?}", value);
    let decoded: T = from_bytes(&bytes).unwrap();
    assert_eq!(decoded, value);
}

#[test]
fn test_unsigned_roundtrip_extremes() {
    roundtrip(u8::MIN, 1);
    roundtrip(1u8, 1);
    roundtrip(u8::MAX, 1);
    roundtrip(u16::MIN, 2);
    roundtrip(u16::MAX - 1, 2);
    roundtrip(u16::MAX, 2);
    roundtrip(u32::MIN, 4);
    roundtrip(u32::MAX - 1, 4);
    roundtrip(u32::MAX, 4);
    roundtrip(u64::MIN, 8);
    roundtrip(u64::MAX - 1, 8);
    roundtrip(u64::MAX, 8);
    roundtrip(u128::MIN, 16);
    roundtrip(u128::MAX - 1, 16);
    roundtrip(u128::MAX, 16);
}

#[test]
fn test_signed_roundtrip_extremes() {
    roundtrip(i8::MIN, 1);
    roundtrip(-1i8, 1);
    roundtrip(0i8, 1);
    roundtrip(i8::MAX, 1);
    roundtrip(i16::MIN, 2);
    roundtrip(-1i16, 2);
    roundtrip(0i16, 2);
    roundtrip(i16::MAX, 2);
    roundtrip(i32::MIN, 4);
    roundtrip(-1i32, 4);
    roundtrip(0i32, 4);
    roundtrip(i32::MAX, 4);
    roundtrip(i64::MIN, 8);
    roundtrip(-1i64, 8);
    roundtrip(0i64, 8);
    roundtrip(i64::MAX, 8);
    roundtrip(i128::MIN, 16);
    roundtrip(-1i128, 16);
    roundtrip(0i128, 16);
    roundtrip(i128::MAX, 16);
}

#[test]
fn test_little_endian_layout() {
    test_component(&0x1234u16, &[0x34, 0x12]);
    test_component(&0x1234_5678u32, &[0x78, 0x56, 0x34, 0x12]);
    test_component(&(-2i16), &[0xFE, 0xFF]);
    test_component(
        &0x0102_0304_0506_0708u64,
        &[0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01],
    );
}

#[test]
fn test_truncated_field() {
    let error = from_bytes::<u32>(&[0x01, 0x02, 0x03]).unwrap_err();
    assert!(matches!(error, Error::Truncated));

    let error = from_bytes::<u128>(&[0u8; 15]).unwrap_err();
    assert!(matches!(error, Error::Truncated));
}

#[test]
fn test_string_roundtrip() {
    test_component(&String::new(), &[0x00]);
    test_component(
        &String::from("ab"),
        &[0x03, b'a', 0x00, b'b', 0x00, 0x00, 0x00],
    );

    let long = "x".repeat(200);
    let bytes = to_bytes(&long).unwrap();
    assert_eq!(bytes.len(), 1 + 201 * 2);
    assert_eq!(from_bytes::<String>(&bytes).unwrap(), long);
}

#[test]
fn test_string_too_long_for_length_field() {
    let too_long = "x".repeat(255);
    assert!(matches!(
        to_bytes(&too_long).unwrap_err(),
        Error::LengthTooLong(_)
    ));
}

#[test]
fn test_string_missing_terminator() {
    // Declares two units but the last one is not NUL.
    let bytes = [0x02, b'a', 0x00, b'b', 0x00];
    assert!(matches!(
        from_bytes::<String>(&bytes).unwrap_err(),
        Error::UnterminatedString
    ));
}

#[test]
fn test_string_does_not_overread() {
    // A string followed by a u32 on the same cursor; the string read must
    // stop exactly at its declared units.
    let mut bytes = to_bytes(&String::from("ok")).unwrap();
    bytes.extend_from_slice(&0xDEAD_BEEFu32.to_le_bytes());

    let mut cursor = Cursor::new(bytes.as_slice());
    assert_eq!(String::read(&mut cursor).unwrap(), "ok");
    assert_eq!(cursor.read_u32::<LittleEndian>().unwrap(), 0xDEAD_BEEF);
}

#[test]
fn test_empty_array() {
    let mut cursor = Cursor::new([0u8; 4].as_slice());
    let elements: Vec<u16> = read_array(&mut cursor).unwrap();
    assert!(elements.is_empty());
    assert_eq!(cursor.position(), 4);
}

#[test]
fn test_array_roundtrip() {
    let values = vec![0x1001u16, 0x1002, 0x1016];

    let mut cursor = Cursor::new(Vec::new());
    write_array(&values, &mut cursor).unwrap();
    let bytes = cursor.into_inner();
    assert_eq!(
        bytes,
        [0x03, 0x00, 0x00, 0x00, 0x01, 0x10, 0x02, 0x10, 0x16, 0x10]
    );

    let mut cursor = Cursor::new(bytes.as_slice());
    let decoded: Vec<u16> = read_array(&mut cursor).unwrap();
    assert_eq!(decoded, values);
}

#[test]
fn test_array_truncated_elements() {
    // Count says two u32s but only one is present.
    let bytes = [0x02, 0x00, 0x00, 0x00, 0xAA, 0xBB, 0xCC, 0xDD];
    let mut cursor = Cursor::new(bytes.as_slice());
    assert!(matches!(
        read_array::<u32>(&mut cursor).unwrap_err(),
        Error::Truncated
    ));
}
