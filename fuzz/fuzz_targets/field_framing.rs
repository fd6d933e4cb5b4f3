#![no_main]
use libfuzzer_sys::fuzz_target;
use parcel_tlv::{writer, FieldHeader, FieldValue, Parcel};

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }
    let tag = u16::from_le_bytes([data[0], data[1]]);
    let body = &data[2..];

    let mut parcel = Parcel::new();
    writer::write_sized(&mut parcel, tag, Some(FieldValue::Splice(body)), 0, false).unwrap();
    let enc = parcel.into_bytes();

    let mut rest = &enc[..];
    let header = FieldHeader::parse(&mut rest).unwrap();
    assert_eq!(header.tag, tag);
    assert_eq!(header.len as usize, body.len());
    assert_eq!(rest, body);
});
