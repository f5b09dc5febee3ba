// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use crate::eeprom::tags::pad;
use crate::eeprom::{populate_defaults, AppTag, EepromStore, RamFlash};

#[test]
fn test_defaults_populated_once() {
    let mut s = EepromStore::open(RamFlash::new(256));
    s.write(AppTag::FanSpeed.tag(), &pad(&[40])).unwrap();

    assert_eq!(populate_defaults(&mut s).unwrap(), 6);
    assert_eq!(populate_defaults(&mut s).unwrap(), 0);

    // Existing values are kept.
    assert_eq!(s.read(AppTag::FanSpeed.tag()).unwrap(), pad(&[40]));
    assert_eq!(s.read(AppTag::IpAddr.tag()).unwrap(), [192, 168, 19, 31, 0, 0]);
    assert_eq!(s.read(AppTag::MacAddr.tag()).unwrap(), AppTag::MacAddr.default_value());
}

#[test]
fn test_tag_numbers() {
    for tag in AppTag::ALL {
        assert_eq!(AppTag::from_tag(tag.tag()), Some(tag));
        assert!(tag.tag() != 0x00 && tag.tag() != 0xff);
    }
    assert_eq!(AppTag::from_tag(0x42), None);
    assert_eq!(AppTag::Overtemp.name(), "overtemp");
}

#[test]
fn test_pad_truncates() {
    assert_eq!(pad(&[1, 2, 3, 4, 5, 6, 7, 8]), [1, 2, 3, 4, 5, 6]);
    assert_eq!(pad(&[]), [0; 6]);
}
