// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use crate::eeprom::inspect::inspect_bank;
use crate::eeprom::{Bank, EepromStore, Flash, Frame, HeaderState, RamFlash};
use crate::error::{FlashError, KernelError};

// 8 slots: header plus 7 records.
const SECTOR: usize = 64;

fn store() -> EepromStore<RamFlash> {
    EepromStore::open(RamFlash::new(SECTOR))
}

fn val(n: u8) -> [u8; 6] {
    [n, n.wrapping_add(1), 0, 0, 0, n]
}

#[test]
fn test_fresh_device_formats_bank_zero() {
    let s = store();
    assert_eq!(s.active_bank(), Some(Bank::Zero));
    assert_eq!(s.capacity(), 7);
    assert_eq!(s.free_slots().unwrap(), 7);
    assert_eq!(&s.flash().sector(Bank::Zero)[..8], &[0x55; 8]);
    assert!(s.flash().sector(Bank::One).iter().all(|&b| b == 0xff));
    assert_eq!(s.flash().program_count(), 1);
}

#[test]
fn test_write_read_latest_wins() {
    let mut s = store();
    assert_eq!(s.read(5), Err(KernelError::NotFound));

    s.write(5, &val(1)).unwrap();
    s.write(6, &val(2)).unwrap();
    s.write(5, &val(3)).unwrap();

    assert_eq!(s.read(5).unwrap(), val(3));
    assert_eq!(s.read(6).unwrap(), val(2));
    assert_eq!(s.free_slots().unwrap(), 4);
    assert_eq!(s.live_tags().unwrap(), vec![(5, val(3)), (6, val(2))]);
}

#[test]
fn test_identical_write_is_noop() {
    let mut s = store();
    s.write(9, &val(7)).unwrap();
    let programs = s.flash().program_count();
    let free = s.free_slots().unwrap();

    s.write(9, &val(7)).unwrap();

    assert_eq!(s.flash().program_count(), programs);
    assert_eq!(s.free_slots().unwrap(), free);
    let report = inspect_bank(Bank::Zero, s.flash().sector(Bank::Zero));
    assert_eq!(report.frames.iter().filter(|f| f.tag == 9).count(), 1);
}

#[test]
fn test_reserved_tags() {
    let mut s = store();
    let programs = s.flash().program_count();

    assert_eq!(s.write(0x00, &val(1)), Err(KernelError::InvalidTag));
    assert_eq!(s.write(0xff, &val(1)), Err(KernelError::InvalidTag));
    assert_eq!(s.read(0x00), Err(KernelError::NotFound));
    assert_eq!(s.read(0xff), Err(KernelError::NotFound));
    assert_eq!(s.flash().program_count(), programs);
}

#[test]
fn test_migration_keeps_latest_per_tag() {
    let mut s = store();
    // Fill all 7 slots alternating between two tags.
    for i in 0..7u8 {
        s.write(1 + (i % 2), &val(10 + i)).unwrap();
    }
    assert_eq!(s.free_slots().unwrap(), 0);

    s.write(3, &val(99)).unwrap();

    assert_eq!(s.active_bank(), Some(Bank::One));
    assert!(s.flash().sector(Bank::Zero).iter().all(|&b| b == 0xff));

    let report = inspect_bank(Bank::One, s.flash().sector(Bank::One));
    assert_eq!(report.state, HeaderState::Valid);
    let mut tags: std::vec::Vec<u8> = report.frames.iter().map(|f| f.tag).collect();
    tags.sort();
    assert_eq!(tags, vec![1, 2, 3]);

    assert_eq!(s.read(1).unwrap(), val(16));
    assert_eq!(s.read(2).unwrap(), val(15));
    assert_eq!(s.read(3).unwrap(), val(99));
    assert_eq!(s.free_slots().unwrap(), 4);
}

#[test]
fn test_repeated_migrations_ping_pong() {
    let mut s = store();
    for i in 0..40u8 {
        s.write(1 + (i % 3), &val(i)).unwrap();
    }
    assert_eq!(s.read(1).unwrap(), val(39));
    assert_eq!(s.read(2).unwrap(), val(37));
    assert_eq!(s.read(3).unwrap(), val(38));
}

#[test]
fn test_out_of_space_when_all_unique() {
    let mut s = store();
    for tag in 1..=7u8 {
        s.write(tag, &val(tag)).unwrap();
    }
    let erases = s.flash().erase_count();

    assert_eq!(s.write(8, &val(8)), Err(KernelError::OutOfSpace));
    assert_eq!(s.write(1, &val(50)), Err(KernelError::OutOfSpace));

    // No pointless migration and nothing lost.
    assert_eq!(s.flash().erase_count(), erases);
    assert_eq!(s.active_bank(), Some(Bank::Zero));
    assert_eq!(s.read(1).unwrap(), val(1));
}

#[test]
fn test_corrupt_record_skipped_and_reclaimed() {
    let mut s = store();
    s.write(4, &val(1)).unwrap();

    let mut bad = Frame::new(4, val(2)).to_bytes();
    bad[7] ^= 0x01;
    s.flash_mut().poke(Bank::Zero, 16, &bad).unwrap();
    assert_eq!(s.read(4).unwrap(), val(1));

    for tag in 10..15u8 {
        s.write(tag, &val(tag)).unwrap();
    }
    assert_eq!(s.free_slots().unwrap(), 0);

    // Only the corrupt slot is reclaimable, and that is enough.
    s.write(20, &val(20)).unwrap();
    assert_eq!(s.active_bank(), Some(Bank::One));
    assert_eq!(s.read(4).unwrap(), val(1));
    assert_eq!(s.read(20).unwrap(), val(20));
    assert_eq!(s.free_slots().unwrap(), 0);
}

#[test]
fn test_half_programmed_slot_forces_migration() {
    let mut s = store();
    s.write(1, &val(1)).unwrap();
    // tag byte still erased but the value was partly written
    s.flash_mut().poke(Bank::Zero, 16, &[0xff, 0x00, 0x00, 0xff, 0xff, 0xff, 0xff, 0xff]).unwrap();

    s.write(2, &val(2)).unwrap();
    assert_eq!(s.active_bank(), Some(Bank::One));
    assert_eq!(s.read(1).unwrap(), val(1));
    assert_eq!(s.read(2).unwrap(), val(2));
}

#[test]
fn test_reset() {
    let mut s = store();
    for i in 0..10u8 {
        s.write(1 + (i % 2), &val(i)).unwrap();
    }
    s.reset().unwrap();

    assert_eq!(s.active_bank(), Some(Bank::Zero));
    assert_eq!(s.read(1), Err(KernelError::NotFound));
    assert_eq!(s.free_slots().unwrap(), 7);
    assert!(s.flash().sector(Bank::One).iter().all(|&b| b == 0xff));
}

#[test]
fn test_no_active_bank_is_io_error() {
    // A sector too small for header plus one record.
    let mut s = EepromStore::open(RamFlash::new(8));
    assert_eq!(s.active_bank(), None);
    assert_eq!(s.read(1), Err(KernelError::Io(FlashError::NoActiveBank)));
    assert_eq!(s.write(1, &val(1)), Err(KernelError::Io(FlashError::NoActiveBank)));
    assert!(s.free_slots().is_err());
    // Sentinels stay NotFound regardless.
    assert_eq!(s.read(0), Err(KernelError::NotFound));
}

#[test]
fn test_program_failure_propagates() {
    let mut s = store();
    s.flash_mut().fail_programs_after(0);
    assert_eq!(s.write(1, &val(1)), Err(KernelError::Io(FlashError::Program)));

    s.flash_mut().clear_faults();
    s.write(1, &val(1)).unwrap();
    assert_eq!(s.read(1).unwrap(), val(1));
}

#[test]
fn test_frame_layout() {
    let bytes = [0x04, 1, 2, 3, 4, 5, 6, 0x04 ^ 1 ^ 2 ^ 3 ^ 4 ^ 5 ^ 6];
    let frame = Frame::from_bytes(&bytes);
    assert_eq!(frame, Frame::new(4, [1, 2, 3, 4, 5, 6]));
    assert_eq!(frame.to_bytes(), bytes);
    assert!(frame.is_live());
    assert!(Frame::ERASED.is_erased());
    assert!(!Frame::ERASED.is_live());
}

#[test]
fn test_poke_out_of_bounds() {
    let mut flash = RamFlash::new(64);
    assert_eq!(flash.poke(Bank::One, 60, &[0; 8]), Err(FlashError::OutOfBounds));
    assert!(flash.image().iter().all(|&b| b == 0xff));
    assert_eq!(flash.poke(Bank::One, 56, &[0; 8]), Ok(()));
    assert_eq!(&flash.image()[120..], &[0u8; 8]);
}
