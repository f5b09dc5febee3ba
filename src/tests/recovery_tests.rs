// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use crate::eeprom::{classify_header, Bank, EepromStore, Flash, Frame, HeaderState, RamFlash};
use crate::error::{FlashError, KernelError};

const SECTOR: usize = 64;

fn val(n: u8) -> [u8; 6] {
    [0xA0, n, 0, 0, 0, n]
}

fn stage(flash: &mut RamFlash, bank: Bank, header: u8, records: &[(u8, u8)]) {
    flash.poke(bank, 0, &[header; 8]).unwrap();
    for (i, (tag, n)) in records.iter().enumerate() {
        flash.poke(bank, 8 * (i + 1), &Frame::new(*tag, val(*n)).to_bytes()).unwrap();
    }
}

fn erased(flash: &RamFlash, bank: Bank) -> bool {
    flash.sector(bank).iter().all(|&b| b == 0xff)
}

#[test]
fn test_completes_migration_into_valid_bank() {
    let mut flash = RamFlash::new(SECTOR);
    // Bank 0 already received tag 1; tag 2 never made it across.
    stage(&mut flash, Bank::Zero, 0x55, &[(1, 30)]);
    stage(&mut flash, Bank::One, 0x00, &[(1, 10), (2, 20), (1, 30), (2, 21)]);

    let s = EepromStore::open(flash);

    assert_eq!(s.active_bank(), Some(Bank::Zero));
    assert!(erased(s.flash(), Bank::One));
    assert_eq!(s.read(1).unwrap(), val(30));
    assert_eq!(s.read(2).unwrap(), val(21));
    assert_eq!(s.live_tags().unwrap().len(), 2);
    assert_eq!(s.free_slots().unwrap(), 5);
}

#[test]
fn test_destination_records_untouched() {
    let mut flash = RamFlash::new(SECTOR);
    // Tag 7 only exists in the destination and must survive as is.
    stage(&mut flash, Bank::One, 0x55, &[(7, 77)]);
    stage(&mut flash, Bank::Zero, 0x00, &[(3, 33)]);

    let s = EepromStore::open(flash);

    assert_eq!(s.active_bank(), Some(Bank::One));
    assert_eq!(s.read(7).unwrap(), val(77));
    assert_eq!(s.read(3).unwrap(), val(33));
    assert!(erased(s.flash(), Bank::Zero));
}

#[test]
fn test_restarts_migration_before_destination_valid() {
    let mut flash = RamFlash::new(SECTOR);
    stage(&mut flash, Bank::Zero, 0x00, &[(1, 1), (2, 2), (1, 3)]);
    // Destination header still erased, one record partially copied.
    flash.poke(Bank::One, 8, &Frame::new(1, val(3)).to_bytes()[..5]).unwrap();

    let s = EepromStore::open(flash);

    assert_eq!(s.active_bank(), Some(Bank::One));
    assert!(erased(s.flash(), Bank::Zero));
    assert_eq!(s.read(1).unwrap(), val(3));
    assert_eq!(s.read(2).unwrap(), val(2));
    assert_eq!(s.free_slots().unwrap(), 5);
}

#[test]
fn test_valid_bank_one_with_stale_partner() {
    let mut flash = RamFlash::new(SECTOR);
    stage(&mut flash, Bank::One, 0x55, &[(4, 4)]);
    // Garbage header in bank 0.
    flash.poke(Bank::Zero, 0, &[0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0x12]).unwrap();

    let s = EepromStore::open(flash);

    assert_eq!(s.active_bank(), Some(Bank::One));
    assert!(erased(s.flash(), Bank::Zero));
    assert_eq!(s.read(4).unwrap(), val(4));
}

#[test]
fn test_corrupt_headers_reformat() {
    for headers in [[0x55, 0x55], [0x00, 0x00], [0xAA, 0xAA]] {
        let mut flash = RamFlash::new(SECTOR);
        stage(&mut flash, Bank::Zero, headers[0], &[(1, 1)]);
        stage(&mut flash, Bank::One, headers[1], &[(2, 2)]);

        let s = EepromStore::open(flash);

        assert_eq!(s.active_bank(), Some(Bank::Zero), "headers {:x?}", headers);
        assert_eq!(s.read(1), Err(KernelError::NotFound));
        assert_eq!(s.read(2), Err(KernelError::NotFound));
        assert_eq!(&s.flash().sector(Bank::Zero)[..8], &[0x55; 8]);
        assert!(erased(s.flash(), Bank::One));
    }
}

#[test]
fn test_torn_moving_header_resumes_migration() {
    let mut flash = RamFlash::new(SECTOR);
    stage(&mut flash, Bank::Zero, 0x55, &[(1, 10), (2, 20), (1, 11)]);
    // Only the first word of the Moving pattern reached the header.
    flash.poke(Bank::Zero, 0, &[0x00, 0x00, 0x00, 0x00, 0x55, 0x55, 0x55, 0x55]).unwrap();
    let mut header = [0u8; 8];
    header.copy_from_slice(&flash.sector(Bank::Zero)[..8]);
    assert_eq!(classify_header(&header), HeaderState::Invalid);

    let s = EepromStore::open(flash);

    assert_eq!(s.active_bank(), Some(Bank::One));
    assert_eq!(s.read(1).unwrap(), val(11));
    assert_eq!(s.read(2).unwrap(), val(20));
    assert!(erased(s.flash(), Bank::Zero));
    assert_eq!(s.free_slots().unwrap(), 5);
}

#[test]
fn test_torn_valid_header_on_destination() {
    let mut flash = RamFlash::new(SECTOR);
    stage(&mut flash, Bank::Zero, 0x00, &[(1, 1), (2, 2), (1, 3)]);
    stage(&mut flash, Bank::One, 0xff, &[(1, 3), (2, 2)]);
    flash.poke(Bank::One, 0, &[0x55, 0x55, 0x55, 0x55]).unwrap();

    let s = EepromStore::open(flash);

    assert_eq!(s.active_bank(), Some(Bank::One));
    assert_eq!(&s.flash().sector(Bank::One)[..8], &[0x55; 8]);
    assert_eq!(s.read(1).unwrap(), val(3));
    assert_eq!(s.read(2).unwrap(), val(2));
    assert!(erased(s.flash(), Bank::Zero));
}

#[test]
fn test_invalid_header_without_records_reformats() {
    let mut flash = RamFlash::new(SECTOR);
    stage(&mut flash, Bank::Zero, 0xAA, &[]);

    let s = EepromStore::open(flash);

    assert_eq!(s.active_bank(), Some(Bank::Zero));
    assert_eq!(&s.flash().sector(Bank::Zero)[..8], &[0x55; 8]);
    assert!(s.live_tags().unwrap().is_empty());
}

#[test]
fn test_power_loss_during_migration() {
    // Crash after every possible number of programs inside the migrating
    // write, both with the failing program lost whole and with its first
    // word landed.
    for (budget, torn) in (0..6).flat_map(|b| [(b, 0), (b, 4)]) {
        let mut s = EepromStore::open(RamFlash::new(SECTOR));
        for i in 0..7u8 {
            s.write(1 + (i % 2), &val(i)).unwrap();
        }

        s.flash_mut().fail_programs_after(budget);
        s.flash_mut().tear_failed_programs(torn);
        let res = s.write(3, &val(99));

        let mut flash = s.into_inner();
        flash.clear_faults();
        let s = EepromStore::open(flash);

        assert!(s.active_bank().is_some(), "budget {} torn {}", budget, torn);
        assert_eq!(s.read(1).unwrap(), val(6), "budget {} torn {}", budget, torn);
        assert_eq!(s.read(2).unwrap(), val(5), "budget {} torn {}", budget, torn);
        match res {
            Ok(()) => assert_eq!(s.read(3).unwrap(), val(99)),
            Err(e) => {
                assert_eq!(e, KernelError::Io(FlashError::Program));
                assert_eq!(s.read(3), Err(KernelError::NotFound));
            }
        }
    }
}
