// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::fs::File;
use std::path::Path;

use anyhow::anyhow;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use memmap2::Mmap;
use mmc_kernel::eeprom::inspect::{inspect_image, BankReport};
use mmc_kernel::eeprom::AppTag;

/// Decodes both banks of a flash image file.
pub fn load(path: &Path) -> anyhow::Result<[BankReport; 2]> {
    let file = File::open(path)?;
    let mmap = unsafe { Mmap::map(&file)? };
    inspect_image(&mmap).map_err(|e| anyhow!("{}: {}", path.display(), e))
}

pub fn run(path: &Path, json: bool) -> anyhow::Result<()> {
    let banks = load(path)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&banks)?);
        return Ok(());
    }

    for bank in &banks {
        println!("\nBank {:?}: {:?}, {} free slots", bank.bank, bank.state, bank.free_slots);

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["Slot", "Tag", "Name", "Value", "CRC"]);
        for f in &bank.frames {
            let name = AppTag::from_tag(f.tag).map_or("", |t| t.name());
            let value: Vec<String> = f.value.iter().map(|b| format!("{:02x}", b)).collect();
            table.add_row(vec![
                f.slot.to_string(),
                format!("{:#04x}", f.tag),
                name.to_string(),
                value.join(" "),
                if f.crc_ok { "OK" } else { "BAD" }.to_string(),
            ]);
        }
        println!("{table}");
    }
    Ok(())
}
