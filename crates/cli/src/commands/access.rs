// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use mmc_kernel::lass::{Beat, Transaction};

use crate::client::LassClient;

/// Reads `count` words at `address`; more than one becomes a burst.
pub fn read(client: &LassClient, address: u32, count: usize) -> anyhow::Result<Vec<u32>> {
    anyhow::ensure!(count > 0, "read count must be at least 1");
    let beat = if count > 1 { Beat::burst_read(address, count) } else { Beat::read(address) };
    let tx = Transaction::new(LassClient::next_id()).with(beat);
    let reply = client.transact(&tx)?;
    Ok(reply.beats[0].data().to_vec())
}

/// Writes `values` to `address`; more than one becomes a burst, and every
/// word lands on the same address.
pub fn write(client: &LassClient, address: u32, values: &[u32]) -> anyhow::Result<()> {
    let beat = match values {
        [single] => Beat::write(address, *single),
        many => Beat::burst_write(address, many.to_vec()),
    };
    let tx = Transaction::new(LassClient::next_id()).with(beat);
    client.transact(&tx)?;
    Ok(())
}

pub fn run_read(client: &LassClient, address: u32, count: usize) -> anyhow::Result<()> {
    let values = read(client, address, count)?;

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["#", "Address", "Value", "Decimal"]);
    for (i, v) in values.iter().enumerate() {
        table.add_row(vec![
            i.to_string(),
            format!("{:#08x}", address),
            format!("{:#010x}", v),
            v.to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn run_write(client: &LassClient, address: u32, values: &[u32]) -> anyhow::Result<()> {
    write(client, address, values)?;
    println!("wrote {} word(s) to {:#08x}", values.len(), address);
    Ok(())
}
