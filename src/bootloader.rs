// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The installer helper: locates a PV's bootloader area so a host can
//! embed boot code into it. Uses only the label scanner and PV header
//! reader; never touches metadata text.

use crate::disk::{BlockDevice, SECTOR_SIZE};
use crate::error::{Error, Result};
use crate::label;
use crate::pvheader::PvHeader;
use crate::registry::DiskFilterRegistry;

/// The only embed target this crate understands.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum EmbedType {
    PcBios,
}

/// Locate the sector range of `disk`'s bootloader area, bounded to at
/// most `max_nsectors` sectors.
pub fn embed<D: BlockDevice + ?Sized, R: DiskFilterRegistry>(
    disk: &D,
    registry: &R,
    max_nsectors: u64,
    embed_type: EmbedType,
) -> Result<Vec<u64>> {
    if embed_type != EmbedType::PcBios {
        return Err(Error::NotImplemented("embed type other than PC-BIOS"));
    }

    let location = label::scan(disk)?.ok_or_else(|| Error::BadDevice("no LVM2 signature found".to_string()))?;
    if location.in_first_sector {
        return Err(Error::BadDevice("boot sector not free".to_string()));
    }

    let pvh = PvHeader::parse(location.pvheader_bytes())?;

    // Side effect only: confirms the disk's PV is already known to the
    // registry. The mapping itself isn't consulted further here.
    let _ = registry.get_pv_from_disk(&pvh.raw_uuid);

    let area = pvh
        .locate_bootloader_area()
        .ok_or_else(|| Error::BadDevice("no bootloader area".to_string()))?;

    if area.offset % SECTOR_SIZE != 0 {
        return Err(Error::BadDevice("bootloader area is not sector-aligned".to_string()));
    }

    let first_sector = area.offset / SECTOR_SIZE;
    let count = (area.size / SECTOR_SIZE).min(max_nsectors);

    Ok((0..count).map(|i| first_sector + i).collect())
}
