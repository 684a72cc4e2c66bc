// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The label scanner.
//!
//! LVM tolerates its `LABELONE` header landing in any of the first four
//! sectors, to coexist with partition tables and boot sectors. This
//! scans each candidate sector in turn and returns the first match.

use byteorder::{ByteOrder, LittleEndian};

use crate::disk::{BlockDevice, SECTOR_SIZE};
use crate::error::{Error, Result};

/// How many leading sectors are searched for `LABELONE`.
pub const LABEL_SCAN_SECTORS: u64 = 4;
/// Size of the buffer read per candidate sector.
pub const LABEL_SIZE: usize = 512;

const LABEL_ID: &[u8; 8] = b"LABELONE";
const LVM2_LABEL_TYPE: &[u8; 8] = b"LVM2 001";

/// The result of a successful label scan: the raw label-sector bytes,
/// the byte offset of the PV header within them, and whether the label
/// sat in sector 0.
pub struct LabelLocation {
    pub sector_buf: Vec<u8>,
    pub pvheader_offset: usize,
    pub in_first_sector: bool,
}

impl LabelLocation {
    /// The PV header bytes, from `pvheader_offset` to the end of the
    /// scanned sector buffer.
    pub fn pvheader_bytes(&self) -> &[u8] {
        &self.sector_buf[self.pvheader_offset..]
    }
}

/// Scan the first [`LABEL_SCAN_SECTORS`] sectors of `disk` for an LVM2
/// label. Returns `Ok(None)` (not an error) if none is found.
pub fn scan<D: BlockDevice + ?Sized>(disk: &D) -> Result<Option<LabelLocation>> {
    for sector in 0..LABEL_SCAN_SECTORS {
        log::trace!("label scan: reading sector {sector}");
        let buf = disk.read_at(sector, 0, LABEL_SIZE)?;
        if buf.len() < LABEL_SIZE {
            continue;
        }

        if &buf[0..8] != LABEL_ID {
            continue;
        }
        if &buf[24..32] != LVM2_LABEL_TYPE {
            continue;
        }

        let offset_xl = LittleEndian::read_u32(&buf[20..24]) as usize;
        if offset_xl >= buf.len() {
            return Err(Error::BadMetadata(format!(
                "label offset_xl {offset_xl} exceeds label buffer"
            )));
        }

        return Ok(Some(LabelLocation {
            in_first_sector: sector == 0,
            pvheader_offset: offset_xl,
            sector_buf: buf,
        }));
    }

    Ok(None)
}
