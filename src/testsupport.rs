// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Test-only fixtures: an in-memory `BlockDevice` and on-disk-layout
//! builders, so every component's unit tests can construct exactly the
//! bytes they need without a real block device.

use byteorder::{ByteOrder, LittleEndian};
use std::io;

use crate::disk::{BlockDevice, SECTOR_SIZE};
use crate::mda::{MDA_HEADER_SIZE, MdaHeader, RawLocn};

/// A flat `Vec<u8>`-backed disk.
pub struct MemDisk {
    bytes: Vec<u8>,
}

impl MemDisk {
    pub fn new(size: usize) -> MemDisk {
        MemDisk { bytes: vec![0u8; size] }
    }

    fn write_at(&mut self, byte_offset: usize, data: &[u8]) {
        let end = byte_offset + data.len();
        if end > self.bytes.len() {
            self.bytes.resize(end, 0);
        }
        self.bytes[byte_offset..end].copy_from_slice(data);
    }

    /// Write a minimal valid label header into `sector`, with the PV
    /// header starting `offset_xl` bytes into that same sector.
    pub fn write_label(&mut self, sector: u64, offset_xl: u32) {
        let base = (sector * SECTOR_SIZE) as usize;
        let mut buf = vec![0u8; SECTOR_SIZE as usize];
        buf[0..8].copy_from_slice(b"LABELONE");
        LittleEndian::write_u32(&mut buf[20..24], offset_xl);
        buf[24..32].copy_from_slice(b"LVM2 001");
        self.write_at(base, &buf);
    }

    /// Write a single-data-area, single-metadata-area PV header (no
    /// extended header) at byte offset `offset` in sector 0.
    pub fn write_pvheader(&mut self, offset: usize, uuid: &str, pv_size: u64, mda_offset: u64, mda_size: u64) {
        let mut buf = Vec::new();
        buf.extend_from_slice(uuid.as_bytes());
        let mut size_buf = [0u8; 8];
        LittleEndian::write_u64(&mut size_buf, pv_size);
        buf.extend_from_slice(&size_buf);

        push_locn(&mut buf, 4096, pv_size - 4096);
        push_locn(&mut buf, 0, 0); // terminate data areas
        push_locn(&mut buf, mda_offset, mda_size);
        push_locn(&mut buf, 0, 0); // terminate metadata areas

        self.write_at(offset, &buf);
    }

    /// Like [`write_pvheader`](Self::write_pvheader) but declares a
    /// second (unsupported) data area.
    pub fn write_pvheader_multi_da(&mut self, offset: usize, uuid: &str) {
        let mut buf = Vec::new();
        buf.extend_from_slice(uuid.as_bytes());
        let mut size_buf = [0u8; 8];
        LittleEndian::write_u64(&mut size_buf, 32 * 1024 * 1024);
        buf.extend_from_slice(&size_buf);

        push_locn(&mut buf, 4096, 8 * 1024 * 1024);
        push_locn(&mut buf, 16 * 1024 * 1024, 8 * 1024 * 1024);
        push_locn(&mut buf, 0, 0);
        push_locn(&mut buf, 1 * 1024 * 1024, 512 * 1024);
        push_locn(&mut buf, 0, 0);

        self.write_at(offset, &buf);
    }
}

fn push_locn(buf: &mut Vec<u8>, offset: u64, size: u64) {
    let mut entry = [0u8; 16];
    LittleEndian::write_u64(&mut entry[0..8], offset);
    LittleEndian::write_u64(&mut entry[8..16], size);
    buf.extend_from_slice(&entry);
}

impl BlockDevice for MemDisk {
    fn read_at(&self, sector: u64, offset: u64, len: usize) -> io::Result<Vec<u8>> {
        let start = (sector * SECTOR_SIZE + offset) as usize;
        let end = start + len;
        if end > self.bytes.len() {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "read past end of device"));
        }
        Ok(self.bytes[start..end].to_vec())
    }
}

/// Build a full MDA (header + ring contents) with a single `raw_locn`
/// pointing at `text`, written starting at `rlocn_offset` (which may be
/// beyond `mda_size`, to exercise the ring wrap). Returns the MDA bytes
/// (sized `mda_size + overhang` when wrapping, `mda_size` otherwise)
/// along with the parsed `MdaHeader` (`start`/`size` as written into
/// the header itself, not just the caller's `mda_size` argument).
pub fn build_mda(mda_size: usize, rlocn_offset: u64, text: &[u8]) -> (Vec<u8>, MdaHeader) {
    let rlocn = RawLocn {
        offset: rlocn_offset,
        size: text.len() as u64,
    };

    let end = rlocn_offset + text.len() as u64;
    let total = if end as usize > mda_size {
        end as usize
    } else {
        mda_size
    };

    let mut buf = vec![0u8; total.max(mda_size)];
    buf[4..20].copy_from_slice(b" LVM2 x[5A%r0N*>");
    LittleEndian::write_u32(&mut buf[20..24], 1);
    LittleEndian::write_u64(&mut buf[24..32], 0); // start: unused by dewrap, arbitrary here
    LittleEndian::write_u64(&mut buf[32..40], mda_size as u64);

    let raw_locns = &mut buf[40..64];
    LittleEndian::write_u64(&mut raw_locns[0..8], rlocn.offset);
    LittleEndian::write_u64(&mut raw_locns[8..16], rlocn.size);

    if end as usize <= mda_size {
        buf[rlocn_offset as usize..end as usize].copy_from_slice(text);
    } else {
        // Simulate a prior wrap: the ring write started near the end of
        // the buffer and looped back to just after the header.
        let first_part = mda_size - rlocn_offset as usize;
        buf[rlocn_offset as usize..mda_size].copy_from_slice(&text[..first_part]);
        let overhang = text.len() - first_part;
        let overhang_start = MDA_HEADER_SIZE;
        if buf.len() < overhang_start + overhang {
            buf.resize(overhang_start + overhang, 0);
        }
        buf[overhang_start..overhang_start + overhang].copy_from_slice(&text[first_part..]);
    }

    let mdah = MdaHeader {
        start: 0,
        size: mda_size as u64,
        rlocn,
    };

    (buf, mdah)
}
