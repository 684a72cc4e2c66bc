// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The binary PV header reader.
//!
//! Layout (little-endian): `pv_uuid[32]`, `pv_size_xl(u64)`, a
//! null-terminated list of data-area `{offset, size}` descriptors, a
//! null-terminated list of metadata-area descriptors, and optionally an
//! extended header (`version_xl`, `flags_xl`, a null-terminated list of
//! bootloader-area descriptors).

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{Error, Result};
use crate::util::hyphenate_uuid;

const UUID_LEN: usize = 32;
const DISK_LOCN_LEN: usize = 16; // offset(u64) + size(u64)

/// A `{offset, size}` descriptor, in bytes.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct DiskLocn {
    pub offset: u64,
    pub size: u64,
}

/// The parsed binary PV header.
#[derive(Debug, PartialEq, Clone)]
pub struct PvHeader {
    /// Dashed display-form UUID (see [`hyphenate_uuid`]); the raw form
    /// used for equality against VG-text `id` fields is `raw_uuid`.
    pub uuid_display: String,
    pub raw_uuid: String,
    pub size: u64,
    pub data_areas: Vec<DiskLocn>,
    pub metadata_areas: Vec<DiskLocn>,
    ext_version: u32,
    pub bootloader_areas: Vec<DiskLocn>,
}

/// Read a null-terminated list of `DiskLocn`s starting at `buf[0..]`.
/// Returns the parsed list and the byte count consumed, *including* the
/// null terminator entry.
fn read_locn_list(buf: &[u8]) -> Result<(Vec<DiskLocn>, usize)> {
    let mut out = Vec::new();
    let mut pos = 0;

    loop {
        if pos + DISK_LOCN_LEN > buf.len() {
            return Err(Error::BadMetadata(
                "PV header disk_locn list runs past buffer".to_string(),
            ));
        }
        let offset = LittleEndian::read_u64(&buf[pos..pos + 8]);
        let size = LittleEndian::read_u64(&buf[pos + 8..pos + 16]);
        pos += DISK_LOCN_LEN;

        if offset == 0 {
            return Ok((out, pos));
        }
        out.push(DiskLocn { offset, size });
    }
}

impl PvHeader {
    /// Parse the PV header out of the bytes immediately following the
    /// label header (i.e. `label_buf[offset_xl..]`).
    pub fn parse(buf: &[u8]) -> Result<PvHeader> {
        if buf.len() < UUID_LEN + 8 {
            return Err(Error::BadMetadata("PV header buffer too short".to_string()));
        }

        let raw_uuid = String::from_utf8_lossy(&buf[..UUID_LEN]).into_owned();
        let size = LittleEndian::read_u64(&buf[UUID_LEN..UUID_LEN + 8]);

        let mut cursor = &buf[UUID_LEN + 8..];

        let (data_areas, consumed) = read_locn_list(cursor)?;
        cursor = &cursor[consumed..];

        let (metadata_areas, consumed) = read_locn_list(cursor)?;
        cursor = &cursor[consumed..];

        let (ext_version, bootloader_areas) = if cursor.len() >= 8 {
            let version = LittleEndian::read_u32(&cursor[0..4]);
            if version == 0 {
                (0, Vec::new())
            } else {
                let cursor = &cursor[8..];
                let (areas, _) = read_locn_list(cursor)?;
                (version, areas)
            }
        } else {
            (0, Vec::new())
        };

        Ok(PvHeader {
            uuid_display: hyphenate_uuid(&raw_uuid),
            raw_uuid,
            size,
            data_areas,
            metadata_areas,
            ext_version,
            bootloader_areas,
        })
    }

    /// Locate the first metadata area. Fails with `NotImplemented` if a
    /// second data area is declared: at most one data area is supported.
    pub fn locate_metadata(&self) -> Result<DiskLocn> {
        if self.data_areas.len() > 1 {
            return Err(Error::NotImplemented("multiple LVM data areas"));
        }

        self.metadata_areas
            .first()
            .copied()
            .ok_or_else(|| Error::BadMetadata("no metadata area in PV header".to_string()))
    }

    /// Locate the first bootloader area. `None` means "no bootloader
    /// area" rather than an error; callers translate that into
    /// `BadDevice` at the API boundary.
    pub fn locate_bootloader_area(&self) -> Option<DiskLocn> {
        if self.ext_version == 0 {
            return None;
        }
        self.bootloader_areas.first().copied()
    }
}
