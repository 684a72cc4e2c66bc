// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The MDA header and ring-buffer dewrap.
//!
//! The metadata area is a circular text buffer. A write can wrap past
//! its end back to just after the header; this module reconstructs a
//! flat, contiguous view of the current generation of text so the
//! anchor-based parser in [`crate::vgparse`] never has to think about
//! wraparound.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{Error, Result};

pub const MDA_HEADER_SIZE: usize = 512;
const FMTT_MAGIC: &[u8; 16] = b" LVM2 x[5A%r0N*>";
const FMTT_VERSION: u32 = 1;

/// A `raw_locn` entry: where inside the MDA ring the current generation
/// of metadata text lives.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct RawLocn {
    pub offset: u64,
    pub size: u64,
}

/// The mda_header's own `start`/`size` fields plus its first `raw_locn`
/// entry. `start`/`size` describe the metadata area as the header
/// itself declares it, distinct from the `DiskLocn` the PV header's
/// data-area list supplied to locate this area on disk in the first
/// place.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct MdaHeader {
    pub start: u64,
    pub size: u64,
    pub rlocn: RawLocn,
}

/// Parse the mda_header at the start of `buf` (which must be at least
/// [`MDA_HEADER_SIZE`] bytes), returning its `start`/`size` fields and
/// its first `raw_locn` entry. Only the first `raw_locn` is ever
/// consumed.
pub fn read_first_raw_locn(buf: &[u8]) -> Result<MdaHeader> {
    if buf.len() < MDA_HEADER_SIZE {
        return Err(Error::BadMetadata("MDA header buffer too short".to_string()));
    }

    if &buf[4..20] != FMTT_MAGIC {
        return Err(Error::BadMetadata(format!(
            "MDA magic mismatch: {:?}",
            String::from_utf8_lossy(&buf[4..20])
        )));
    }

    let version = LittleEndian::read_u32(&buf[20..24]);
    if version != FMTT_VERSION {
        return Err(Error::NotImplemented("unsupported LVM2 metadata version"));
    }

    let start = LittleEndian::read_u64(&buf[24..32]);
    let size = LittleEndian::read_u64(&buf[32..40]);

    let raw_locns = &buf[40..];
    if raw_locns.len() < 24 {
        return Err(Error::BadMetadata("no raw_locn entries in MDA header".to_string()));
    }

    let rlocn = RawLocn {
        offset: LittleEndian::read_u64(&raw_locns[0..8]),
        size: LittleEndian::read_u64(&raw_locns[8..16]),
    };

    Ok(MdaHeader { start, size, rlocn })
}

/// Dewrap the ring buffer: given the MDA contents read straight off
/// disk and its parsed header, produce a flat buffer such that
/// `buffer[rlocn.offset..]` onward is the contiguous metadata text,
/// with a usable bound of `mda_size + overhang`. The wrap boundary is
/// the header's own declared `size`, not the PV header's area
/// descriptor that was used to locate and read this area.
///
/// Returns `(buffer, usable_limit)`.
pub fn dewrap(mda: &[u8], mdah: &MdaHeader) -> Result<(Vec<u8>, usize)> {
    let rlocn = mdah.rlocn;
    let mda_size = mdah.size as usize;
    if mda.len() < mda_size {
        return Err(Error::BadMetadata("MDA buffer shorter than mda_size".to_string()));
    }

    let end = rlocn
        .offset
        .checked_add(rlocn.size)
        .ok_or_else(|| Error::BadMetadata("raw_locn offset+size overflow".to_string()))?;

    if end <= mda_size as u64 {
        // No wrap: the text already sits entirely within [0, mda_size).
        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(mda_size)
            .map_err(|_| Error::OutOfMemory(mda_size))?;
        buffer.extend_from_slice(&mda[..mda_size]);
        return Ok((buffer, mda_size));
    }

    let overhang = (end - mda_size as u64) as usize;
    let total = mda_size
        .checked_add(overhang)
        .ok_or_else(|| Error::BadMetadata("ring-wrap overhang overflow".to_string()))?;

    if total > mda_size * 2 {
        return Err(Error::BadMetadata(
            "ring-wrap copy would exceed the 2 * mda_size working buffer".to_string(),
        ));
    }
    if MDA_HEADER_SIZE + overhang > mda.len() {
        return Err(Error::BadMetadata(
            "ring-wrap source range runs past the MDA buffer".to_string(),
        ));
    }

    let working_cap = mda_size * 2;
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(working_cap)
        .map_err(|_| Error::OutOfMemory(working_cap))?;
    buffer.extend_from_slice(&mda[..mda_size]);
    buffer.extend_from_slice(&mda[MDA_HEADER_SIZE..MDA_HEADER_SIZE + overhang]);

    log::trace!("dewrapped ring buffer: mda_size={mda_size} overhang={overhang}");

    Ok((buffer, total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testsupport::build_mda;

    #[test]
    fn non_wrapping_locn_is_a_straight_copy() {
        let mda_size = 4096usize;
        let text = b"vg0 { id = \"x\" }\n";
        let (mda, mdah) = build_mda(mda_size, MDA_HEADER_SIZE as u64, text);
        let (buf, limit) = dewrap(&mda, &mdah).unwrap();
        let end = mdah.rlocn.offset as usize + text.len();
        assert!(end <= limit);
        assert_eq!(&buf[mdah.rlocn.offset as usize..end], &text[..]);
    }

    #[test]
    fn wrapping_locn_reassembles_contiguous_text() {
        let mda_size = 4096usize;
        let text = b"0123456789abcdefghij"; // 20 bytes
        let offset = mda_size as u64 - 10;
        let (mda, mdah) = build_mda(mda_size, offset, text);
        let (buf, limit) = dewrap(&mda, &mdah).unwrap();
        let got = &buf[mdah.rlocn.offset as usize..limit];
        assert_eq!(got, &text[..]);
    }

    #[test]
    fn header_size_field_is_authoritative_over_a_larger_pv_header_area_read() {
        // A caller sizes its disk read off the PV header's data-area
        // descriptor, which need not match what the MDA header itself
        // declares. Extra bytes fetched past the header's own `size`
        // must not shift the wrap boundary.
        let header_size = 2048usize;
        let text = b"0123456789"; // 10 bytes
        let offset = header_size as u64 - 4;
        let (mut mda, mdah) = build_mda(header_size, offset, text);
        mda.extend_from_slice(&[0xAAu8; 512]);
        let (buf, limit) = dewrap(&mda, &mdah).unwrap();
        let got = &buf[mdah.rlocn.offset as usize..limit];
        assert_eq!(got, &text[..]);
    }

    #[test]
    fn bad_magic_is_rejected() {
        let mut mda = vec![0u8; MDA_HEADER_SIZE + 16];
        mda[4..20].copy_from_slice(b"not the magic!!!");
        assert!(read_first_raw_locn(&mda).is_err());
    }
}
