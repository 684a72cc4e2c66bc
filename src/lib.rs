// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Read-only LVM2 physical-volume discovery and topology resolution.
//!
//! Given a [`BlockDevice`], [`detect`] locates the LVM2 label, reads the
//! binary PV header, dewraps and parses the ring-buffered VG metadata
//! text, and links every segment node to the PV or LV it names. The
//! installer helper [`embed`] uses only the label and PV header steps to
//! locate a PV's bootloader area.
//!
//! This crate does not write LVM metadata, talk to device-mapper, or
//! implement the diskfilter registry — see [`DiskFilterRegistry`] for
//! the interface a caller supplies for that.

mod bootloader;
mod cursor;
mod disk;
mod error;
mod label;
mod linker;
mod mda;
mod model;
mod pvheader;
mod registry;
mod util;
mod vgparse;

#[cfg(test)]
mod testsupport;

pub use bootloader::EmbedType;
pub use disk::{BlockDevice, SECTOR_SIZE};
pub use error::{Error, Result};
pub use model::{Lv, Node, NodeTarget, Pv, RaidLayout, Segment, SegmentType, Vg};
pub use registry::{DiskFilterRegistry, PvMapping};

use pvheader::PvHeader;

/// Scan `disk` for an LVM2 PV, parse its VG metadata, link the topology,
/// and register the result with `registry`.
///
/// Returns `Ok(None)` if no LVM2 label is present — this is the normal
/// "not an LVM device" outcome, not an error. If the VG's UUID is
/// already registered, the freshly parsed VG is discarded in favor of
/// the cached one (discovery is idempotent per VG).
pub fn detect<D, R>(disk: &D, registry: &mut R) -> Result<Option<Vg>>
where
    D: BlockDevice + ?Sized,
    R: DiskFilterRegistry,
{
    let location = match label::scan(disk)? {
        Some(loc) => loc,
        None => return Ok(None),
    };

    let pvh = PvHeader::parse(location.pvheader_bytes())?;
    let mda_locn = pvh.locate_metadata()?;

    let mda_bytes = disk.read_at(0, mda_locn.offset, mda_locn.size as usize)?;
    let mdah = mda::read_first_raw_locn(&mda_bytes)?;
    let (buf, limit) = mda::dewrap(&mda_bytes, &mdah)?;

    let text_start = mdah.rlocn.offset as usize;
    let mut vg = vgparse::parse_vg(&buf[text_start..], limit - text_start)?;

    if !vg.pvs.iter().any(|pv| pv.uuid == pvh.raw_uuid) {
        log::warn!("vg {:?} metadata does not mention the pv it was read from", vg.name);
    }

    if let Some(cached) = registry.get_vg_by_uuid(&vg.uuid) {
        log::debug!("vg {:?} already registered, reusing cached copy", vg.name);
        return Ok(Some(cached));
    }

    linker::link(&mut vg);

    if !registry.register_vg(vg.clone()) {
        log::debug!("vg {:?} lost a registration race, reusing cached copy", vg.name);
        return Ok(registry.get_vg_by_uuid(&vg.uuid));
    }

    Ok(Some(vg))
}

/// `true` if `disk` carries a readable LVM2 label. Does not parse or
/// register metadata.
pub fn has_pv<D: BlockDevice + ?Sized>(disk: &D) -> Result<bool> {
    Ok(label::scan(disk)?.is_some())
}

/// Locate the sector range of `disk`'s bootloader area.
pub fn embed<D, R>(disk: &D, registry: &R, max_nsectors: u64, embed_type: EmbedType) -> Result<Vec<u64>>
where
    D: BlockDevice + ?Sized,
    R: DiskFilterRegistry,
{
    bootloader::embed(disk, registry, max_nsectors, embed_type)
}
