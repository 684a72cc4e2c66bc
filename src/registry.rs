// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The diskfilter registry collaborator interface.
//!
//! LVM2's `diskfilter` layer is a process-wide, externally synchronized
//! table of known volume groups and PV-to-VG mappings. This crate never
//! implements that table; it only calls into it through this capability
//! trait, which a host supplies at the call site of [`crate::detect`] or
//! [`crate::embed`]. No locking happens here — the registry's own
//! synchronization is assumed per the concurrency model.

use crate::model::Vg;

/// A PV-to-VG mapping as already known to the registry, returned by
/// [`DiskFilterRegistry::get_pv_from_disk`].
#[derive(Debug, Clone)]
pub struct PvMapping {
    /// The UUID of the VG this PV belongs to.
    pub vg_uuid: String,
}

/// The capability surface this crate needs from the diskfilter registry.
pub trait DiskFilterRegistry {
    /// Look up an already-registered VG by its 32-character UUID.
    fn get_vg_by_uuid(&self, uuid: &str) -> Option<Vg>;

    /// Register a newly parsed and linked VG.
    ///
    /// Implementations must reject (return `false`) a VG whose UUID is
    /// already present; on rejection the caller discards the freshly
    /// built `Vg` rather than retrying.
    fn register_vg(&mut self, vg: Vg) -> bool;

    /// Resolve a disk to the PV/VG it was last seen to belong to, if the
    /// registry already has that association cached. Used only for its
    /// side effect of confirming prior discovery in the bootloader-area
    /// locator; the return value there is not inspected.
    fn get_pv_from_disk(&self, pv_uuid: &str) -> Option<PvMapping>;
}
