// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The block-device collaborator interface.
//!
//! This crate never opens a device node, never enumerates `/dev`, and
//! never owns a file descriptor. A host embeds this crate by implementing
//! [`BlockDevice`] over whatever it already uses to talk to storage.

use std::io;

/// The number of bytes in one disk sector. Every offset this crate
/// hands back to a caller (bootloader sectors, PV header offsets) is
/// expressed in multiples of this.
pub const SECTOR_SIZE: u64 = 512;

/// Read-only access to a single block device, addressed the way LVM2's
/// on-disk structures address it: a sector number plus a byte offset
/// within that sector, and a length in bytes.
///
/// Implementations are expected to be synchronous and blocking; this
/// crate has no async story of its own (see the concurrency model in
/// the design notes) and calls this trait directly from ordinary
/// function bodies.
pub trait BlockDevice {
    /// Read `len` bytes starting `offset` bytes into `sector`.
    ///
    /// `sector * SECTOR_SIZE + offset` must not be assumed aligned to
    /// anything in particular; callers of this trait (the label
    /// scanner, the metadata reader) are responsible for sector math.
    fn read_at(&self, sector: u64, offset: u64, len: usize) -> io::Result<Vec<u8>>;
}
