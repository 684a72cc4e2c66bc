// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The error taxonomy this crate raises during discovery.

use std::io;

use thiserror::Error;

/// Everything that can go wrong while scanning, parsing or linking an
/// LVM2 physical volume.
#[derive(Debug, Error)]
pub enum Error {
    /// The label scan exhausted [`crate::label::LABEL_SCAN_SECTORS`] without
    /// finding `LABELONE`. Internal plumbing only: the public entry points
    /// (`detect`, `has_pv`) fold this down to `Ok(None)` / `Ok(false)`
    /// rather than handing it to the caller as an `Err`.
    #[error("no LVM2 signature found")]
    NoSignature,

    /// A feature this reader deliberately does not support was present
    /// on disk: a second data area, an unknown metadata format version,
    /// or an embed type other than PC-BIOS.
    #[error("not implemented: {0}")]
    NotImplemented(&'static str),

    /// The metadata text region failed to parse: bad magic, a missing
    /// anchor, or a ring-wrap that would read past the working buffer.
    #[error("bad LVM2 metadata: {0}")]
    BadMetadata(String),

    /// The installer helper refused to proceed: the boot sector is
    /// occupied, or no usable bootloader area exists.
    #[error("bad device: {0}")]
    BadDevice(String),

    /// A ring-dewrap buffer allocation was rejected because the
    /// on-disk `mda_size` would have required an unreasonable amount
    /// of memory.
    #[error("out of memory allocating {0} bytes")]
    OutOfMemory(usize),

    /// The [`crate::disk::BlockDevice`] collaborator failed a read.
    #[error("disk read failed: {0}")]
    Io(#[from] io::Error),
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;
