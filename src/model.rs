// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The in-memory topology: volume groups, physical volumes, logical
//! volumes and their segments.

/// A physical volume as declared inside a VG's `physical_volumes` block.
#[derive(Debug, PartialEq, Clone)]
pub struct Pv {
    /// VG-local name, e.g. `"pv0"`.
    pub name: String,
    /// Raw 32-character UUID.
    pub uuid: String,
    /// Sector offset of the first physical extent on disk.
    pub start_sector: u64,
}

/// One contiguous run of an LV's extent address space, with a single
/// mapping policy.
#[derive(Debug, PartialEq, Clone, Copy, Eq)]
pub enum SegmentType {
    Striped,
    Mirror,
    Raid4,
    Raid5,
    Raid6,
}

/// RAID4/5/6 parity geometry. Mirrors the consumer-facing layout enum a
/// downstream I/O mapping layer would switch on; this crate only ever
/// assigns the three combinations a parsed RAID4/5/6 segment can take.
#[derive(Debug, PartialEq, Clone, Copy, Eq, Default)]
pub struct RaidLayout {
    pub right_asymmetric: bool,
    pub left_asymmetric: bool,
    pub mul_from_pos: bool,
}

impl RaidLayout {
    pub const NONE: RaidLayout = RaidLayout {
        right_asymmetric: false,
        left_asymmetric: false,
        mul_from_pos: false,
    };

    pub const LEFT_ASYMMETRIC: RaidLayout = RaidLayout {
        left_asymmetric: true,
        ..Self::NONE
    };

    pub const LEFT_SYMMETRIC: RaidLayout = RaidLayout::NONE;

    pub const RIGHT_ASYMMETRIC_MUL_FROM_POS: RaidLayout = RaidLayout {
        right_asymmetric: true,
        mul_from_pos: true,
        ..Self::NONE
    };
}

/// What a [`Node`] resolved to after the topology linker ran.
///
/// A tagged enum rather than two `Option` fields so invariant #4 ("a
/// node resolves to a PV XOR an LV XOR neither") is a compile-time
/// guarantee instead of something tests have to check.
#[derive(Debug, PartialEq, Clone, Eq)]
pub enum NodeTarget {
    /// Index into the owning `Vg::pvs`.
    Pv(usize),
    /// Index into the owning `Vg::lvs`.
    Lv(usize),
    /// Neither a PV nor an LV in the same VG had this name.
    Unresolved,
}

/// One leg of a segment: a named target plus the target-relative start
/// offset, in sectors.
#[derive(Debug, PartialEq, Clone)]
pub struct Node {
    /// The name as written in the metadata text (a PV or LV name).
    pub name: String,
    /// Start offset inside the target, in sectors.
    pub start: u64,
    /// Resolved by the topology linker; `Unresolved` until then.
    pub target: NodeTarget,
}

/// A contiguous mapped range of an LV's extents.
#[derive(Debug, PartialEq, Clone)]
pub struct Segment {
    pub start_extent: u64,
    pub extent_count: u64,
    pub ty: SegmentType,
    /// In VG extents. Absent (`None`) for single-node striped segments.
    pub stripe_size: Option<u64>,
    pub layout: RaidLayout,
    pub nodes: Vec<Node>,
}

impl Segment {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

/// A logical volume: a VG-local virtual block device built from segments.
#[derive(Debug, PartialEq, Clone)]
pub struct Lv {
    pub name: String,
    /// `"lvm/" + escape(vg.name) + "-" + escape(lv.name)`.
    pub full_name: String,
    /// `"lvmid/" + vg.uuid + "/" + lv.uuid`.
    pub id_name: String,
    pub uuid: String,
    pub visible: bool,
    /// Sum of `extent_count * vg.extent_size` across all segments, in
    /// sectors.
    pub size: u64,
    pub segments: Vec<Segment>,
}

/// A fully parsed and linked volume group.
#[derive(Debug, PartialEq, Clone)]
pub struct Vg {
    pub name: String,
    /// Raw 32-character UUID.
    pub uuid: String,
    /// Always 32; kept as a field rather than an assumed constant so
    /// `vg.uuid_len == 32` is a checkable invariant on every parsed VG.
    pub uuid_len: usize,
    /// Sectors per extent.
    pub extent_size: u64,
    pub pvs: Vec<Pv>,
    pub lvs: Vec<Lv>,
}

impl Vg {
    pub fn pv_by_name(&self, name: &str) -> Option<usize> {
        self.pvs.iter().position(|pv| pv.name == name)
    }

    pub fn lv_by_name(&self, name: &str) -> Option<usize> {
        self.lvs.iter().position(|lv| lv.name == name)
    }
}
