// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The anchor-based VG metadata parser.
//!
//! This is deliberately not a general grammar for the LVM text format.
//! The reference discovery code never builds a parse tree; it walks the
//! dewrapped buffer once, left to right, searching for a fixed sequence
//! of literal anchors (`"id = \""`, `"extent_size = "`, `"physical_volumes {"`,
//! ...) and reading the value that follows each one. A key it doesn't
//! recognize is simply skipped over by the next anchor's search. The
//! anchors and their order are fixed by the on-disk metadata grammar,
//! not inferred at runtime.

use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::model::{Lv, Node, NodeTarget, Pv, RaidLayout, Segment, SegmentType, Vg};
use crate::util::{escape_hyphens, is_valid_raw_uuid};

fn missing(what: &'static str) -> Error {
    Error::BadMetadata(format!("missing anchor: {what}"))
}

fn uuid_from(cur: &mut Cursor, what: &'static str) -> Result<String> {
    let raw = cur.read_quoted_anchor(b"id = \"").ok_or_else(|| missing(what))?;
    let raw = std::str::from_utf8(raw).map_err(|_| Error::BadMetadata(format!("{what} id is not utf-8")))?;
    if !is_valid_raw_uuid(raw) {
        return Err(Error::BadMetadata(format!("{what} id {raw:?} is not a 32-character uuid")));
    }
    Ok(raw.to_string())
}

/// Parse a dewrapped metadata buffer (`buf[..limit]`) into a [`Vg`].
pub fn parse_vg(buf: &[u8], limit: usize) -> Result<Vg> {
    let mut cur = Cursor::new(buf, limit);

    let name = cur.take_until_space().ok_or_else(|| missing("vg name"))?;
    let name = std::str::from_utf8(name)
        .map_err(|_| Error::BadMetadata("vg name is not utf-8".to_string()))?
        .to_string();
    if name.is_empty() {
        return Err(Error::BadMetadata("vg name is empty".to_string()));
    }

    let uuid = uuid_from(&mut cur, "vg")?;

    let extent_size = cur
        .read_u64_anchor(b"extent_size = ")
        .ok_or_else(|| missing("extent_size"))?;

    let pvs = parse_pvs(&mut cur)?;

    let mut vg = Vg {
        name,
        uuid,
        uuid_len: 32,
        extent_size,
        pvs,
        lvs: Vec::new(),
    };

    vg.lvs = parse_lvs(&mut cur, &vg)?;

    Ok(vg)
}

fn parse_pvs(cur: &mut Cursor) -> Result<Vec<Pv>> {
    if !cur.advance_past(b"physical_volumes {") {
        return Err(missing("physical_volumes {"));
    }

    let mut pvs = Vec::new();
    loop {
        cur.skip_ws();
        match cur.peek() {
            Some(b'}') => {
                cur.bump();
                break;
            }
            Some(_) => {}
            None => return Err(missing("physical_volumes }")),
        }

        let name = cur.take_until_space().ok_or_else(|| missing("pv name"))?;
        let name = std::str::from_utf8(name)
            .map_err(|_| Error::BadMetadata("pv name is not utf-8".to_string()))?
            .to_string();
        if name.is_empty() || pvs.iter().any(|p: &Pv| p.name == name) {
            return Err(Error::BadMetadata(format!("pv name {name:?} is empty or duplicated")));
        }

        let uuid = uuid_from(cur, "pv")?;
        let pe_start = cur.read_u64_anchor(b"pe_start = ").ok_or_else(|| missing("pe_start"))?;
        if !cur.advance_past(b"}") {
            return Err(missing("pv entry }"));
        }

        pvs.push(Pv {
            name,
            uuid,
            start_sector: pe_start,
        });
    }

    Ok(pvs)
}

fn parse_status_flags(cur: &mut Cursor) -> Result<(bool, bool)> {
    if !cur.advance_past(b"status = [") {
        return Ok((false, false));
    }

    let mut visible = false;
    let mut is_pvmove = false;
    loop {
        cur.skip_ws();
        match cur.peek() {
            Some(b']') => {
                cur.bump();
                break;
            }
            Some(b',') => cur.bump(),
            Some(b'"') => {
                let tok = cur.take_quoted().ok_or_else(|| missing("status flag"))?;
                visible |= tok == b"VISIBLE";
                is_pvmove |= tok == b"PVMOVE";
            }
            _ => return Err(Error::BadMetadata("malformed status list".to_string())),
        }
    }

    Ok((visible, is_pvmove))
}

fn parse_lvs(cur: &mut Cursor, vg: &Vg) -> Result<Vec<Lv>> {
    if !cur.advance_past(b"logical_volumes {") {
        // Absent entirely is legal: a VG need not have any LVs yet.
        return Ok(Vec::new());
    }

    let mut lvs = Vec::new();
    loop {
        cur.skip_ws();
        match cur.peek() {
            Some(b'}') => {
                cur.bump();
                break;
            }
            Some(_) => {}
            None => return Err(missing("logical_volumes }")),
        }

        if let Some(lv) = parse_one_lv(cur, vg)? {
            if lvs.iter().any(|l: &Lv| l.name == lv.name) {
                return Err(Error::BadMetadata(format!("lv name {:?} is duplicated", lv.name)));
            }
            lvs.push(lv);
        }
    }

    Ok(lvs)
}

/// Parse one `lvname { ... }` entry. Returns `None` if the LV was
/// discarded because one of its segments had an unrecognized `type`
/// (not a VG-level error; parsing continues with the next LV).
fn parse_one_lv(cur: &mut Cursor, vg: &Vg) -> Result<Option<Lv>> {
    let name = cur.take_until_space().ok_or_else(|| missing("lv name"))?;
    let name = std::str::from_utf8(name)
        .map_err(|_| Error::BadMetadata("lv name is not utf-8".to_string()))?
        .to_string();
    if name.is_empty() {
        return Err(Error::BadMetadata("lv name is empty".to_string()));
    }

    let uuid = uuid_from(cur, "lv")?;
    let (visible, is_pvmove) = parse_status_flags(cur)?;
    let segment_count = cur
        .read_u64_anchor(b"segment_count = ")
        .ok_or_else(|| missing("segment_count"))?;

    let mut segments = Vec::with_capacity(segment_count as usize);
    let mut skip = false;
    let mut size = 0u64;

    for _ in 0..segment_count {
        match parse_one_segment(cur, is_pvmove, vg.extent_size)? {
            Some(seg) => {
                size += seg.extent_count * vg.extent_size;
                segments.push(seg);
            }
            None => skip = true,
        }
    }

    // Closes the LV's own `{`.
    if !cur.advance_past(b"}") {
        return Err(missing("lv entry }"));
    }

    if skip {
        log::debug!("discarding lv {name:?}: unsupported segment type");
        return Ok(None);
    }

    let full_name = format!("lvm/{}-{}", escape_hyphens(&vg.name), escape_hyphens(&name));
    let id_name = format!("lvmid/{}/{}", vg.uuid, uuid);

    Ok(Some(Lv {
        name,
        full_name,
        id_name,
        uuid,
        visible,
        size,
        segments,
    }))
}

/// Parse one `segmentN { ... }` entry. Returns `None` (not an error) if
/// `type` isn't one of the five recognized values.
fn parse_one_segment(cur: &mut Cursor, is_pvmove: bool, extent_size: u64) -> Result<Option<Segment>> {
    if !cur.advance_past(b"segment") {
        return Err(missing("segment"));
    }

    let start_extent = cur
        .read_u64_anchor(b"start_extent = ")
        .ok_or_else(|| missing("start_extent"))?;
    let extent_count = cur
        .read_u64_anchor(b"extent_count = ")
        .ok_or_else(|| missing("extent_count"))?;
    let ty = cur.read_quoted_anchor(b"type = \"").ok_or_else(|| missing("type"))?;
    let ty = ty.to_vec();

    let result = match ty.as_slice() {
        b"striped" => Some(parse_striped(cur, start_extent, extent_count, extent_size)?),
        b"mirror" | b"raid1" => Some(parse_mirror(cur, start_extent, extent_count, is_pvmove)?),
        b"raid4" => Some(parse_raid(cur, start_extent, extent_count, SegmentType::Raid4)?),
        b"raid5" => Some(parse_raid(cur, start_extent, extent_count, SegmentType::Raid5)?),
        b"raid6" => Some(parse_raid(cur, start_extent, extent_count, SegmentType::Raid6)?),
        other => {
            log::debug!("unsupported segment type {:?}", String::from_utf8_lossy(other));
            None
        }
    };

    // Closes this segment's own `{`, whether or not its type was
    // recognized: a segment body has no nested braces.
    if !cur.advance_past(b"}") {
        return Err(missing("segment }"));
    }

    Ok(result)
}

fn parse_striped(cur: &mut Cursor, start_extent: u64, extent_count: u64, extent_size: u64) -> Result<Segment> {
    let node_count = cur
        .read_u64_anchor(b"stripe_count = ")
        .ok_or_else(|| missing("stripe_count"))?;

    let stripe_size = if node_count != 1 {
        Some(cur.read_u64_anchor(b"stripe_size = ").ok_or_else(|| missing("stripe_size"))?)
    } else {
        None
    };

    if !cur.advance_past(b"stripes = [") {
        return Err(missing("stripes = ["));
    }

    let mut nodes = Vec::with_capacity(node_count as usize);
    for _ in 0..node_count {
        let name = cur.find_quoted().ok_or_else(|| missing("stripe pv name"))?;
        let name = String::from_utf8_lossy(name).into_owned();
        if !cur.advance_past(b",") {
            return Err(missing("stripe comma"));
        }
        cur.skip_ws();
        let extent = cur.take_u64().ok_or_else(|| missing("stripe extent offset"))?;
        nodes.push(Node {
            name,
            start: extent * extent_size,
            target: NodeTarget::Unresolved,
        });
    }

    Ok(Segment {
        start_extent,
        extent_count,
        ty: SegmentType::Striped,
        stripe_size,
        layout: RaidLayout::NONE,
        nodes,
    })
}

fn parse_mirror(cur: &mut Cursor, start_extent: u64, extent_count: u64, is_pvmove: bool) -> Result<Segment> {
    let node_count = cur
        .read_u64_anchor(b"mirror_count = ")
        .ok_or_else(|| missing("mirror_count"))?;

    if !cur.advance_past(b"mirrors = [") {
        return Err(missing("mirrors = ["));
    }

    let mut nodes = Vec::with_capacity(node_count as usize);
    for _ in 0..node_count {
        let name = cur.find_quoted().ok_or_else(|| missing("mirror leg name"))?;
        nodes.push(Node {
            name: String::from_utf8_lossy(name).into_owned(),
            start: 0,
            target: NodeTarget::Unresolved,
        });
    }

    if is_pvmove {
        nodes.truncate(1);
    }

    Ok(Segment {
        start_extent,
        extent_count,
        ty: SegmentType::Mirror,
        stripe_size: None,
        layout: RaidLayout::NONE,
        nodes,
    })
}

fn parse_raid(cur: &mut Cursor, start_extent: u64, extent_count: u64, ty: SegmentType) -> Result<Segment> {
    let node_count = cur
        .read_u64_anchor(b"device_count = ")
        .ok_or_else(|| missing("device_count"))?;
    let stripe_size = cur
        .read_u64_anchor(b"stripe_size = ")
        .ok_or_else(|| missing("stripe_size"))?;

    if !cur.advance_past(b"raids = [") {
        return Err(missing("raids = ["));
    }

    let mut nodes = Vec::with_capacity(node_count as usize);
    for _ in 0..node_count {
        // Each triple is `"metadata-lv", "data-lv", 0` (or "" for a
        // missing metadata sub-lv); only the data device name matters
        // to topology linking.
        cur.find_quoted().ok_or_else(|| missing("raid metadata name"))?;
        let data = cur.find_quoted().ok_or_else(|| missing("raid data name"))?;
        nodes.push(Node {
            name: String::from_utf8_lossy(data).into_owned(),
            start: 0,
            target: NodeTarget::Unresolved,
        });
    }

    let layout = match ty {
        SegmentType::Raid4 => RaidLayout::LEFT_ASYMMETRIC,
        SegmentType::Raid5 => RaidLayout::LEFT_SYMMETRIC,
        SegmentType::Raid6 => RaidLayout::RIGHT_ASYMMETRIC_MUL_FROM_POS,
        _ => unreachable!("parse_raid only called for raid4/5/6"),
    };

    if ty == SegmentType::Raid4 && !nodes.is_empty() {
        let first = nodes.remove(0);
        nodes.push(first);
    }

    Ok(Segment {
        start_extent,
        extent_count,
        ty,
        stripe_size: Some(stripe_size),
        layout,
        nodes,
    })
}
