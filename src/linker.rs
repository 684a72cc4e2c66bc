// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The topology linker.
//!
//! The text parser (`vgparse`) leaves every [`crate::model::Node`]
//! pointing at a bare name. This resolves each name against the VG's own
//! PV and LV lists, in place, so downstream consumers never have to
//! repeat the lookup.

use crate::model::{NodeTarget, Vg};

/// Resolve every segment node in `vg` to a PV, an LV, or neither. A name
/// that matches both a PV and an LV resolves to the PV: a name collision
/// between a PV and an LV is already a metadata anomaly, and the PV
/// namespace is authoritative for device topology.
pub fn link(vg: &mut Vg) {
    for lv_idx in 0..vg.lvs.len() {
        for seg_idx in 0..vg.lvs[lv_idx].segments.len() {
            for node_idx in 0..vg.lvs[lv_idx].segments[seg_idx].nodes.len() {
                let name = vg.lvs[lv_idx].segments[seg_idx].nodes[node_idx].name.clone();
                let target = match vg.pv_by_name(&name) {
                    Some(pv_idx) => NodeTarget::Pv(pv_idx),
                    None => match vg.lv_by_name(&name) {
                        Some(lv_idx) => NodeTarget::Lv(lv_idx),
                        None => {
                            log::warn!("node {name:?} resolves to neither a pv nor an lv in this vg");
                            NodeTarget::Unresolved
                        }
                    },
                };
                vg.lvs[lv_idx].segments[seg_idx].nodes[node_idx].target = target;
            }
        }
    }
}
