// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Demonstration CLI: scan a flat file (or block device) for an LVM2 PV
//! and print the resolved VG. Not part of the library's public
//! contract — a minimal stand-in for the `BlockDevice` and
//! `DiskFilterRegistry` collaborators a real host would supply.

use std::collections::HashMap;
use std::fs::File;
use std::io;
use std::os::unix::fs::FileExt;
use std::sync::Mutex;

use lvm2_resolve::{BlockDevice, DiskFilterRegistry, PvMapping, SECTOR_SIZE, Vg};

struct FileDisk(Mutex<File>);

impl BlockDevice for FileDisk {
    fn read_at(&self, sector: u64, offset: u64, len: usize) -> io::Result<Vec<u8>> {
        let pos = sector * SECTOR_SIZE + offset;
        let mut buf = vec![0u8; len];
        let file = self.0.lock().unwrap();
        file.read_exact_at(&mut buf, pos)?;
        Ok(buf)
    }
}

#[derive(Default)]
struct MemRegistry {
    by_uuid: HashMap<String, Vg>,
}

impl DiskFilterRegistry for MemRegistry {
    fn get_vg_by_uuid(&self, uuid: &str) -> Option<Vg> {
        self.by_uuid.get(uuid).cloned()
    }

    fn register_vg(&mut self, vg: Vg) -> bool {
        if self.by_uuid.contains_key(&vg.uuid) {
            return false;
        }
        self.by_uuid.insert(vg.uuid.clone(), vg);
        true
    }

    fn get_pv_from_disk(&self, pv_uuid: &str) -> Option<PvMapping> {
        self.by_uuid.values().find_map(|vg| {
            vg.pvs
                .iter()
                .find(|pv| pv.uuid == pv_uuid)
                .map(|_| PvMapping { vg_uuid: vg.uuid.clone() })
        })
    }
}

fn main() {
    env_logger::init();

    let path = match std::env::args().nth(1) {
        Some(p) => p,
        None => {
            eprintln!("usage: lvmscan <path-to-device-or-image>");
            std::process::exit(2);
        }
    };

    let file = match File::open(&path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("failed to open {path}: {e}");
            std::process::exit(1);
        }
    };
    let disk = FileDisk(Mutex::new(file));
    let mut registry = MemRegistry::default();

    match lvm2_resolve::detect(&disk, &mut registry) {
        Ok(Some(vg)) => println!("{vg:#?}"),
        Ok(None) => println!("no LVM2 signature found on {path}"),
        Err(e) => {
            eprintln!("discovery failed: {e}");
            std::process::exit(1);
        }
    }
}
