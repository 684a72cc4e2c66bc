// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Small helpers shared across the discovery pipeline: UUID formatting,
//! and the `-` escaping rule `full_name` uses.

/// Positions (in the 32-character raw UUID) after which a dash is
/// inserted to produce the display form `XX-XXXX-XXXX-XXXX-XXXX-XXXX-XXXXXX`.
const DASH_AFTER: [usize; 7] = [2, 6, 10, 14, 18, 22, 26];

/// Render a raw 32-character LVM UUID in its canonical dashed display
/// form. Used only for PV display names; the raw form is what's stored
/// and compared internally.
pub fn hyphenate_uuid(raw: &str) -> String {
    debug_assert_eq!(raw.len(), 32);

    let mut out = String::with_capacity(32 + DASH_AFTER.len());
    for (i, c) in raw.chars().enumerate() {
        out.push(c);
        if DASH_AFTER.contains(&(i + 1)) {
            out.push('-');
        }
    }
    out
}

/// True if `s` is exactly 32 ASCII alphanumeric characters, the shape
/// every LVM UUID read off disk must have.
pub fn is_valid_raw_uuid(s: &str) -> bool {
    s.len() == 32 && s.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Escape a VG or LV name component for inclusion in `full_name`: every
/// `-` is doubled. Invertible by splitting on single, unescaped `-`.
pub fn escape_hyphens(name: &str) -> String {
    name.replace('-', "--")
}
