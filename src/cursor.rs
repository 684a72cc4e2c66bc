// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A bounds-checked forward cursor over the dewrapped metadata text.
//!
//! The reference discovery implementation this parser is modeled on
//! walks the buffer with raw pointers and relies on NUL bytes
//! surrounding the metadata region to stop runaway `strstr` scans. This
//! crate has no such safety net to lean on by accident, so every
//! advance here is checked against an explicit limit instead.

/// A `&[u8]` plus a read position that never advances past a fixed
/// limit, used by the anchor-based metadata parser so that no
/// search can run past `buffer[..mda_size + overhang]`.
pub struct Cursor<'a> {
    buf: &'a [u8],
    limit: usize,
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// `limit` bounds how far into `buf` this cursor is allowed to look;
    /// it is normally `mda_size + overhang`, not `buf.len()` (the working
    /// buffer is allocated at `2 * mda_size` but only the first part of
    /// that is populated).
    pub fn new(buf: &'a [u8], limit: usize) -> Cursor<'a> {
        Cursor {
            buf,
            limit: limit.min(buf.len()),
            pos: 0,
        }
    }

    pub fn at(buf: &'a [u8], start: usize, limit: usize) -> Cursor<'a> {
        let mut c = Cursor::new(buf, limit);
        c.pos = start.min(c.limit);
        c
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> &'a [u8] {
        &self.buf[self.pos..self.limit]
    }

    /// The byte at the cursor, if any remains before `limit`.
    pub fn peek(&self) -> Option<u8> {
        if self.pos < self.limit {
            Some(self.buf[self.pos])
        } else {
            None
        }
    }

    /// Advance one byte, if any remains before `limit`.
    pub fn bump(&mut self) {
        if self.pos < self.limit {
            self.pos += 1;
        }
    }

    /// Move the cursor to just past the end of `needle`'s first
    /// occurrence at or after the current position, bounded by `limit`.
    /// Returns `false` (cursor left unmoved) if not found in bounds.
    pub fn advance_past(&mut self, needle: &[u8]) -> bool {
        match find_subslice(self.remaining(), needle) {
            Some(off) => {
                self.pos += off + needle.len();
                true
            }
            None => false,
        }
    }

    /// Skip ASCII space/tab/newline/CR at the cursor.
    pub fn skip_ws(&mut self) {
        while self.pos < self.limit && self.buf[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    /// Read a token terminated by an ASCII space (the reference format
    /// always places exactly one space after a bare name token before
    /// its following `{` or ` = "`).
    pub fn take_until_space(&mut self) -> Option<&'a [u8]> {
        let start = self.pos;
        let rest = self.remaining();
        let off = rest.iter().position(|&b| b == b' ')?;
        self.pos += off;
        Some(&self.buf[start..self.pos])
    }

    /// Read a `"`-delimited string starting at the cursor (the opening
    /// quote must be the current byte).
    pub fn take_quoted(&mut self) -> Option<&'a [u8]> {
        if self.buf.get(self.pos) != Some(&b'"') {
            return None;
        }
        let start = self.pos + 1;
        let rest = &self.buf[start..self.limit];
        let off = rest.iter().position(|&b| b == b'"')?;
        self.pos = start + off + 1;
        Some(&self.buf[start..start + off])
    }

    /// Advance to, then consume, the next `"`, returning the quoted
    /// span (used when scanning forward for the next quoted token
    /// rather than requiring the cursor to sit exactly on the quote).
    pub fn find_quoted(&mut self) -> Option<&'a [u8]> {
        let rest = self.remaining();
        let open = rest.iter().position(|&b| b == b'"')?;
        self.pos += open;
        self.take_quoted()
    }

    /// Parse a decimal `u64` at the cursor, stopping at the first
    /// non-digit byte.
    pub fn take_u64(&mut self) -> Option<u64> {
        let rest = self.remaining();
        let end = rest.iter().position(|b| !b.is_ascii_digit()).unwrap_or(rest.len());
        if end == 0 {
            return None;
        }
        let val = std::str::from_utf8(&rest[..end]).ok()?.parse().ok()?;
        self.pos += end;
        Some(val)
    }

    /// `advance_past(needle)` followed by `skip_ws` then `take_u64`,
    /// the shape every `key = <u64>` anchor takes.
    pub fn read_u64_anchor(&mut self, key_eq: &[u8]) -> Option<u64> {
        if !self.advance_past(key_eq) {
            return None;
        }
        self.skip_ws();
        self.take_u64()
    }

    /// `advance_past(key_eq)` then read a quoted string, for `key = "..."`
    /// anchors.
    pub fn read_quoted_anchor(&mut self, key_eq: &[u8]) -> Option<&'a [u8]> {
        if !self.advance_past(key_eq) {
            return None;
        }
        self.skip_ws();
        self.take_quoted()
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}
