// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[repr(transparent)]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TankId(String);

impl TankId {
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        TankId(id.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TankId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TankId {
    fn from(value: &str) -> Self {
        TankId(value.to_owned())
    }
}

impl From<String> for TankId {
    fn from(value: String) -> Self {
        TankId(value)
    }
}

#[repr(transparent)]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParcelId(String);

impl ParcelId {
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        ParcelId(id.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ParcelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ParcelId {
    fn from(value: &str) -> Self {
        ParcelId(value.to_owned())
    }
}

impl From<String> for ParcelId {
    fn from(value: String) -> Self {
        ParcelId(value)
    }
}

/// The pairing index shared by a port and a starboard tank.
///
/// Numbered cargo tanks carry the number parsed from their identifier. The stern slop
/// tanks carry [`PairIndex::SLOP`], a sentinel larger than any numbered index, so that
/// they sort as the sternmost pair.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PairIndex(u32);

impl PairIndex {
    pub const SLOP: PairIndex = PairIndex(9_999);

    #[inline]
    pub const fn new(index: u32) -> Self {
        PairIndex(index)
    }

    #[inline]
    pub const fn value(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_slop(self) -> bool {
        self.0 == Self::SLOP.0
    }
}

impl Display for PairIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_slop() {
            write!(f, "SLOP")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl From<u32> for PairIndex {
    fn from(value: u32) -> Self {
        PairIndex(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slop_sorts_after_numbered_pairs() {
        let mut v = vec![PairIndex::SLOP, PairIndex::new(12), PairIndex::new(1)];
        v.sort();
        assert_eq!(v, vec![PairIndex::new(1), PairIndex::new(12), PairIndex::SLOP]);
    }

    #[test]
    fn test_pair_index_display() {
        assert_eq!(format!("{}", PairIndex::new(3)), "3");
        assert_eq!(format!("{}", PairIndex::SLOP), "SLOP");
    }

    #[test]
    fn test_ids_display_inner_string() {
        assert_eq!(format!("{}", TankId::from("COT1P")), "COT1P");
        assert_eq!(ParcelId::new("A").as_str(), "A");
    }
}
