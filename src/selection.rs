//! Recorded pixel picks.

use image::Rgba;

use crate::pixels::{PixelCoord, PixelSample, hex_rgb};

/// One recorded pick: position plus the RGBA value read at that moment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRecord {
    pub x: u32,
    pub y: u32,
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl PixelRecord {
    pub fn new(x: u32, y: u32, color: Rgba<u8>) -> Self {
        let [r, g, b, a] = color.0;
        Self { x, y, r, g, b, a }
    }

    pub fn coord(&self) -> PixelCoord {
        PixelCoord::new(self.x, self.y)
    }

    pub fn color(&self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, self.a])
    }

    /// `#RRGGBB` (uppercase, alpha dropped).
    pub fn hex(&self) -> String {
        hex_rgb(self.color())
    }
}

impl From<PixelSample> for PixelRecord {
    fn from(sample: PixelSample) -> Self {
        Self::new(sample.coord.x, sample.coord.y, sample.color)
    }
}

/// Insertion-ordered list of picks.
///
/// Duplicates are kept: picking the same pixel twice gives two records.
/// Records are never edited in place; the list only grows by [`append`],
/// empties by [`clear`], or is swapped whole by [`replace_all`].
///
/// [`append`]: SelectionStore::append
/// [`clear`]: SelectionStore::clear
/// [`replace_all`]: SelectionStore::replace_all
#[derive(Clone, Debug, Default)]
pub struct SelectionStore {
    records: Vec<PixelRecord>,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: PixelRecord) {
        self.records.push(record);
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Swap in a whole new sequence (filter output).
    pub fn replace_all(&mut self, records: Vec<PixelRecord>) {
        self.records = records;
    }

    /// Current records in pick order.
    pub fn snapshot(&self) -> &[PixelRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
