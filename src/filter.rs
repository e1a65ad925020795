//! Exact-match channel filter over the recorded picks.
//!
//! Filtering is destructive: the kept records replace the store contents
//! and whatever was dropped is gone. Repeating a filter therefore narrows
//! the set further; it never brings records back.

use crate::selection::{PixelRecord, SelectionStore};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    Red,
    Green,
    Blue,
    Alpha,
}

impl Channel {
    pub const ALL: [Channel; 4] = [Channel::Red, Channel::Green, Channel::Blue, Channel::Alpha];

    pub fn label(self) -> &'static str {
        match self {
            Channel::Red => "R",
            Channel::Green => "G",
            Channel::Blue => "B",
            Channel::Alpha => "A",
        }
    }

    pub fn value_of(self, record: &PixelRecord) -> u8 {
        match self {
            Channel::Red => record.r,
            Channel::Green => record.g,
            Channel::Blue => record.b,
            Channel::Alpha => record.a,
        }
    }
}

/// Optional per-channel equality constraints. `None` = unconstrained.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FilterSpec {
    pub r: Option<u8>,
    pub g: Option<u8>,
    pub b: Option<u8>,
    pub a: Option<u8>,
}

impl FilterSpec {
    pub fn get(&self, channel: Channel) -> Option<u8> {
        match channel {
            Channel::Red => self.r,
            Channel::Green => self.g,
            Channel::Blue => self.b,
            Channel::Alpha => self.a,
        }
    }

    pub fn set(&mut self, channel: Channel, value: Option<u8>) {
        match channel {
            Channel::Red => self.r = value,
            Channel::Green => self.g = value,
            Channel::Blue => self.b = value,
            Channel::Alpha => self.a = value,
        }
    }

    pub fn with(mut self, channel: Channel, value: u8) -> Self {
        self.set(channel, Some(value));
        self
    }

    /// No channel constrained: the filter keeps everything.
    pub fn is_unconstrained(&self) -> bool {
        Channel::ALL.iter().all(|&c| self.get(c).is_none())
    }

    /// Every active constraint equals the record's channel value.
    pub fn matches(&self, record: &PixelRecord) -> bool {
        Channel::ALL.iter().all(|&channel| match self.get(channel) {
            Some(target) => channel.value_of(record) == target,
            None => true,
        })
    }

    /// Records that satisfy every constraint, original order kept.
    pub fn apply(&self, records: &[PixelRecord]) -> Vec<PixelRecord> {
        records.iter().copied().filter(|r| self.matches(r)).collect()
    }
}

/// What a destructive filter pass did to the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FilterOutcome {
    pub kept: usize,
    pub removed: usize,
}

/// Filter the store in place: compute the kept subset, then swap it in.
pub fn filter_store(store: &mut SelectionStore, spec: &FilterSpec) -> FilterOutcome {
    let before = store.len();
    let kept = spec.apply(store.snapshot());
    let outcome = FilterOutcome {
        kept: kept.len(),
        removed: before - kept.len(),
    };
    store.replace_all(kept);
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn rec(x: u32, rgba: [u8; 4]) -> PixelRecord {
        PixelRecord::new(x, 0, Rgba(rgba))
    }

    fn sample_store() -> SelectionStore {
        let mut store = SelectionStore::new();
        store.append(rec(0, [255, 0, 0, 255]));
        store.append(rec(1, [255, 255, 0, 255]));
        store.append(rec(2, [255, 0, 0, 128]));
        store.append(rec(3, [0, 0, 0, 255]));
        store.append(rec(4, [255, 0, 0, 255]));
        store
    }

    fn xs(store: &SelectionStore) -> Vec<u32> {
        store.snapshot().iter().map(|r| r.x).collect()
    }

    #[test]
    fn test_single_channel_exact_match() {
        let mut store = sample_store();
        let outcome = filter_store(&mut store, &FilterSpec::default().with(Channel::Red, 255));
        assert_eq!(xs(&store), vec![0, 1, 2, 4]);
        assert_eq!(outcome, FilterOutcome { kept: 4, removed: 1 });
    }

    #[test]
    fn test_all_active_constraints_must_hold() {
        let mut store = sample_store();
        let spec = FilterSpec::default()
            .with(Channel::Red, 255)
            .with(Channel::Green, 0)
            .with(Channel::Alpha, 255);
        filter_store(&mut store, &spec);
        assert_eq!(xs(&store), vec![0, 4]);
    }

    #[test]
    fn test_equality_not_threshold() {
        let mut store = sample_store();
        filter_store(&mut store, &FilterSpec::default().with(Channel::Alpha, 254));
        assert!(store.is_empty());
    }

    #[test]
    fn test_unconstrained_spec_keeps_everything() {
        let mut store = sample_store();
        let spec = FilterSpec::default();
        assert!(spec.is_unconstrained());
        let outcome = filter_store(&mut store, &spec);
        assert_eq!(xs(&store), vec![0, 1, 2, 3, 4]);
        assert_eq!(outcome.removed, 0);
    }

    #[test]
    fn test_filters_are_cumulative() {
        let mut store = sample_store();
        filter_store(&mut store, &FilterSpec::default().with(Channel::Alpha, 255));
        assert_eq!(xs(&store), vec![0, 1, 3, 4]);
        // A looser second pass cannot bring back x=2.
        filter_store(&mut store, &FilterSpec::default().with(Channel::Red, 255));
        assert_eq!(xs(&store), vec![0, 1, 4]);
    }

    #[test]
    fn test_filter_on_empty_store() {
        let mut store = SelectionStore::new();
        let outcome = filter_store(&mut store, &FilterSpec::default().with(Channel::Blue, 1));
        assert_eq!(outcome, FilterOutcome { kept: 0, removed: 0 });
    }

    #[test]
    fn test_spec_get_set_round_trip() {
        let mut spec = FilterSpec::default();
        for (i, channel) in Channel::ALL.into_iter().enumerate() {
            spec.set(channel, Some(i as u8 * 10));
        }
        assert_eq!(spec, FilterSpec { r: Some(0), g: Some(10), b: Some(20), a: Some(30) });
        spec.set(Channel::Green, None);
        assert_eq!(spec.get(Channel::Green), None);
        assert!(!spec.is_unconstrained());
    }
}
