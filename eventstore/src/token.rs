//! The gap-aware tracking token: the position type carried by global-stream
//! readers.
//!
//! An auto-increment global index alone is not sufficient because
//! uncommitted transactions leave visible holes. A token additionally
//! tracks a bounded, ordered set of indices below its high-water mark that
//! have not yet been observed, called "gaps", so a resuming reader can
//! re-check them without re-scanning the whole history.

use eventstore_domain::EventStoreError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A resumable position in the global event stream.
///
/// `index` is the highest global index this reader has observed. `gaps` is
/// an ordered set of global indices strictly below `index` that were absent
/// when observed and have not yet been seen or declared abandoned.
///
/// Persisted by the caller (a projector); opaque to the store. Mutated only
/// through [`TrackingToken::advance_to`]: the store never mutates a token
/// itself, it only returns a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingToken {
    index: i64,
    gaps: BTreeSet<i64>,
}

impl TrackingToken {
    /// Construct a token directly. Debug builds assert the invariant that
    /// every gap is strictly less than `index`; release builds trust the
    /// caller (this constructor is for internal use by code that already
    /// maintains the invariant. Deserialized, caller-supplied tokens go
    /// through [`TrackingToken::from_wire`] instead, which validates.
    pub fn new(index: i64, gaps: impl IntoIterator<Item = i64>) -> Self {
        let gaps: BTreeSet<i64> = gaps.into_iter().collect();
        debug_assert!(
            gaps.iter().all(|&g| g < index),
            "tracking token gaps must be strictly less than index"
        );
        Self { index, gaps }
    }

    /// The empty token: no events observed yet.
    pub fn initial() -> Self {
        Self {
            index: -1,
            gaps: BTreeSet::new(),
        }
    }

    /// Construct the token produced by the very first row a reader ever
    /// sees, per the lifecycle rule in the data model: `index` is the
    /// observed global index, and `gaps` is every integer from
    /// `lowest_global_sequence` up to (but not including) that index if the
    /// row is "recent" (`allow_gaps`), otherwise empty.
    pub fn first_observed(first_observed_global_index: i64, lowest_global_sequence: i64, allow_gaps: bool) -> Self {
        let gaps: BTreeSet<i64> = if allow_gaps {
            (lowest_global_sequence..first_observed_global_index).collect()
        } else {
            BTreeSet::new()
        };
        Self {
            index: first_observed_global_index,
            gaps,
        }
    }

    /// Deserialize-and-validate a token received from the wire. Rejects
    /// shapes that could not have been produced by [`TrackingToken::advance_to`]:
    /// any gap `>= index`.
    pub fn from_wire(wire: TrackingTokenWire) -> Result<Self, EventStoreError> {
        let gaps: BTreeSet<i64> = wire.gaps.into_iter().collect();
        if let Some(&bad) = gaps.iter().find(|&&g| g >= wire.index) {
            return Err(EventStoreError::InvalidToken(format!(
                "gap {bad} is not strictly less than index {}",
                wire.index
            )));
        }
        Ok(Self {
            index: wire.index,
            gaps,
        })
    }

    /// Serialize to the wire format the caller persists.
    pub fn to_wire(&self) -> TrackingTokenWire {
        TrackingTokenWire {
            index: self.index,
            gaps: self.gaps.iter().copied().collect(),
        }
    }

    /// The highest global index this reader has observed.
    pub fn index(&self) -> i64 {
        self.index
    }

    /// The currently tracked gaps, ascending.
    pub fn gaps(&self) -> &BTreeSet<i64> {
        &self.gaps
    }

    /// Advance the token past `next_index`.
    ///
    /// - If `next_index > index`: every integer in the open interval
    ///   `(index, next_index)` is a candidate gap, inserted only if
    ///   `allow_gaps` (the new row is recent enough that an
    ///   earlier-numbered sibling might still be committing). `index`
    ///   becomes `next_index` regardless.
    /// - If `next_index == index`: `next_index` is dropped from `gaps` (a
    ///   no-op if it wasn't tracked); `index` is unchanged.
    /// - If `next_index < index`: `next_index` is dropped from `gaps` (the
    ///   hole has been filled); `index` is unchanged.
    ///
    /// After any of the above, every gap older than `max_gap_offset` below
    /// the (possibly new) `index` is abandoned and dropped: it is too far
    /// behind to be worth re-scanning.
    pub fn advance_to(&self, next_index: i64, max_gap_offset: i64, allow_gaps: bool) -> Self {
        let mut gaps = self.gaps.clone();
        let index = if next_index > self.index {
            if allow_gaps {
                gaps.extend((self.index + 1)..next_index);
            }
            next_index
        } else {
            gaps.remove(&next_index);
            self.index
        };

        let cutoff = index - max_gap_offset;
        gaps.retain(|&g| g >= cutoff);

        Self { index, gaps }
    }

    /// True iff `global_index` has already been delivered by this token:
    /// it is at or below the high-water mark and not an outstanding gap.
    pub fn covers(&self, global_index: i64) -> bool {
        global_index <= self.index && !self.gaps.contains(&global_index)
    }

    /// Merge two tokens observed by independent readers of the same stream
    /// into the token a single reader would hold had it seen everything
    /// both have: the higher index, and the union of gaps still below it
    /// (a gap only survives the merge if both readers still consider it
    /// open; if either side already saw it, it's filled for the merged
    /// position).
    pub fn merge(&self, other: &Self) -> Self {
        let index = self.index.max(other.index);
        let mine_covers = |g: &i64| self.covers(*g) || *g > self.index;
        let other_covers = |g: &i64| other.covers(*g) || *g > other.index;
        let gaps: BTreeSet<i64> = self
            .gaps
            .union(&other.gaps)
            .copied()
            .filter(|g| *g < index && !mine_covers(g) && !other_covers(g))
            .collect();
        Self { index, gaps }
    }

    /// Indices present in `self`'s gap set but not `other`'s: the gaps this
    /// token still considers open that the other has already resolved one
    /// way or another.
    pub fn diff(&self, other: &Self) -> BTreeSet<i64> {
        self.gaps.difference(&other.gaps).copied().collect()
    }
}

/// The wire representation a caller actually persists: `{ index, gaps }`
/// with `gaps` as an ordered list of indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingTokenWire {
    /// The highest global index observed.
    pub index: i64,
    /// Outstanding gap indices, ascending.
    pub gaps: Vec<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_token_covers_nothing() {
        let t = TrackingToken::initial();
        assert!(!t.covers(0));
        assert_eq!(t.index(), -1);
    }

    #[test]
    fn first_observed_recent_backfills_gaps() {
        let t = TrackingToken::first_observed(6, 1, true);
        assert_eq!(t.index(), 6);
        assert_eq!(t.gaps().iter().copied().collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn first_observed_stale_has_no_gaps() {
        let t = TrackingToken::first_observed(6, 1, false);
        assert_eq!(t.index(), 6);
        assert!(t.gaps().is_empty());
    }

    #[test]
    fn advance_forward_inserts_gaps_when_allowed() {
        let t = TrackingToken::new(4, []);
        let t2 = t.advance_to(6, 10_000, true);
        assert_eq!(t2.index(), 6);
        assert_eq!(t2.gaps().iter().copied().collect::<Vec<_>>(), vec![5]);
    }

    #[test]
    fn advance_forward_skips_gaps_when_disallowed() {
        let t = TrackingToken::new(4, []);
        let t2 = t.advance_to(6, 10_000, false);
        assert_eq!(t2.index(), 6);
        assert!(t2.gaps().is_empty());
    }

    #[test]
    fn advance_equal_fills_matching_gap() {
        let t = TrackingToken::new(6, [5]);
        let t2 = t.advance_to(5, 10_000, true);
        assert_eq!(t2.index(), 6);
        assert!(t2.gaps().is_empty());
    }

    #[test]
    fn advance_equal_with_no_matching_gap_is_noop() {
        let t = TrackingToken::new(6, []);
        let t2 = t.advance_to(6, 10_000, true);
        assert_eq!(t2.index(), 6);
        assert!(t2.gaps().is_empty());
    }

    #[test]
    fn advance_backward_fills_gap_without_moving_index() {
        let t = TrackingToken::new(10, [5, 6, 7]);
        let t2 = t.advance_to(6, 10_000, false);
        assert_eq!(t2.index(), 10);
        assert_eq!(t2.gaps().iter().copied().collect::<Vec<_>>(), vec![5, 7]);
    }

    #[test]
    fn gaps_older_than_offset_are_abandoned() {
        // max_gap_offset = 3: token {index:1, gaps:{}}. Events at 2..6 appear.
        let mut t = TrackingToken::new(1, []);
        for i in 2..=6 {
            t = t.advance_to(i, 3, true);
        }
        assert_eq!(t.index(), 6);
        assert!(t.gaps().is_empty());
    }

    #[test]
    fn gaps_just_within_offset_survive() {
        let t = TrackingToken::new(1, []).advance_to(6, 10, true);
        // gaps 2,3,4,5 all within offset 10 of index 6.
        assert_eq!(t.gaps().iter().copied().collect::<Vec<_>>(), vec![2, 3, 4, 5]);
    }

    #[test]
    fn covers_checks_index_and_gap_membership() {
        let t = TrackingToken::new(6, [5]);
        assert!(t.covers(6));
        assert!(t.covers(4));
        assert!(!t.covers(5));
        assert!(!t.covers(7));
    }

    #[test]
    fn from_wire_rejects_gap_not_below_index() {
        let wire = TrackingTokenWire { index: 5, gaps: vec![5] };
        let err = TrackingToken::from_wire(wire).unwrap_err();
        assert!(matches!(err, EventStoreError::InvalidToken(_)));
    }

    #[test]
    fn from_wire_accepts_well_formed_token() {
        let wire = TrackingTokenWire { index: 5, gaps: vec![2, 3] };
        let t = TrackingToken::from_wire(wire).unwrap();
        assert_eq!(t.index(), 5);
        assert_eq!(t.gaps().len(), 2);
    }

    #[test]
    fn wire_round_trip() {
        let t = TrackingToken::new(10, [3, 7]);
        let wire = t.to_wire();
        let t2 = TrackingToken::from_wire(wire).unwrap();
        assert_eq!(t, t2);
    }

    #[test]
    fn monotonicity_holds_across_any_legal_advancement() {
        let t = TrackingToken::new(10, [3, 7]);
        for (next, allow) in [(12, true), (12, false), (9, true), (10, false)] {
            let t2 = t.advance_to(next, 100, allow);
            assert!(t2.index() >= t.index());
        }
    }

    #[test]
    fn gap_bound_respects_max_gap_offset() {
        let t = TrackingToken::new(1, []).advance_to(50, 5, true);
        assert!(t.gaps().iter().all(|&g| g >= t.index() - 5));
    }
}
