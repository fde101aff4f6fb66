//! Contour matching between two shapes whose contour counts may differ.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, trace};

use crate::error::{InternalError, Result};
use crate::geometry::{Contour, PathShape};

use super::options::ContourMismatch;

/// Where one side of a contour pair came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContourOrigin {
    /// An unmodified contour of the input shape.
    Original(usize),
    /// Piece `piece` of `pieces` cut from input contour `contour`.
    Piece {
        contour: usize,
        piece: usize,
        pieces: usize,
    },
    /// Several input contours bridged into one.
    Merged(Vec<usize>),
    /// A zero-size contour standing in for a missing counterpart of the
    /// other side's contour `counterpart`.
    Point { counterpart: usize },
}

impl ContourOrigin {
    /// Input contour indices this side covers.
    #[must_use]
    pub fn contours(&self) -> Vec<usize> {
        match self {
            Self::Original(i) | Self::Piece { contour: i, .. } => vec![*i],
            Self::Merged(indices) => indices.clone(),
            Self::Point { .. } => Vec::new(),
        }
    }
}

/// Two contours that morph into each other.
#[derive(Debug, Clone, PartialEq)]
pub struct ContourPair {
    pub source: Contour,
    pub target: Contour,
    pub source_origin: ContourOrigin,
    pub target_origin: ContourOrigin,
}

/// Which side of a pairing to inspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Source,
    Target,
}

/// The full assignment of contours between two shapes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContourPairing {
    pub pairs: Vec<ContourPair>,
}

impl ContourPairing {
    /// Number of pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns `true` if there are no pairs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Indices of the pairs that carry (part of) input contour `index`.
    #[must_use]
    pub fn pairs_of(&self, side: Side, index: usize) -> Vec<usize> {
        self.pairs
            .iter()
            .enumerate()
            .filter(|(_, p)| origin(p, side).contours().contains(&index))
            .map(|(i, _)| i)
            .collect()
    }

    /// Checks that each of the `count` input contours of `side` is carried by
    /// the pairing, whole contours by exactly one pair and split contours by
    /// one pair per piece.
    ///
    /// # Errors
    ///
    /// Returns `MorphError::InternalInconsistency` with the number of
    /// contours that are missing or assigned twice.
    pub fn check_coverage(&self, side: Side, count: usize) -> Result<()> {
        let mut whole: BTreeMap<usize, usize> = BTreeMap::new();
        let mut pieces: BTreeMap<usize, BTreeSet<usize>> = BTreeMap::new();
        let mut expected_pieces: BTreeMap<usize, usize> = BTreeMap::new();
        for pair in &self.pairs {
            match origin(pair, side) {
                ContourOrigin::Original(i) => *whole.entry(*i).or_default() += 1,
                ContourOrigin::Merged(indices) => {
                    for i in indices {
                        *whole.entry(*i).or_default() += 1;
                    }
                }
                ContourOrigin::Piece {
                    contour,
                    piece,
                    pieces: n,
                } => {
                    pieces.entry(*contour).or_default().insert(*piece);
                    expected_pieces.insert(*contour, *n);
                }
                ContourOrigin::Point { .. } => {}
            }
        }
        let bad = (0..count)
            .filter(|i| {
                let as_whole = whole.get(i).copied().unwrap_or(0);
                let as_pieces = pieces.get(i).map_or(0, BTreeSet::len);
                let complete = expected_pieces.get(i).is_some_and(|n| *n == as_pieces);
                !matches!((as_whole, as_pieces), (1, 0)) && !(as_whole == 0 && complete)
            })
            .count();
        if bad > 0 {
            return Err(InternalError::UnpairedContours(bad).into());
        }
        Ok(())
    }
}

fn origin(pair: &ContourPair, side: Side) -> &ContourOrigin {
    match side {
        Side::Source => &pair.source_origin,
        Side::Target => &pair.target_origin,
    }
}

/// Pairs the contours of two shapes.
#[derive(Debug)]
pub struct MatchContours<'a> {
    a: &'a PathShape,
    b: &'a PathShape,
    key_map: Option<&'a BTreeMap<String, String>>,
    mismatch: ContourMismatch,
}

impl<'a> MatchContours<'a> {
    /// Creates a new matching of `a`'s contours to `b`'s.
    #[must_use]
    pub fn new(a: &'a PathShape, b: &'a PathShape) -> Self {
        Self {
            a,
            b,
            key_map: None,
            mismatch: ContourMismatch::default(),
        }
    }

    /// Pairs contours by key before falling back to position.
    #[must_use]
    pub fn with_key_map(mut self, key_map: Option<&'a BTreeMap<String, String>>) -> Self {
        self.key_map = key_map;
        self
    }

    /// Chooses split or merge for unequal contour counts.
    #[must_use]
    pub fn with_mismatch(mut self, mismatch: ContourMismatch) -> Self {
        self.mismatch = mismatch;
        self
    }

    /// Executes the matching.
    ///
    /// # Errors
    ///
    /// Returns `MorphError::InternalInconsistency` if an input contour ends
    /// up unassigned, which would be a bug in the matcher.
    pub fn execute(&self) -> Result<ContourPairing> {
        let mut pairs = Vec::new();
        let mut claimed_a = vec![false; self.a.len()];
        let mut claimed_b = vec![false; self.b.len()];

        if let Some(map) = self.key_map {
            for (i, ca) in self.a.contours.iter().enumerate() {
                let Some(wanted) = ca.key.as_ref().and_then(|k| map.get(k)) else {
                    continue;
                };
                let found = self
                    .b
                    .contours
                    .iter()
                    .enumerate()
                    .find(|(j, cb)| !claimed_b[*j] && cb.key.as_ref() == Some(wanted));
                if let Some((j, cb)) = found {
                    claimed_a[i] = true;
                    claimed_b[j] = true;
                    pairs.push(ContourPair {
                        source: ca.clone(),
                        target: cb.clone(),
                        source_origin: ContourOrigin::Original(i),
                        target_origin: ContourOrigin::Original(j),
                    });
                }
            }
            debug!(named = pairs.len(), "paired contours by key");
        }

        let rest_a = unclaimed(self.a, &claimed_a);
        let rest_b = unclaimed(self.b, &claimed_b);
        let (left, right) = self.balance(rest_a, rest_b);
        pairs.extend(
            left.into_iter()
                .zip(right)
                .map(|((source, source_origin), (target, target_origin))| ContourPair {
                    source,
                    target,
                    source_origin,
                    target_origin,
                }),
        );

        let pairing = ContourPairing { pairs };
        pairing.check_coverage(Side::Source, self.a.len())?;
        pairing.check_coverage(Side::Target, self.b.len())?;
        Ok(pairing)
    }

    fn balance(&self, rest_a: Vec<Indexed>, rest_b: Vec<Indexed>) -> (Vec<Tagged>, Vec<Tagged>) {
        let (na, nb) = (rest_a.len(), rest_b.len());
        if na == nb {
            return (tag_whole(rest_a), tag_whole(rest_b));
        }
        if na == 0 || nb == 0 {
            debug!(source = na, target = nb, "padding empty side with point contours");
            return if na == 0 {
                (points_for(&rest_b), tag_whole(rest_b))
            } else {
                let points = points_for(&rest_a);
                (tag_whole(rest_a), points)
            };
        }
        debug!(source = na, target = nb, strategy = ?self.mismatch, "balancing contour counts");
        match (self.mismatch, na < nb) {
            (ContourMismatch::Split, true) => (split_to(rest_a, nb), tag_whole(rest_b)),
            (ContourMismatch::Split, false) => (tag_whole(rest_a), split_to(rest_b, na)),
            (ContourMismatch::Merge, true) => (tag_whole(rest_a), merge_to(rest_b, na)),
            (ContourMismatch::Merge, false) => (merge_to(rest_a, nb), tag_whole(rest_b)),
        }
    }
}

/// Pairs contours with default settings: positional, split on mismatch.
///
/// # Errors
///
/// See [`MatchContours::execute`].
pub fn pair(a: &PathShape, b: &PathShape) -> Result<ContourPairing> {
    MatchContours::new(a, b).execute()
}

/// A contour with its index in the input shape.
type Indexed = (usize, Contour);
/// A contour ready to pair, with its origin.
type Tagged = (Contour, ContourOrigin);

fn unclaimed(shape: &PathShape, claimed: &[bool]) -> Vec<Indexed> {
    shape
        .contours
        .iter()
        .enumerate()
        .filter(|(i, _)| !claimed[*i])
        .map(|(i, c)| (i, c.clone()))
        .collect()
}

fn tag_whole(contours: Vec<Indexed>) -> Vec<Tagged> {
    contours
        .into_iter()
        .map(|(i, c)| (c, ContourOrigin::Original(i)))
        .collect()
}

fn points_for(counterparts: &[Indexed]) -> Vec<Tagged> {
    counterparts
        .iter()
        .map(|(i, c)| {
            let mut point = Contour::point(c.centroid());
            point.key.clone_from(&c.key);
            (point, ContourOrigin::Point { counterpart: *i })
        })
        .collect()
}

/// Splits the longest pieces in half until there are `count` of them.
fn split_to(contours: Vec<Indexed>, count: usize) -> Vec<Tagged> {
    let mut pieces: Vec<(usize, Contour, f64)> = contours
        .into_iter()
        .map(|(i, c)| {
            let len = c.approx_length();
            (i, c, len)
        })
        .collect();

    while pieces.len() < count {
        let mut longest = 0;
        for (k, piece) in pieces.iter().enumerate().skip(1) {
            if piece.2 > pieces[longest].2 {
                longest = k;
            }
        }
        let (index, contour, _) = pieces.remove(longest);
        let chain_len = if contour.closed {
            contour.closed_chain().len()
        } else {
            contour.segments.len()
        };
        #[allow(clippy::cast_precision_loss)]
        let (first, second) = contour.split_at(chain_len as f64 * 0.5);
        trace!(contour = index, "split contour");
        let (l1, l2) = (first.approx_length(), second.approx_length());
        pieces.insert(longest, (index, second, l2));
        pieces.insert(longest, (index, first, l1));
    }

    let mut totals: BTreeMap<usize, usize> = BTreeMap::new();
    for (i, _, _) in &pieces {
        *totals.entry(*i).or_default() += 1;
    }
    let mut seen: BTreeMap<usize, usize> = BTreeMap::new();
    pieces
        .into_iter()
        .map(|(i, c, _)| {
            let total = totals.get(&i).copied().unwrap_or(1);
            if total == 1 {
                return (c, ContourOrigin::Original(i));
            }
            let n = seen.entry(i).or_default();
            let origin = ContourOrigin::Piece {
                contour: i,
                piece: *n,
                pieces: total,
            };
            *n += 1;
            (c, origin)
        })
        .collect()
}

/// Greedily merges the two groups with the nearest centroids until `count`
/// remain. Ties go to the lowest index pair.
fn merge_to(contours: Vec<Indexed>, count: usize) -> Vec<Tagged> {
    let mut groups: Vec<(Vec<usize>, Contour)> =
        contours.into_iter().map(|(i, c)| (vec![i], c)).collect();

    while groups.len() > count.max(1) {
        let centroids: Vec<_> = groups.iter().map(|(_, c)| c.centroid()).collect();
        let mut best = (f64::INFINITY, 0, 1);
        for i in 0..groups.len() {
            for j in i + 1..groups.len() {
                let d = (centroids[j] - centroids[i]).norm_squared();
                if d < best.0 {
                    best = (d, i, j);
                }
            }
        }
        let (_, i, j) = best;
        let (indices_j, contour_j) = groups.remove(j);
        let (indices_i, contour_i) = &mut groups[i];
        *contour_i = contour_i.merged(&contour_j);
        indices_i.extend(indices_j);
        indices_i.sort_unstable();
        trace!(into = i, from = j, "merged contours");
    }

    groups
        .into_iter()
        .map(|(indices, c)| match indices.as_slice() {
            [single] => (c, ContourOrigin::Original(*single)),
            _ => (c, ContourOrigin::Merged(indices)),
        })
        .collect()
}
