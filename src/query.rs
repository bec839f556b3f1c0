//! A small in-memory query layer over the [`LineKeeper`].
//!
//! Filters are evaluated set-wise: every leaf condition is answered from the
//! keeper's lookups as a roaring bitmap of line things, and the combinators
//! union or intersect those bitmaps. The value join instead hashes the
//! virtual relation of key pairs and probes it with every line.

use std::collections::HashMap;

// used for internal result sets
use roaring::RoaringTreemap;
use roaring::treemap::IntoIter;
use tracing::debug;

use crate::construct::{KeyHasher, KeyPair, LineKeeper, LineRecord};
use crate::error::Result;
use crate::predicate::{Bindings, Condition, PredicateTree};

// ------------- Select -------------
#[derive(Debug)]
pub struct LineQuery<'t> {
    lines: &'t LineKeeper,
    filters: Vec<PredicateTree>,
}

impl<'t> LineQuery<'t> {
    pub fn new(lines: &'t LineKeeper) -> Self {
        Self {
            lines,
            filters: Vec::new(),
        }
    }

    /// Conjoins another filter with those already present.
    pub fn where_and(&mut self, filter: PredicateTree) -> &mut Self {
        self.filters.push(filter);
        self
    }

    pub fn filters(&self) -> &[PredicateTree] {
        &self.filters
    }

    fn matching(&self, condition: &Condition, bindings: &Bindings) -> Result<RoaringTreemap> {
        Ok(match condition {
            Condition::Equals(column, param) => self.lines.with_value(*column, bindings.get(*param)?),
            Condition::KeyEquals { discriminator, reference } => self.lines.with_key(&KeyPair::new(
                bindings.get(*discriminator)?,
                bindings.get(*reference)?,
            )),
        })
    }

    /// Selects the lines satisfying every filter, with parameters taken from
    /// `bindings`. Without filters every line is selected.
    pub fn select(&self, bindings: &Bindings) -> Result<Selection<'t>> {
        let mut matched: Option<RoaringTreemap> = None;
        for filter in &self.filters {
            let found = filter.evaluate(|condition| self.matching(condition, bindings))?;
            match matched.as_mut() {
                Some(so_far) => *so_far &= &found,
                None => matched = Some(found),
            }
        }
        let matched = matched.unwrap_or_else(|| self.lines.all());
        debug!(filters = self.filters.len(), matched = matched.len(), "selected lines");
        Ok(Selection {
            lines: self.lines,
            matched,
        })
    }
}

/// The distinct lines selected by a [`LineQuery`], in thing order.
#[derive(Debug)]
pub struct Selection<'t> {
    lines: &'t LineKeeper,
    matched: RoaringTreemap,
}

impl<'t> Selection<'t> {
    pub fn matched(&self) -> &RoaringTreemap {
        &self.matched
    }
    pub fn len(&self) -> u64 {
        self.matched.len()
    }
    pub fn is_empty(&self) -> bool {
        self.matched.is_empty()
    }
}

impl<'t> IntoIterator for Selection<'t> {
    type Item = &'t LineRecord;
    type IntoIter = SelectionIter<'t>;
    fn into_iter(self) -> Self::IntoIter {
        SelectionIter {
            lines: self.lines,
            things: self.matched.into_iter(),
        }
    }
}

pub struct SelectionIter<'t> {
    lines: &'t LineKeeper,
    things: IntoIter,
}

impl<'t> Iterator for SelectionIter<'t> {
    type Item = &'t LineRecord;
    fn next(&mut self) -> Option<Self::Item> {
        // every matched thing came from this keeper's lookups
        let lines = self.lines;
        self.things.by_ref().find_map(|thing| lines.get(thing))
    }
}

// ------------- Values -------------
/// A virtual table with one `(discriminator, reference)` row per key pair.
#[derive(Debug, Default)]
pub struct ValuesRelation {
    rows: Vec<KeyPair>,
}

impl ValuesRelation {
    pub fn from_pairs(key_pairs: &[KeyPair]) -> Self {
        Self {
            rows: key_pairs.to_vec(),
        }
    }
    pub fn rows(&self) -> &[KeyPair] {
        &self.rows
    }
    pub fn len(&self) -> usize {
        self.rows.len()
    }
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinedRow<'t> {
    /// Position of the matching row in the [`ValuesRelation`].
    pub values_row: usize,
    pub line: &'t LineRecord,
}

/// Inner join of a [`ValuesRelation`] with the line table on
/// `values.discriminator = line.discriminator AND values.reference = line.reference`.
#[derive(Debug)]
pub struct ValuesJoin<'t> {
    lines: &'t LineKeeper,
    build: HashMap<&'t KeyPair, Vec<usize>, KeyHasher>,
}

impl<'t> ValuesJoin<'t> {
    /// Builds the hash side from the (small) values relation.
    pub fn new(lines: &'t LineKeeper, values: &'t ValuesRelation) -> Self {
        let mut build: HashMap<&'t KeyPair, Vec<usize>, KeyHasher> = HashMap::default();
        for (values_row, key) in values.rows.iter().enumerate() {
            build.entry(key).or_default().push(values_row);
        }
        debug!(rows = values.len(), distinct = build.len(), "built values relation");
        Self { lines, build }
    }

    /// Probes the build side with every line, yielding one row per match.
    pub fn rows(&self) -> impl Iterator<Item = JoinedRow<'t>> + '_ {
        let lines = self.lines;
        lines.iter().flat_map(move |line| {
            self.build
                .get(line.key())
                .into_iter()
                .flatten()
                .map(move |&values_row| JoinedRow { values_row, line })
        })
    }

    /// The distinct lines taking part in the join.
    pub fn matched(&self) -> RoaringTreemap {
        self.rows().map(|row| row.line.line()).collect::<RoaringTreemap>()
    }
}
