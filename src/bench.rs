//! Selects, times and reports one matching strategy per run.

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

// used for internal result sets
use roaring::RoaringTreemap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::chain::WhereChain;
use crate::compose::{compose, reduce};
use crate::construct::{HeaderKeeper, KeyPair, LineKeeper, LineRecord};
use crate::error::{Result, WherechainError};
use crate::query::{JoinedRow, LineQuery, ValuesJoin, ValuesRelation};

// ------------- ProcessingMode -------------
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub enum ProcessingMode {
    /// One large filter composed by recursive descent.
    #[default]
    #[serde(rename = "R", alias = "recursive")]
    RecursiveCompose,
    /// The same filter closed by the single pass reducer.
    #[serde(rename = "N", alias = "iterative")]
    IterativeCompose,
    /// No filter at all, the header keys are joined as a virtual table.
    #[serde(rename = "V", alias = "values")]
    ValueJoin,
}

impl ProcessingMode {
    pub const ALL: [ProcessingMode; 3] = [
        ProcessingMode::RecursiveCompose,
        ProcessingMode::IterativeCompose,
        ProcessingMode::ValueJoin,
    ];
    pub fn code(&self) -> &'static str {
        match self {
            ProcessingMode::RecursiveCompose => "R",
            ProcessingMode::IterativeCompose => "N",
            ProcessingMode::ValueJoin => "V",
        }
    }
    pub fn label(&self) -> &'static str {
        match self {
            ProcessingMode::RecursiveCompose => "WhereChain Recursive",
            ProcessingMode::IterativeCompose => "WhereChain NonRecursive",
            ProcessingMode::ValueJoin => "Values",
        }
    }
}

impl FromStr for ProcessingMode {
    type Err = WherechainError;
    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "R" | "recursive" => Ok(ProcessingMode::RecursiveCompose),
            "N" | "iterative" => Ok(ProcessingMode::IterativeCompose),
            "V" | "values" => Ok(ProcessingMode::ValueJoin),
            other => Err(WherechainError::Config(format!("unknown processing method '{}'", other))),
        }
    }
}

impl fmt::Display for ProcessingMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ------------- StrategyResult -------------
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
pub struct StrategyResult {
    pub mode: ProcessingMode,
    /// Elapsed monotonic time in nanoseconds.
    pub ticks: u64,
    /// Distinct line records matched.
    pub matched: u64,
}

impl StrategyResult {
    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.ticks)
    }
}

// ------------- KeySource -------------
/// Whatever pages through the header records hands over a materialized batch
/// of their keys.
pub trait KeySource {
    fn key_pairs(&self) -> Vec<KeyPair>;
}

impl KeySource for HeaderKeeper {
    fn key_pairs(&self) -> Vec<KeyPair> {
        HeaderKeeper::key_pairs(self)
    }
}

impl KeySource for [KeyPair] {
    fn key_pairs(&self) -> Vec<KeyPair> {
        self.to_vec()
    }
}

impl KeySource for Vec<KeyPair> {
    fn key_pairs(&self) -> Vec<KeyPair> {
        self.clone()
    }
}

// ------------- Benchmark -------------
#[derive(Debug)]
pub struct Benchmark<'t> {
    lines: &'t LineKeeper,
}

impl<'t> Benchmark<'t> {
    pub fn new(lines: &'t LineKeeper) -> Self {
        Self { lines }
    }

    pub fn process<S: KeySource + ?Sized>(
        &self,
        source: &S,
        mode: ProcessingMode,
    ) -> Result<Option<StrategyResult>> {
        self.run(&source.key_pairs(), mode)
    }

    /// Runs the strategy named by `mode` over `key_pairs`. An empty batch
    /// does no work and yields no result.
    pub fn run(&self, key_pairs: &[KeyPair], mode: ProcessingMode) -> Result<Option<StrategyResult>> {
        if key_pairs.is_empty() {
            debug!(mode = mode.code(), "no key pairs to process");
            return Ok(None);
        }
        let timer = Instant::now();
        let matched = match mode {
            ProcessingMode::RecursiveCompose => self.where_chain(key_pairs, true)?,
            ProcessingMode::IterativeCompose => self.where_chain(key_pairs, false)?,
            ProcessingMode::ValueJoin => self.values(key_pairs),
        };
        let ticks = u64::try_from(timer.elapsed().as_nanos()).unwrap_or(u64::MAX);
        info!(mode = mode.code(), headers = key_pairs.len(), matched, ticks, "Ticks for {}", mode);
        Ok(Some(StrategyResult { mode, ticks, matched }))
    }

    /// Runs every strategy over the same batch, in [`ProcessingMode::ALL`] order.
    pub fn run_all(&self, key_pairs: &[KeyPair]) -> Result<Vec<StrategyResult>> {
        let mut results = Vec::with_capacity(ProcessingMode::ALL.len());
        for mode in ProcessingMode::ALL {
            results.extend(self.run(key_pairs, mode)?);
        }
        Ok(results)
    }

    fn where_chain(&self, key_pairs: &[KeyPair], recursive: bool) -> Result<u64> {
        let (tokens, bindings) = WhereChain::build(key_pairs).into_parts();
        debug!(tokens = tokens.len(), parameters = bindings.len(), recursive, "built where chain");
        let filter = if recursive { compose(&tokens)? } else { reduce(tokens)? };
        let mut query = LineQuery::new(self.lines);
        query.where_and(filter);
        // enumerate everything so no work is left undone when the timer stops
        let selected: Vec<&LineRecord> = query.select(&bindings)?.into_iter().collect();
        Ok(selected.len() as u64)
    }

    fn values(&self, key_pairs: &[KeyPair]) -> u64 {
        let values = ValuesRelation::from_pairs(key_pairs);
        let join = ValuesJoin::new(self.lines, &values);
        let joined: Vec<JoinedRow> = join.rows().collect();
        joined.iter().map(|row| row.line.line()).collect::<RoaringTreemap>().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for mode in ProcessingMode::ALL {
            assert_eq!(mode.code().parse::<ProcessingMode>().unwrap(), mode);
        }
        assert_eq!("values".parse::<ProcessingMode>().unwrap(), ProcessingMode::ValueJoin);
        assert!("X".parse::<ProcessingMode>().is_err());
        assert_eq!(ProcessingMode::default(), ProcessingMode::RecursiveCompose);
    }

    #[test]
    fn labels_match_the_method_list() {
        let labels: Vec<String> = ProcessingMode::ALL.iter().map(|m| m.to_string()).collect();
        assert_eq!(labels, vec!["WhereChain Recursive", "WhereChain NonRecursive", "Values"]);
    }

    #[test]
    fn strategy_result_serializes_with_codes() {
        let result = StrategyResult { mode: ProcessingMode::IterativeCompose, ticks: 1500, matched: 3 };
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(json, r#"{"mode":"N","ticks":1500,"matched":3}"#);
        assert_eq!(result.elapsed(), Duration::from_nanos(1500));
    }
}
