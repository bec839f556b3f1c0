//! Wherechain – three ways of matching a batch of header keys against a table
//! of line records.
//!
//! Every header carries a two part key, a [`construct::KeyPair`] of
//! discriminator and reference. The lines owned by a batch of headers can be
//! found by:
//! * composing one large disjunctive filter by recursive descent over a flat
//!   token sequence ([`compose::compose`]),
//! * closing the very same token sequence in a single in-place, right-to-left
//!   pass ([`compose::reduce`]),
//! * skipping the filter altogether and joining the line table with a virtual
//!   relation holding one row per key ([`query::ValuesJoin`]).
//!
//! All three must select the same lines. The [`bench::Benchmark`] runs one of
//! them per [`bench::ProcessingMode`], times it and logs the elapsed ticks.
//!
//! ## Token sequences
//! A token is either a leaf condition or a combinator awaiting a fixed number
//! of operands. For `n` key pairs the [`chain::WhereChain`] emits
//!
//! ```text
//! Where<_>  ( Where2<_, _>  KeyEquals(i)  Or<_> ) * (n - 1)  KeyEquals(n)
//! ```
//!
//! where each `Where2<a, Or<b>>` reads as "a or b".
//!
//! ## Keepers
//! Constructs are owned by keepers: the
//! [`construct::HeaderKeeper`] deduplicates headers and the
//! [`construct::LineKeeper`] owns the lines together with the lookups the query
//! layer answers leaf conditions from. Result sets are roaring bitmaps of line
//! things.
//!
//! ## Quick Start
//! ```
//! use wherechain::bench::{Benchmark, ProcessingMode};
//! use wherechain::workload::Workload;
//!
//! let workload = Workload::generate(10, 3, 5);
//! let benchmark = Benchmark::new(&workload.lines);
//! let result = benchmark
//!     .process(&workload.headers, ProcessingMode::IterativeCompose)
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(result.matched, 30);
//! ```

pub mod bench;
pub mod chain;
pub mod compose;
pub mod construct;
pub mod error;
pub mod predicate;
pub mod query;
pub mod settings;
pub mod workload;

pub use error::{Result, WherechainError};
