//! Deterministic header and line data for benchmark runs.

use tracing::debug;

use crate::construct::{HeaderKeeper, HeaderRecord, KeyPair, LineKeeper};

pub const DISCRIMINATORS: [&str; 4] = ["INV", "ADR", "ACR", "PPM"];

#[derive(Debug, Default)]
pub struct Workload {
    pub headers: HeaderKeeper,
    pub lines: LineKeeper,
}

impl Workload {
    /// Header `i` gets the key `(DISCRIMINATORS[i % 4], "{i + 1:06}")` and
    /// owns `lines_per_header` lines numbered from 1. The unmatched lines
    /// continue the reference sequence past the last header.
    pub fn generate(headers: usize, lines_per_header: usize, unmatched_lines: usize) -> Self {
        let mut workload = Workload::default();
        for i in 0..headers {
            let key = Self::key(i);
            for line_nbr in 1..=lines_per_header {
                workload.lines.keep(key.clone(), line_nbr as u32);
            }
            workload.headers.keep(HeaderRecord::new(key));
        }
        for j in 0..unmatched_lines {
            workload.lines.keep(Self::key(headers + j), 1);
        }
        debug!(
            headers = workload.headers.len(),
            lines = workload.lines.len(),
            "generated workload"
        );
        workload
    }

    pub fn key(i: usize) -> KeyPair {
        KeyPair::new(DISCRIMINATORS[i % DISCRIMINATORS.len()], format!("{:06}", i + 1))
    }

    /// Number of lines the full header batch should match.
    pub fn expected_matches(headers: usize, lines_per_header: usize) -> u64 {
        (headers * lines_per_header) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmatched_lines_share_no_key_with_headers() {
        let workload = Workload::generate(8, 2, 5);
        assert_eq!(workload.headers.len(), 8);
        assert_eq!(workload.lines.len(), 21);
        for header in workload.headers.iter() {
            assert_eq!(workload.lines.with_key(header.key()).len(), 2);
        }
        let noise = Workload::key(8);
        assert_eq!(workload.lines.with_key(&noise).len(), 1);
        assert!(workload.headers.key_pairs().iter().all(|key| *key != noise));
        assert_eq!(Workload::key(4), KeyPair::new("INV", "000005"));
    }
}
