use wherechain::WherechainError;
use wherechain::bench::{Benchmark, ProcessingMode};
use wherechain::construct::{HeaderKeeper, HeaderRecord, KeyPair};
use wherechain::workload::Workload;

#[test]
fn empty_batch_does_no_work() {
    let workload = Workload::generate(5, 2, 0);
    let benchmark = Benchmark::new(&workload.lines);
    let result = benchmark
        .run(&[], ProcessingMode::IterativeCompose)
        .expect("empty input is not an error");
    assert!(result.is_none());

    for mode in ProcessingMode::ALL {
        assert!(benchmark.process(&HeaderKeeper::new(), mode).expect("runs").is_none());
    }
    assert!(benchmark.run_all(&[]).expect("runs").is_empty());
}

#[test]
fn every_mode_matches_every_header_line() {
    let workload = Workload::generate(50, 3, 400);
    let expected = Workload::expected_matches(50, 3);
    let benchmark = Benchmark::new(&workload.lines);

    let results = benchmark.run_all(&workload.headers.key_pairs()).expect("runs");
    let modes: Vec<ProcessingMode> = results.iter().map(|result| result.mode).collect();
    assert_eq!(modes, ProcessingMode::ALL.to_vec());
    for result in &results {
        assert_eq!(result.matched, expected, "{}", result.mode);
        assert_eq!(result.elapsed().as_nanos(), u128::from(result.ticks));
    }
}

#[test]
fn partial_batches_only_match_their_own_lines() {
    let workload = Workload::generate(20, 4, 0);
    let benchmark = Benchmark::new(&workload.lines);
    let batch: Vec<KeyPair> = workload.headers.key_pairs().into_iter().step_by(5).collect();
    assert_eq!(batch.len(), 4);
    for mode in ProcessingMode::ALL {
        let result = benchmark.process(batch.as_slice(), mode).expect("runs").expect("has keys");
        assert_eq!(result.matched, 16, "{}", mode);
    }
}

#[test]
fn duplicate_headers_are_kept_once() {
    let mut headers = HeaderKeeper::new();
    let (first, previously_kept) = headers.keep(HeaderRecord::new(KeyPair::new("INV", "000001")));
    assert!(!previously_kept);
    let (again, previously_kept) = headers.keep(HeaderRecord::new(KeyPair::new("INV", "000001")));
    assert!(previously_kept);
    assert_eq!(first, again);
    assert_eq!(headers.len(), 1);
}

#[test]
fn modes_parse_from_their_codes() {
    let modes: Vec<ProcessingMode> = ["R", "N", "V"]
        .iter()
        .map(|code| code.parse().expect("known code"))
        .collect();
    assert_eq!(modes, ProcessingMode::ALL.to_vec());
    let err = "Q".parse::<ProcessingMode>().unwrap_err();
    assert!(format!("{}", err).contains("unknown processing method"));
}

#[test]
fn recursive_mode_fails_instead_of_overflowing() {
    let workload = Workload::generate(50_000, 1, 0);
    let key_pairs = workload.headers.key_pairs();
    let benchmark = Benchmark::new(&workload.lines);

    let err = benchmark
        .run(&key_pairs, ProcessingMode::RecursiveCompose)
        .expect_err("too deep to compose recursively");
    assert!(matches!(err, WherechainError::TooDeep { .. }));

    let result = benchmark
        .run(&key_pairs, ProcessingMode::IterativeCompose)
        .expect("runs")
        .expect("has keys");
    assert_eq!(result.matched, 50_000);
}
