use wherechain::bench::{Benchmark, ProcessingMode};
use wherechain::chain::WhereChain;
use wherechain::compose::{compose, reduce};
use wherechain::construct::{KeyPair, LineKeeper};
use wherechain::query::{LineQuery, ValuesJoin, ValuesRelation};

fn three_pairs() -> Vec<KeyPair> {
    vec![
        KeyPair::new("D1", "R1"),
        KeyPair::new("D2", "R2"),
        KeyPair::new("D3", "R3"),
    ]
}

fn one_line_per_pair(key_pairs: &[KeyPair]) -> LineKeeper {
    let mut lines = LineKeeper::new();
    for key in key_pairs {
        lines.keep(key.clone(), 1);
    }
    // same discriminator or same reference, never both
    lines.keep(KeyPair::new("D1", "R2"), 1);
    lines.keep(KeyPair::new("D3", "R1"), 1);
    lines
}

fn filter_matches(lines: &LineKeeper, key_pairs: &[KeyPair], recursive: bool) -> u64 {
    let (tokens, bindings) = WhereChain::build(key_pairs).into_parts();
    let filter = if recursive {
        compose(&tokens).expect("composes")
    } else {
        reduce(tokens).expect("reduces")
    };
    let mut query = LineQuery::new(lines);
    query.where_and(filter);
    query.select(&bindings).expect("selects").len()
}

#[test]
fn three_pairs_match_three_lines() {
    let key_pairs = three_pairs();
    let lines = one_line_per_pair(&key_pairs);
    assert_eq!(filter_matches(&lines, &key_pairs, false), 3);
    assert_eq!(filter_matches(&lines, &key_pairs, true), 3);

    let values = ValuesRelation::from_pairs(&key_pairs);
    let join = ValuesJoin::new(&lines, &values);
    assert_eq!(join.matched().len(), 3);
    assert_eq!(join.rows().count(), 3);
}

#[test]
fn three_pairs_match_nothing_in_an_empty_table() {
    let key_pairs = three_pairs();
    let lines = LineKeeper::new();
    assert_eq!(filter_matches(&lines, &key_pairs, false), 0);
    assert_eq!(filter_matches(&lines, &key_pairs, true), 0);

    let benchmark = Benchmark::new(&lines);
    for mode in ProcessingMode::ALL {
        let result = benchmark.run(&key_pairs, mode).expect("runs").expect("has keys");
        assert_eq!(result.matched, 0, "{}", mode);
    }
}

#[test]
fn strategies_select_the_same_lines() {
    let key_pairs = three_pairs();
    let lines = one_line_per_pair(&key_pairs);

    let (tokens, bindings) = WhereChain::build(&key_pairs).into_parts();
    let mut by_reducer = LineQuery::new(&lines);
    by_reducer.where_and(reduce(tokens.clone()).expect("reduces"));
    let mut by_composer = LineQuery::new(&lines);
    by_composer.where_and(compose(&tokens).expect("composes"));
    let values = ValuesRelation::from_pairs(&key_pairs);

    let reduced = by_reducer.select(&bindings).expect("selects");
    let composed = by_composer.select(&bindings).expect("selects");
    assert_eq!(reduced.matched(), composed.matched());
    assert_eq!(reduced.matched(), &ValuesJoin::new(&lines, &values).matched());

    let selected: Vec<String> = reduced.into_iter().map(|line| line.key().to_string()).collect();
    assert_eq!(selected, vec!["(D1, R1)", "(D2, R2)", "(D3, R3)"]);
}
