use std::env;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use wherechain::bench::Benchmark;
use wherechain::settings::Settings;
use wherechain::workload::Workload;
use wherechain::{Result, WherechainError};

fn main() -> Result<()> {
    let path = env::args().nth(1);
    let settings = Settings::load(path.as_deref())?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    info!(?settings, "starting");

    let workload = Workload::generate(settings.headers, settings.lines_per_header, settings.unmatched_lines);
    let expected = Workload::expected_matches(settings.headers, settings.lines_per_header);
    let key_pairs = workload.headers.key_pairs();
    let benchmark = Benchmark::new(&workload.lines);

    for round in 1..=settings.rounds {
        for mode in settings.modes() {
            let Some(result) = benchmark.run(&key_pairs, mode)? else {
                continue;
            };
            if result.matched != expected {
                warn!(round, mode = mode.code(), matched = result.matched, expected, "unexpected match count");
            }
            if settings.report_json {
                let line = serde_json::to_string(&result)
                    .map_err(|e| WherechainError::Invariant(format!("unserializable result: {}", e)))?;
                println!("{}", line);
            }
        }
    }
    Ok(())
}
