//! Runs against a real server configured through the TEST_DB_* variables.
//!
//! Needs the `1000rows` and `test100` fixtures. Run with
//! `cargo test --test mysql_live -- --ignored`.

#![cfg(feature = "mysql")]

use sqlbench::driver::mysql::MySqlDriver;
use sqlbench::{Benchmark, ProtocolMode, Runner};

fn runner() -> Runner<MySqlDriver> {
    Runner::new(MySqlDriver::new()).repetitions(10).warmup(2)
}

#[test]
#[ignore = "needs a MySQL or MariaDB server"]
fn test_live_every_benchmark() {
    for benchmark in Benchmark::ALL {
        let report = runner()
            .run(benchmark)
            .unwrap_or_else(|e| panic!("{}: {}", benchmark, e));
        assert_eq!(report.measurement.repetitions, 10);
    }
}

#[test]
#[ignore = "needs a MySQL or MariaDB server"]
fn test_live_both_protocol_modes() {
    for mode in [ProtocolMode::TextInterpolated, ProtocolMode::BinaryPrepared] {
        let report = runner()
            .protocol_mode(mode)
            .run(Benchmark::Do1000Params)
            .unwrap();
        assert_eq!(report.protocol_mode, mode);
    }
}
