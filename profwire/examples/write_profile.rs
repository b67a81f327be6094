//! Demo: write a small synthetic CPU profile to `cpu.pb.gz`
//!
//! The output opens in standard pprof tooling:
//!
//! ```bash
//! cargo run --example write_profile
//! go tool pprof -top cpu.pb.gz
//! ```

use anyhow::{Context, Result};
use profwire::{LabelValue, ProfileBuilder, SampleLabel, SourceFrame};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufWriter;
use std::io::Write;
use std::time::Duration;

fn main() -> Result<()> {
    env_logger::init();

    // A fixed symbol table stands in for the profiling runtime's resolver.
    // Keys are return PCs: the leaf sample address plus one.
    let mut symbols = HashMap::new();
    symbols.insert(
        0x1101,
        SourceFrame { function: "demo::hot_loop".into(), file: "src/demo.rs".into(), line: 42 },
    );
    symbols.insert(
        0x1200,
        SourceFrame { function: "demo::main".into(), file: "src/demo.rs".into(), line: 7 },
    );

    let file = File::create("cpu.pb.gz").context("failed to create cpu.pb.gz")?;
    let mut builder =
        ProfileBuilder::with_period(BufWriter::new(file), symbols, Duration::from_millis(10));

    builder.add_mapping(0x1000, 0x2000, 0, "/usr/local/bin/demo", "deadbeef");

    // Ten samples of the same two-frame stack; the leaf address is
    // adjusted to return-PC form before submission.
    for tick in 0..10_i64 {
        builder.add_sample(
            &[1, 10_000_000],
            &[0x1100 + 1, 0x1200],
            &[SampleLabel { key: "tick", value: LabelValue::Num(tick) }],
        )?;
    }

    builder.add_comment("synthetic demo profile");

    let mut writer = builder.finish().context("failed to finalize profile")?;
    writer.flush().context("failed to flush cpu.pb.gz")?;

    println!("wrote cpu.pb.gz");
    Ok(())
}
