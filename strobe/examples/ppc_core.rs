//! drive the reference pipeline with a short PowerPC instruction stream
//!
//! usage: `cargo run --example ppc_core [config.yaml]`
//!
//! without a configuration the run resets for 6 ticks, settles for 5,
//! issues five words and stops after 200 ticks. the waveform goes to
//! `ppc_core.vcd` unless the configuration names another path.

use std::path::PathBuf;

use anyhow::Context;

use strobe::dut::generic::Pipeline;
use strobe::sim::{ Harness, RunConfig, Simulation };

fn default_config() -> RunConfig {
    RunConfig::new(
        6,
        5,
        200,
        [0x38800100u64, 0x38A00008, 0x7CC42A14, 0x7CE42BD6, 0x7D0429D6],
    )
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut config = match std::env::args_os().nth(1) {
        Some(path) => RunConfig::from_file(&path)
            .with_context(|| format!("loading {}", PathBuf::from(&path).display()))?,
        None => default_config(),
    };
    if config.trace.path.is_none() {
        config.trace.path = Some(PathBuf::from("ppc_core.vcd"));
    }

    let dut = Pipeline::new(5)
        .with_word_width(config.word_width)?
        .with_ports(config.ports.clone());
    let mut harness = Harness::record_to_file(&config, dut)?;
    let summary = harness.run()?;
    let (dut, _) = harness.finish()?;

    log::info!(
        "{} ticks, {} instructions issued, {} retired{}",
        summary.ticks,
        summary.issued,
        dut.retired(),
        if dut.trapped() { ", trapped" } else { "" },
    );
    for (phase, tick) in &summary.phases {
        log::info!("  {:>12} from tick {}", phase, tick);
    }
    Ok(())
}
