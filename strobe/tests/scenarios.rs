use strobe::dut::generic::Pipeline;
use strobe::dut::PortMap;
use strobe::sim::{ Harness, Phase, RunConfig, RunSummary, Simulation, StrobePolicy };
use strobe::trace::{ TraceLog, VcdWriter };

const PPC_STREAM: [u64; 5] = [0x38800100, 0x38A00008, 0x7CC42A14, 0x7CE42BD6, 0x7D0429D6];

fn init() {
    env_logger::try_init().ok();
}

fn record(config: &RunConfig) -> (RunSummary, TraceLog) {
    let mut harness = Harness::new(config, Pipeline::new(5), TraceLog::new())
        .expect("harness");
    let summary = harness.run().expect("run");
    let (_, log) = harness.finish().expect("finish");
    (summary, log)
}

fn column(log: &TraceLog, name: &str) -> Vec<u64> {
    log.column(log.lookup(name).expect("signal is traced"))
}

fn high_ticks(values: &[u64]) -> Vec<usize> {
    values
        .iter()
        .enumerate()
        .filter(|(_, v)| **v != 0)
        .map(|(t, _)| t)
        .collect()
}

#[test]
fn ppc_core_stream() {
    init();
    let config = RunConfig::new(6, 5, 200, PPC_STREAM);
    let (summary, log) = record(&config);

    assert_eq!(log.len(), 200);
    assert_eq!(log.times(), (0..200).collect::<Vec<u64>>());
    assert_eq!(summary.ticks, 200);
    assert_eq!(summary.issued, 5);

    let rst = column(&log, "TOP.rst");
    assert_eq!(high_ticks(&rst), (0..6).collect::<Vec<_>>());

    let valid = column(&log, "TOP.instruction_valid");
    assert_eq!(high_ticks(&valid), (11..21).collect::<Vec<_>>());

    let instruction = column(&log, "TOP.instruction");
    for (i, word) in PPC_STREAM.iter().enumerate() {
        let t = 11 + 2 * i;
        assert_eq!(instruction[t], *word, "first tick of word {}", i);
        assert_eq!(instruction[t + 1], *word, "second tick of word {}", i);
    }
    assert!(instruction[21..].iter().all(|w| *w == 0));
    assert!(instruction[..11].iter().all(|w| *w == 0));

    let clk = column(&log, "TOP.clk");
    assert!(clk.windows(2).all(|pair| pair[0] != pair[1]));

    assert_eq!(*column(&log, "TOP.retired").last().expect("entries"), 5);
    assert_eq!(*column(&log, "TOP.trap").last().expect("entries"), 0);
    assert_eq!(
        summary.phases,
        vec![
            (Phase::ResetAssert, 0),
            (Phase::ResetSettle, 6),
            (Phase::Issue, 11),
            (Phase::Drain, 21),
            (Phase::Done, 200),
        ]
    );
}

#[test]
fn long_stream() {
    init();
    let stream: Vec<u64> = (0..23u64).map(|i| 0x3880_0000 | (i << 4) | 1).collect();
    let config = RunConfig::new(6, 5, 2000, stream.iter().copied());
    let (summary, log) = record(&config);

    assert_eq!(log.len(), 2000);
    assert_eq!(summary.issued, 23);

    let valid = column(&log, "TOP.instruction_valid");
    assert_eq!(high_ticks(&valid), (11..57).collect::<Vec<_>>());

    let instruction = column(&log, "TOP.instruction");
    let presented: Vec<u64> = instruction[11..57].chunks(2).map(|pair| pair[0]).collect();
    assert_eq!(presented, stream);
    assert!(instruction[57..].iter().all(|w| *w == 0));
}

#[test]
fn empty_stream_never_strobes() {
    init();
    let config = RunConfig::new(6, 5, 40, Vec::<u64>::new());
    let (summary, log) = record(&config);

    assert_eq!(log.len(), 40);
    assert_eq!(summary.issued, 0);
    assert!(column(&log, "TOP.instruction_valid").iter().all(|v| *v == 0));
    assert!(summary.phases.contains(&(Phase::Issue, 11)));
    assert!(summary.phases.contains(&(Phase::Drain, 11)));
}

#[test]
fn first_half_strobe() {
    init();
    let config = RunConfig::new(6, 5, 200, PPC_STREAM).with_strobe(StrobePolicy::FirstHalf);
    let (_, log) = record(&config);

    let valid = column(&log, "TOP.instruction_valid");
    assert_eq!(high_ticks(&valid), vec![11, 13, 15, 17, 19]);
    // the word is still held for the whole period
    let instruction = column(&log, "TOP.instruction");
    assert_eq!(instruction[12], PPC_STREAM[0]);
}

#[test]
fn renamed_ports() {
    init();
    let ports = PortMap {
        clock: "clock".into(),
        reset: "reset_n".into(),
        instruction: "insn".into(),
        instruction_valid: "insn_valid".into(),
    };
    let config = RunConfig::new(2, 2, 12, [0x1u64, 0x2]).with_ports(ports.clone());
    let mut harness = Harness::new(&config, Pipeline::new(2).with_ports(ports), TraceLog::new())
        .expect("harness");
    harness.run().expect("run");
    let (_, log) = harness.finish().expect("finish");

    assert_eq!(high_ticks(&column(&log, "TOP.insn_valid")), vec![4, 5, 6, 7]);
    assert!(log.lookup("TOP.clk").is_none());
}

#[test]
fn shallow_trace() {
    init();
    let config = RunConfig::new(6, 5, 200, PPC_STREAM);
    let mut config_shallow = config.clone();
    config_shallow.trace.depth = 1;

    let (_, deep) = record(&config);
    let (_, shallow) = record(&config_shallow);
    assert!(deep.lookup("TOP.pipe.stage4_word").is_some());
    assert!(shallow.lookup("TOP.pipe.stage4_word").is_none());
    assert_eq!(column(&deep, "TOP.instruction"), column(&shallow, "TOP.instruction"));
}

#[test]
fn identical_runs_identical_waveforms() {
    init();
    let config = RunConfig::new(6, 5, 200, PPC_STREAM);
    let vcd = || {
        let mut harness = Harness::new(&config, Pipeline::new(5), VcdWriter::new(Vec::new()))
            .expect("harness");
        harness.run().expect("run");
        let (_, writer) = harness.finish().expect("finish");
        writer.into_inner()
    };

    let first = vcd();
    let second = vcd();
    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn tee_to_log_and_vcd() {
    init();
    let config = RunConfig::new(6, 5, 50, PPC_STREAM);
    let mut harness = Harness::new(
        &config,
        Pipeline::new(5),
        (TraceLog::new(), VcdWriter::new(Vec::new())),
    )
    .expect("harness");
    harness.run().expect("run");
    let (_, (log, writer)) = harness.finish().expect("finish");

    assert_eq!(log.len(), 50);
    let text = String::from_utf8(writer.into_inner()).expect("vcd is ascii");
    assert_eq!(text.lines().filter(|l| l.starts_with('#')).count(), 50);
}
