pub use strobe_dut as dut;
pub use strobe_sim as sim;
pub use strobe_trace as trace;
