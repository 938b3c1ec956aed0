use scopelab::devices::infiniium::{AcquisitionConfig, Infiniium};
use scopelab::scpi::ScpiSession;
use scopelab::transport::TransportConfig;

const RESOURCE: &str = "TCPIP0::169.254.205.81::inst0::INSTR";

fn main() -> scopelab::Result<()> {
    env_logger::init();

    // Channel 1 is wired to the device under test; everything else is the default bench setup
    let mut cfg = AcquisitionConfig::default();
    cfg.set_symmetric_range(0.4).set_time_per_division(200e-6);

    let transport = TransportConfig::new(RESOURCE).open()?;
    let mut scope = Infiniium::new(ScpiSession::new(transport))?;
    println!("{:?}", scope.identity());

    let wf = scope.configure_and_capture(&cfg)?;
    println!("Captured {} samples at {:.3e} Sa/s", wf.len(), wf.sample_rate());

    let csv_name = wf.timestamped_csv_name();
    wf.write_csv(&csv_name)?;
    scope.write_screenshot(csv_name.replace(".csv", ".png"))?;

    std::fs::write(
        "./ex100_preamble.json",
        serde_json::to_string_pretty(wf.preamble()).unwrap().as_bytes()
    )?;

    scope.cleanup()
}
