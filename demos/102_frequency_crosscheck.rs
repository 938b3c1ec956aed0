use scopelab::analysis::dominant_frequency;
use scopelab::devices::infiniium::{AcquisitionConfig, Infiniium};
use scopelab::scpi::ScpiSession;
use scopelab::transport::TransportConfig;

const RESOURCE: &str = "TCPIP0::169.254.205.81::inst0::INSTR";

fn main() -> scopelab::Result<()> {
    env_logger::init();

    let transport = TransportConfig::new(RESOURCE).open()?;
    let mut scope = Infiniium::new(ScpiSession::new(transport))?;

    let cfg = AcquisitionConfig::default();
    let wf = scope.configure_and_capture(&cfg)?;

    let fft_hz = dominant_frequency(&wf)?;
    let scope_hz = scope.measure_frequency(cfg.channel)?;
    let amplitude = scope.measure_amplitude(cfg.channel)?;

    println!("{:.2} [kHz] (FFT) vs {:.2} [kHz] (scope), {:.5}", fft_hz / 1.0e3, scope_hz / 1.0e3, scope_hz / fft_hz);
    println!("Amplitude: {:.4} [V]", amplitude);
    assert!((1.0 - scope_hz / fft_hz).abs() < 0.06);

    scope.cleanup()
}
