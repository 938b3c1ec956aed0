use scopelab::devices::infiniium::{AcquisitionConfig, Infiniium};
use scopelab::scpi::ScpiSession;
use scopelab::transport::TransportConfig;

const RESOURCE: &str = "TCPIP0::10.44.11.1::inst0::INSTR";
const POINT_COUNTS: [usize; 4] = [100, 1_000, 10_000, 50_000];

fn main() -> scopelab::Result<()> {
    env_logger::init();

    let transport = TransportConfig::new(RESOURCE).open()?;
    let mut scope = Infiniium::new(ScpiSession::new(transport))?;

    // Same window trigger for every run, only the record length changes
    let mut cfg = AcquisitionConfig::default();
    scope.configure(&cfg)?;

    for points in POINT_COUNTS.iter() {
        cfg.points = *points;
        let wf = scope.capture(cfg.channel, cfg.points)?;

        let v = wf.voltages();
        let v_max = v.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let v_min = v.iter().cloned().fold(f64::INFINITY, f64::min);
        println!("{:>6} points: {:.4} .. {:.4} [V], dt={:.3e} [s]", wf.len(), v_min, v_max, wf.scale().x_increment);

        wf.write_csv(format!("./ex101_{}pts.csv", points))?;
    }

    scope.cleanup()
}
