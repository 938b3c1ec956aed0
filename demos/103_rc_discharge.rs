use scopelab::analysis::{fit_exponential_decay, LinearFitProblem};
use scopelab::devices::infiniium::config::{Slope, Sweep, TriggerConfig};
use scopelab::devices::infiniium::{AcquisitionConfig, Infiniium};
use scopelab::scpi::ScpiSession;
use scopelab::transport::TransportConfig;

const RESOURCE: &str = "TCPIP0::169.254.205.81::inst0::INSTR";
const R_OHMS: f64 = 10.0e3;
const RUNS: usize = 5;

fn main() -> scopelab::Result<()> {
    env_logger::init();

    // Channel 1 sits across a capacitor discharging through R_OHMS; the falling edge
    // of each discharge triggers a single acquisition
    let mut cfg = AcquisitionConfig::default();
    cfg.set_symmetric_range(2.0).set_time_per_division(1e-3);
    cfg.offset_v = 1.5;
    cfg.trigger = TriggerConfig::Edge { slope: Slope::Negative, level_v: 2.5 };
    cfg.sweep = Sweep::Single;
    cfg.points = 10_000;

    let transport = TransportConfig::new(RESOURCE).open()?;
    let mut scope = Infiniium::new(ScpiSession::new(transport))?;
    scope.configure(&cfg)?;

    let mut runs_c = LinearFitProblem::default();
    for run in 0..RUNS {
        println!("Waiting for discharge {} of {} ...", run + 1, RUNS);
        let wf = scope.capture(cfg.channel, cfg.points)?;

        let fit = fit_exponential_decay(&wf, 0.05)?;
        let c = fit.tau / R_OHMS;
        println!("V0: {:.4} [V]", fit.v0);
        println!("C: {:.3e} [F]", c);

        runs_c.points.push((run as f64, c));
    }

    let avg_c: f64 = runs_c.points.iter().map(|(_, x)| *x).sum::<f64>() / (RUNS as f64);
    println!("Capacitance: {:.3e} [F], trend {:?}", avg_c, runs_c.solve()?);

    scope.cleanup()
}
