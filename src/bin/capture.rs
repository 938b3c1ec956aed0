
use std::env;
use std::path::PathBuf;
use std::process;

use log::{error, info};

use scopelab::devices::infiniium::{AcquisitionConfig, Infiniium};
use scopelab::scpi::ScpiSession;
use scopelab::transport::TransportConfig;

const USAGE:&str = "usage: scopelab-capture <resource> [config.json] [out.csv]";

fn run(args:&[String]) -> scopelab::Result<()> {
	let resource = args.get(1).ok_or_else(|| scopelab::Error::InvalidParameter(USAGE.into()))?;

	let cfg = match args.get(2) {
		Some(path) => AcquisitionConfig::from_json_file(path)?,
		None       => AcquisitionConfig::default(),
	};

	let transport = TransportConfig::new(resource).open()?;
	let mut scope = Infiniium::new(ScpiSession::new(transport))?;

	let result = scope.configure_and_capture(&cfg);
	if let Err(e) = scope.cleanup() {
		error!("cleanup after capture failed: {}", e);
	}
	let wf = result?;

	let out:PathBuf = match args.get(3) {
		Some(path) => PathBuf::from(path),
		None       => PathBuf::from(wf.timestamped_csv_name()),
	};
	wf.write_csv(&out)?;
	info!("wrote {} samples to {}", wf.len(), out.display());

	Ok(())
}

fn main() {
	env_logger::init();

	let args:Vec<String> = env::args().collect();
	if let Err(e) = run(&args) {
		error!("{}", e);
		process::exit(1);
	}
}
