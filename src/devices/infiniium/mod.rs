//! Keysight/Agilent Infiniium oscilloscopes.
//!
//! [`Infiniium`] wraps a [`ScpiSession`] and turns the front-panel setup,
//! digitize and waveform transfer into typed calls. Configuration and state
//! changes are checked with [`ErrorPolicy::Abort`]; waveform and screenshot
//! transfers only warn about queued faults.

use std::fs;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use lazy_static::lazy_static;
use log::{debug, info, warn};
use regex::Regex;
use serde::{Serialize, Deserialize};

use crate::error::{Error, Result};
use crate::scpi::{ErrorPolicy, ScpiSession};
use crate::transport::Transport;

pub mod config;
pub mod preamble;
pub mod waveform;

pub use self::config::AcquisitionConfig;
pub use self::preamble::{Preamble, WaveformFormat};
pub use self::waveform::{Sample, ScaleFactors, Waveform};

lazy_static! {
	static ref IDN_RE: Regex = Regex::new("([^,]+),([^,]+),([^,]+),([^,\\s]+)").unwrap();
}

pub const OPC_POLL_INTERVAL_MS:u64 = 10;
pub const DEFAULT_DIGITIZE_TIMEOUT_MS:u64 = 10_000;

const PNG_SIGNATURE:&[u8] = b"\x89PNG\r\n\x1a\n";

// Measurements the instrument could not make come back as 9.9E+37
const INVALID_MEASUREMENT:f64 = 9.9e37;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
	pub manufacturer: String,
	pub model: String,
	pub serial_num: String,
	pub fw_version: String,
}

impl Identity {

	pub fn parse(reply:&str) -> Result<Self> {
		let caps = IDN_RE.captures(reply.trim())
			.ok_or_else(|| Error::Parse(format!("*IDN? reply {:?} does not have four fields", reply.trim())))?;

		Ok(Identity {
			manufacturer: caps[1].trim().to_owned(),
			model: caps[2].trim().to_owned(),
			serial_num: caps[3].trim().to_owned(),
			fw_version: caps[4].trim().to_owned(),
		})
	}

	pub fn is_infiniium(&self) -> bool {
		let mfr = self.manufacturer.to_ascii_uppercase();
		mfr.contains("KEYSIGHT") || mfr.contains("AGILENT")
	}

}

pub struct Infiniium<T: Transport> {
	session: ScpiSession<T>,
	identity: Identity,
	channel_count: u8,
	capture_format: WaveformFormat,
	digitize_timeout: Duration,
}

impl<T: Transport> Infiniium<T> {

	/// Clears the link, asks `*IDN?` and refuses anything that is not a Keysight/Agilent scope.
	pub fn new(session:ScpiSession<T>) -> Result<Self> {
		let ans = Self::new_unchecked(session)?;
		if !ans.identity.is_infiniium() {
			return Err(Error::InvalidParameter(format!("{} {} is not a Keysight/Agilent oscilloscope", ans.identity.manufacturer, ans.identity.model)));
		}
		Ok(ans)
	}

	/// Like [`Infiniium::new`] but accepts whatever answers `*IDN?`.
	pub fn new_unchecked(mut session:ScpiSession<T>) -> Result<Self> {
		session.clear()?;
		let identity = Identity::parse(&session.query_text("*IDN?")?)?;
		info!("connected to {} {} (serial {}, firmware {})", identity.manufacturer, identity.model, identity.serial_num, identity.fw_version);

		Ok(Infiniium {
			session,
			identity,
			channel_count: config::DEFAULT_CHANNEL_COUNT,
			capture_format: WaveformFormat::Byte,
			digitize_timeout: Duration::from_millis(DEFAULT_DIGITIZE_TIMEOUT_MS),
		})
	}

	pub fn identity(&self) -> &Identity { &self.identity }

	/// Asks `*IDN?` again and caches the answer.
	pub fn identify(&mut self) -> Result<Identity> {
		self.identity = Identity::parse(&self.session.query_text("*IDN?")?)?;
		Ok(self.identity.clone())
	}

	pub fn session(&self) -> &ScpiSession<T> { &self.session }
	pub fn session_mut(&mut self) -> &mut ScpiSession<T> { &mut self.session }
	pub fn into_session(self) -> ScpiSession<T> { self.session }

	pub fn channel_count(&self) -> u8 { self.channel_count }
	pub fn set_channel_count(&mut self, n:u8) { self.channel_count = n; }

	pub fn capture_format(&self) -> WaveformFormat { self.capture_format }

	pub fn set_capture_format(&mut self, format:WaveformFormat) -> Result<()> {
		if format.sample_width().is_none() {
			return Err(Error::InvalidParameter(format!("{} is not an integer capture format", format.name())));
		}
		self.capture_format = format;
		Ok(())
	}

	/// Upper bound on waiting for `:DIGitize` to finish. The link timeout is raised to
	/// this value while `*OPC?` is outstanding, so it must be non-zero.
	pub fn set_digitize_timeout(&mut self, timeout:Duration) -> Result<()> {
		if timeout == Duration::from_millis(0) {
			return Err(Error::InvalidParameter("digitize timeout must be non-zero".into()));
		}
		self.digitize_timeout = timeout;
		Ok(())
	}

	pub fn digitize_timeout(&self) -> Duration { self.digitize_timeout }

	fn chan_ok(&self, n:u8) -> Result<()> {
		if n < 1 || n > self.channel_count {
			Err(Error::InvalidParameter(format!("channel {} is outside 1..={}", n, self.channel_count)))
		} else { Ok(()) }
	}

	fn apply(&mut self, command:&str) -> Result<()> {
		self.session.checked_send(command, ErrorPolicy::Abort)
	}

	/// Sends the whole setup in step order, stopping at the first rejected command.
	pub fn configure(&mut self, cfg:&AcquisitionConfig) -> Result<()> {
		cfg.validate()?;
		self.channel_count = cfg.channel_count;

		for (step, cmd) in cfg.commands() {
			debug!("{}: {}", step.name(), cmd);
			self.apply(&cmd)?;
		}

		info!("configured channel {} ({} V range, {} s timebase)", cfg.channel, cfg.range_v, cfg.timebase_range_s);
		Ok(())
	}

	// A real instrument holds the *OPC? reply until the acquisition is done, so the
	// read itself must be allowed to last as long as the digitize.
	fn wait_complete(&mut self) -> Result<()> {
		let saved = self.session.timeout();
		self.session.set_timeout(self.digitize_timeout)?;
		let result = self.poll_opc();
		let restored = self.session.set_timeout(saved);

		if let Err(Error::Timeout) = result {
			// The late "1" must not be read as the answer to the next query
			warn!("acquisition still running after {:?}; clearing the link", self.digitize_timeout);
			self.session.clear()?;
		}
		restored?;
		result
	}

	fn poll_opc(&mut self) -> Result<()> {
		let start = Instant::now();
		loop {
			if self.session.query_text("*OPC?")?.trim() == "1" { return Ok(()); }
			if start.elapsed() >= self.digitize_timeout {
				return Err(Error::Timeout);
			}
			thread::sleep(Duration::from_millis(OPC_POLL_INTERVAL_MS));
		}
	}

	/// Acquires `points` samples on `channel` and blocks until the acquisition is complete.
	pub fn digitize(&mut self, channel:u8, points:usize) -> Result<()> {
		self.chan_ok(channel)?;
		if points == 0 || points > waveform::MAX_SAMPLES {
			return Err(Error::InvalidParameter(format!("points must be in 1..={}, got {}", waveform::MAX_SAMPLES, points)));
		}

		self.apply(&format!(":ACQuire:POINts {}", points))?;

		let cmd = format!(":DIGitize CHANnel{}", channel);
		self.session.send(&cmd)?;
		self.wait_complete()?;
		self.session.drain_errors(&cmd, ErrorPolicy::Abort)?;

		Ok(())
	}

	/// Points the waveform subsystem at `channel` and reads its preamble.
	pub fn read_preamble(&mut self, channel:u8) -> Result<Preamble> {
		self.chan_ok(channel)?;
		let format = self.capture_format.scpi()
			.ok_or_else(|| Error::InvalidParameter("capture format has no SCPI name".into()))?;

		self.apply(&format!(":WAVeform:SOURce CHANnel{}", channel))?;
		self.apply(&format!(":WAVeform:FORMat {}", format))?;
		if self.capture_format.sample_width().map_or(false, |w| w > 1) {
			self.apply(":WAVeform:BYTeorder LSBFirst")?;
		}
		self.apply(":WAVeform:STReaming OFF")?;

		let reply = self.session.checked_query_text(":WAVeform:PREamble?", ErrorPolicy::Abort)?;
		let preamble = preamble::parse_preamble(&reply)?;
		debug!("preamble: {} {} points, {} s/pt, {} V/code", preamble.format.name(), preamble.points, preamble.x_increment, preamble.y_increment);
		Ok(preamble)
	}

	pub fn read_scale_factors(&mut self) -> Result<ScaleFactors> {
		let policy = ErrorPolicy::Warn;
		Ok(ScaleFactors {
			x_increment: self.session.checked_query_number(":WAVeform:XINCrement?", policy)?,
			x_origin: self.session.checked_query_number(":WAVeform:XORigin?", policy)?,
			y_increment: self.session.checked_query_number(":WAVeform:YINCrement?", policy)?,
			y_origin: self.session.checked_query_number(":WAVeform:YORigin?", policy)?,
		})
	}

	/// Reads `:WAVeform:DATA?` and decodes it in the preamble's format.
	pub fn read_samples(&mut self, preamble:&Preamble) -> Result<Vec<i64>> {
		let payload = self.session.checked_query_binary_block(":WAVeform:DATA?", ErrorPolicy::Warn)?;

		let width = preamble.format.sample_width()
			.ok_or_else(|| Error::Protocol(format!("preamble format {} cannot be decoded", preamble.format.name())))?;
		let count = payload.len() / width;

		if payload.is_empty() {
			return Err(Error::Protocol("instrument returned an empty waveform".into()));
		}
		if count > waveform::MAX_SAMPLES {
			return Err(Error::Protocol(format!("{} samples exceeds the limit of {}", count, waveform::MAX_SAMPLES)));
		}

		let raw = waveform::decode_samples(preamble.format, &payload)?;
		if raw.len() != preamble.points {
			return Err(Error::Protocol(format!("received {} samples but the preamble announced {}", raw.len(), preamble.points)));
		}

		Ok(raw)
	}

	/// Digitizes `channel` and returns the decoded waveform.
	pub fn capture(&mut self, channel:u8, points:usize) -> Result<Waveform> {
		self.digitize(channel, points)?;

		let preamble = self.read_preamble(channel)?;
		if preamble.points != points {
			warn!("asked for {} points, instrument reports {}", points, preamble.points);
		}

		let scale = self.read_scale_factors()?;
		let raw = self.read_samples(&preamble)?;
		let wf = Waveform::from_raw(channel, preamble, scale, &raw);

		info!("captured {} samples on channel {} at {:.3e} Sa/s", wf.len(), channel, wf.sample_rate());
		Ok(wf)
	}

	/// Applies `cfg` and captures with its channel and point count.
	pub fn configure_and_capture(&mut self, cfg:&AcquisitionConfig) -> Result<Waveform> {
		self.configure(cfg)?;
		self.capture(cfg.channel, cfg.points)
	}

	fn measure(&mut self, channel:u8, query:&str) -> Result<f64> {
		self.chan_ok(channel)?;
		self.apply(&format!(":MEASure:SOURce CHANnel{}", channel))?;

		let x = self.session.checked_query_ascii(query, ErrorPolicy::Warn)?;
		if x.abs() >= INVALID_MEASUREMENT {
			return Err(Error::Protocol(format!("`{}` on channel {} has no valid result", query, channel)));
		}
		Ok(x)
	}

	pub fn measure_frequency(&mut self, channel:u8) -> Result<f64> { self.measure(channel, ":MEASure:FREQuency?") }

	/// Top minus base, as `:MEASure:VAMPlitude?` defines it.
	pub fn measure_amplitude(&mut self, channel:u8) -> Result<f64> { self.measure(channel, ":MEASure:VAMPlitude?") }

	/// The current display as PNG bytes.
	pub fn screenshot_png(&mut self) -> Result<Vec<u8>> {
		let png = self.session.checked_query_binary_block(":DISPlay:DATA? PNG", ErrorPolicy::Warn)?;
		if !png.starts_with(PNG_SIGNATURE) {
			return Err(Error::Protocol("screenshot is not a PNG image".into()));
		}
		Ok(png)
	}

	pub fn write_screenshot<P: AsRef<Path>>(&mut self, path:P) -> Result<()> {
		let png = self.screenshot_png()?;
		fs::write(path.as_ref(), &png)?;
		info!("wrote {} byte screenshot to {}", png.len(), path.as_ref().display());
		Ok(())
	}

	pub fn run(&mut self) -> Result<()> { self.apply(":RUN") }

	pub fn stop(&mut self) -> Result<()> { self.apply(":STOP") }

	/// Leaves the front panel usable: automatic sample rate, running, status cleared.
	pub fn cleanup(&mut self) -> Result<()> {
		self.apply(":ACQuire:SRATe:ANALog AUTO")?;
		self.apply(":RUN")?;
		self.session.send("*CLS")
	}

	/// Device clear on the link.
	pub fn clear(&mut self) -> Result<()> { self.session.clear() }

}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::transport::mock::MockTransport;
	use super::preamble::tests::preamble_reply;

	const IDN:&str = "KEYSIGHT TECHNOLOGIES,DSOS254A,MY55160101,06.40.00805";

	fn scope() -> Infiniium<MockTransport> {
		let mut mock = MockTransport::new();
		mock.on_query("*IDN?", IDN);
		Infiniium::new(ScpiSession::new(mock)).unwrap()
	}

	fn mock(s:&mut Infiniium<MockTransport>) -> &mut MockTransport { s.session_mut().transport_mut() }

	fn script_capture(m:&mut MockTransport, format:i64, raw:&[u8], points:usize) {
		m.on_query("*OPC?", "1")
			.on_query(":WAVeform:PREamble?", &preamble_reply(format, points, 1, 1))
			.on_query(":WAVeform:XINCrement?", "1.00000E-06")
			.on_query(":WAVeform:XORigin?", "0.00000E+00")
			.on_query(":WAVeform:YINCrement?", "1.00000E-02")
			.on_query(":WAVeform:YORigin?", "0.00000E+00");

		let mut block = format!("#8{:08}", raw.len()).into_bytes();
		block.extend_from_slice(raw);
		block.push(b'\n');
		m.on_query_bytes(":WAVeform:DATA?", block);
	}

	#[test]
	fn identity_is_parsed_from_idn() {
		let s = scope();
		assert_eq!(s.identity().model, "DSOS254A");
		assert_eq!(s.identity().serial_num, "MY55160101");
		assert_eq!(s.session().transport().clears(), 1);
	}

	#[test]
	fn other_vendors_are_refused() {
		let mut m = MockTransport::new();
		m.on_query("*IDN?", "Siglent Technologies,SDS1202X-E,SDSMMEBC2R0000,7.6.1.15");
		assert!(matches!(Infiniium::new(ScpiSession::new(m)), Err(Error::InvalidParameter(_))));

		let mut m = MockTransport::new();
		m.on_query("*IDN?", "Siglent Technologies,SDS1202X-E,SDSMMEBC2R0000,7.6.1.15");
		assert!(Infiniium::new_unchecked(ScpiSession::new(m)).is_ok());
	}

	#[test]
	fn garbled_idn_is_parse_error() {
		assert!(matches!(Identity::parse("KEYSIGHT"), Err(Error::Parse(_))));
	}

	#[test]
	fn configure_sends_steps_in_order_and_checks_each() {
		let mut s = scope();
		let cfg = AcquisitionConfig::default();
		s.configure(&cfg).unwrap();

		let expected:Vec<String> = cfg.commands().into_iter().map(|(_, c)| c).collect();
		let sent:Vec<String> = mock(&mut s).sent_commands().into_iter().map(|c| c.to_owned()).collect();
		assert_eq!(&sent[1..], &expected[..]);
		// one clean drain per command
		assert_eq!(mock(&mut s).error_queries(), expected.len());
	}

	#[test]
	fn configure_stops_at_rejected_command() {
		let mut s = scope();
		mock(&mut s).fail_on(":TRIGger:MODE WINDow", -224, "Illegal parameter value");

		match s.configure(&AcquisitionConfig::default()) {
			Err(Error::Device{ command, code, .. }) => {
				assert_eq!(command, ":TRIGger:MODE WINDow");
				assert_eq!(code, -224);
			},
			other => panic!("unexpected {:?}", other),
		}
		assert_eq!(mock(&mut s).sent_commands().last(), Some(&":TRIGger:MODE WINDow"));
	}

	#[test]
	fn invalid_config_sends_nothing() {
		let mut s = scope();
		let mut cfg = AcquisitionConfig::default();
		cfg.channel = 7;
		assert!(matches!(s.configure(&cfg), Err(Error::InvalidParameter(_))));
		assert_eq!(mock(&mut s).sent_commands(), vec!["*IDN?"]);
	}

	#[test]
	fn capture_decodes_byte_block() {
		let mut s = scope();
		script_capture(mock(&mut s), 1, &[0x00, 0x0a, 0xf6], 3);

		let wf = s.capture(1, 3).unwrap();
		assert_eq!(wf.len(), 3);
		assert!((wf.voltages()[1] - 0.1).abs() < 1e-12);
		assert!((wf.times()[2] - 2e-6).abs() < 1e-18);
		assert_eq!(mock(&mut s).unused_replies(), 0);

		let sent = mock(&mut s).sent_commands();
		assert!(sent.contains(&":ACQuire:POINts 3"));
		assert!(sent.contains(&":DIGitize CHANnel1"));
		assert!(sent.contains(&":WAVeform:FORMat BYTE"));
		assert!(!sent.contains(&":WAVeform:BYTeorder LSBFirst"));
	}

	#[test]
	fn word_capture_requests_little_endian() {
		let mut s = scope();
		s.set_capture_format(WaveformFormat::Word).unwrap();
		script_capture(mock(&mut s), 2, &[0xe8, 0x03, 0x18, 0xfc], 2);

		let wf = s.capture(1, 2).unwrap();
		assert!((wf.voltages()[0] - 10.0).abs() < 1e-9);
		assert!((wf.voltages()[1] + 10.0).abs() < 1e-9);

		let sent = mock(&mut s).sent_commands();
		let fmt = sent.iter().position(|c| *c == ":WAVeform:FORMat WORD").unwrap();
		let order = sent.iter().position(|c| *c == ":WAVeform:BYTeorder LSBFirst").unwrap();
		let data = sent.iter().position(|c| *c == ":WAVeform:DATA?").unwrap();
		assert!(fmt < order && order < data);
	}

	#[test]
	fn short_block_is_protocol_error() {
		let mut s = scope();
		script_capture(mock(&mut s), 1, &[0x00, 0x0a], 3);
		assert!(matches!(s.capture(1, 3), Err(Error::Protocol(_))));
	}

	#[test]
	fn empty_block_is_protocol_error() {
		let mut s = scope();
		script_capture(mock(&mut s), 1, &[], 3);
		assert!(matches!(s.capture(1, 3), Err(Error::Protocol(_))));
	}

	#[test]
	fn unknown_preamble_code_fails_capture() {
		let mut s = scope();
		script_capture(mock(&mut s), 8, &[0x00], 1);
		assert!(matches!(s.capture(1, 1), Err(Error::Protocol(_))));
	}

	#[test]
	fn data_warnings_do_not_abort_capture() {
		let mut s = scope();
		script_capture(mock(&mut s), 1, &[0x01], 1);
		mock(&mut s).fail_on(":WAVeform:DATA?", -410, "Query INTERRUPTED");

		let wf = s.capture(1, 1).unwrap();
		assert_eq!(wf.len(), 1);
		assert_eq!(mock(&mut s).queued_errors(), 0);
	}

	#[test]
	fn slow_digitize_times_out() {
		let mut s = scope();
		s.set_digitize_timeout(Duration::from_millis(1)).unwrap();
		mock(&mut s).on_query("*OPC?", "0").on_query("*OPC?", "0");
		assert!(matches!(s.digitize(1, 100), Err(Error::Timeout)));

		// One clear from `new`, one after the timeout
		assert_eq!(mock(&mut s).clears(), 2);
		let default = Duration::from_millis(crate::transport::DEFAULT_TIMEOUT_MS);
		assert_eq!(mock(&mut s).timeout_history(), &[Duration::from_millis(1), default][..]);
		assert_eq!(s.session().timeout(), default);
	}

	#[test]
	fn unanswered_opc_clears_the_link() {
		let mut s = scope();
		assert!(matches!(s.digitize(1, 100), Err(Error::Timeout)));
		assert_eq!(mock(&mut s).clears(), 2);

		// The next query gets its own reply, not a stale one
		mock(&mut s).on_query("*IDN?", IDN);
		assert_eq!(s.identify().unwrap().model, "DSOS254A");
	}

	#[test]
	fn digitize_timeout_is_raised_on_the_link_only_while_waiting() {
		let mut s = scope();
		s.set_digitize_timeout(Duration::from_secs(30)).unwrap();
		script_capture(mock(&mut s), 1, &[0x01], 1);
		s.capture(1, 1).unwrap();

		let default = Duration::from_millis(crate::transport::DEFAULT_TIMEOUT_MS);
		assert_eq!(mock(&mut s).timeout_history(), &[Duration::from_secs(30), default][..]);
	}

	#[test]
	fn zero_digitize_timeout_is_refused() {
		let mut s = scope();
		assert!(matches!(s.set_digitize_timeout(Duration::from_millis(0)), Err(Error::InvalidParameter(_))));
		assert_eq!(s.digitize_timeout(), Duration::from_millis(DEFAULT_DIGITIZE_TIMEOUT_MS));
	}

	#[test]
	fn oversized_block_is_refused_before_decoding() {
		let mut s = scope();
		let points = waveform::MAX_SAMPLES + 1;
		let preamble = preamble::parse_preamble(&preamble_reply(1, points, 1, 1)).unwrap();

		let mut block = format!("#8{:08}", points).into_bytes();
		block.resize(block.len() + points, 0);
		block.push(b'\n');
		mock(&mut s).on_query_bytes(":WAVeform:DATA?", block);

		match s.read_samples(&preamble) {
			Err(Error::Protocol(msg)) => assert!(msg.contains("exceeds"), "{}", msg),
			other => panic!("unexpected {:?}", other.map(|r| r.len())),
		}
	}

	#[test]
	fn channel_and_format_are_validated() {
		let mut s = scope();
		assert!(matches!(s.capture(0, 10), Err(Error::InvalidParameter(_))));
		assert!(matches!(s.capture(5, 10), Err(Error::InvalidParameter(_))));
		assert!(matches!(s.capture(1, 0), Err(Error::InvalidParameter(_))));
		assert!(matches!(s.set_capture_format(WaveformFormat::Float), Err(Error::InvalidParameter(_))));
		assert_eq!(s.capture_format(), WaveformFormat::Byte);
	}

	#[test]
	fn frequency_measurement_uses_source_then_query() {
		let mut s = scope();
		mock(&mut s).on_query(":MEASure:FREQuency?", "1.00012E+03");
		assert!((s.measure_frequency(2).unwrap() - 1000.12).abs() < 1e-9);

		let sent = mock(&mut s).sent_commands();
		assert_eq!(&sent[sent.len() - 2..], &[":MEASure:SOURce CHANnel2", ":MEASure:FREQuency?"]);
	}

	#[test]
	fn invalid_measurement_is_rejected() {
		let mut s = scope();
		mock(&mut s).on_query(":MEASure:VAMPlitude?", "9.99999E+37");
		assert!(matches!(s.measure_amplitude(1), Err(Error::Protocol(_))));
	}

	#[test]
	fn screenshot_is_written_verbatim() {
		let mut s = scope();
		let mut png = PNG_SIGNATURE.to_vec();
		png.extend_from_slice(b"IHDR");
		let mut block = format!("#2{:02}", png.len()).into_bytes();
		block.extend_from_slice(&png);
		mock(&mut s).on_query_bytes(":DISPlay:DATA? PNG", block);

		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("screen.png");
		s.write_screenshot(&path).unwrap();
		assert_eq!(std::fs::read(&path).unwrap(), png);
	}

	#[test]
	fn non_png_screenshot_is_protocol_error() {
		let mut s = scope();
		mock(&mut s).on_query_bytes(":DISPlay:DATA? PNG", b"#15hello".to_vec());
		assert!(matches!(s.screenshot_png(), Err(Error::Protocol(_))));
	}

	#[test]
	fn cleanup_restores_front_panel() {
		let mut s = scope();
		s.cleanup().unwrap();
		let sent = mock(&mut s).sent_commands();
		assert_eq!(&sent[1..], &[":ACQuire:SRATe:ANALog AUTO", ":RUN", "*CLS"]);
	}
}
