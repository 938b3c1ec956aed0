//! Raw sample decoding and the scaled, time-stamped waveform.

use std::fs::File;
use std::io::Cursor;
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};

use crate::error::{Error, Result};
use super::preamble::{Preamble, WaveformFormat};

/// Largest sample count accepted from one `:WAVeform:DATA?` block.
pub const MAX_SAMPLES:usize = 10_000_000;

/// Decodes a raw block into signed integer samples.
///
/// Multi-byte formats are read little-endian, which is what the driver asks
/// for with `:WAVeform:BYTeorder LSBFirst`. ASCII, FLOAT and unknown formats are refused.
pub fn decode_samples(format:WaveformFormat, payload:&[u8]) -> Result<Vec<i64>> {
	let width = format.sample_width()
		.ok_or_else(|| Error::Protocol(format!("cannot decode {} samples as integers", format.name())))?;

	if payload.len() % width != 0 {
		return Err(Error::Protocol(format!("{} byte block is not a whole number of {}-byte samples", payload.len(), width)));
	}

	let n = payload.len() / width;
	let mut rdr = Cursor::new(payload);
	let mut ans:Vec<i64> = Vec::with_capacity(n);
	for _ in 0..n {
		let x:i64 = match width {
			1 => rdr.read_i8()? as i64,
			2 => rdr.read_i16::<LittleEndian>()? as i64,
			4 => rdr.read_i32::<LittleEndian>()? as i64,
			_ => rdr.read_i64::<LittleEndian>()?,
		};
		ans.push(x);
	}

	Ok(ans)
}

/// The linear map from sample index and raw code to seconds and volts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleFactors {
	pub x_increment: f64,
	pub x_origin: f64,
	pub y_increment: f64,
	pub y_origin: f64,
}

impl ScaleFactors {
	pub fn from_preamble(p:&Preamble) -> Self {
		ScaleFactors{ x_increment: p.x_increment, x_origin: p.x_origin, y_increment: p.y_increment, y_origin: p.y_origin }
	}

	pub fn time(&self, idx:usize) -> f64 { self.x_origin + (idx as f64)*self.x_increment }

	pub fn voltage(&self, raw:i64) -> f64 { (raw as f64)*self.y_increment + self.y_origin }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
	pub time: f64,
	pub voltage: f64,
}

/// A decoded capture. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Waveform {
	channel: u8,
	preamble: Preamble,
	scale: ScaleFactors,
	samples: Vec<Sample>,
	captured_at: DateTime<Utc>,
}

impl Waveform {

	pub fn from_raw(channel:u8, preamble:Preamble, scale:ScaleFactors, raw:&[i64]) -> Self {
		let samples = raw.iter().enumerate()
			.map(|(idx, r)| Sample{ time: scale.time(idx), voltage: scale.voltage(*r) })
			.collect();

		Waveform{ channel, preamble, scale, samples, captured_at: Utc::now() }
	}

	pub fn channel(&self) -> u8 { self.channel }
	pub fn preamble(&self) -> &Preamble { &self.preamble }
	pub fn scale(&self) -> &ScaleFactors { &self.scale }
	pub fn samples(&self) -> &[Sample] { &self.samples }
	pub fn captured_at(&self) -> DateTime<Utc> { self.captured_at }
	pub fn len(&self) -> usize { self.samples.len() }
	pub fn is_empty(&self) -> bool { self.samples.is_empty() }

	pub fn times(&self) -> Vec<f64> { self.samples.iter().map(|s| s.time).collect() }

	pub fn voltages(&self) -> Vec<f64> { self.samples.iter().map(|s| s.voltage).collect() }

	pub fn sample_rate(&self) -> f64 { 1.0 / self.scale.x_increment }

	/// `ch<n>_<YYYYmmdd_HHMMSS>.csv`, stamped with the local capture time.
	pub fn timestamped_csv_name(&self) -> String {
		let local = self.captured_at.with_timezone(&chrono::Local);
		format!("ch{}_{}.csv", self.channel, local.format("%Y%m%d_%H%M%S"))
	}

	/// Writes a `time,voltage` CSV with both columns in scientific notation.
	pub fn write_csv<P: AsRef<Path>>(&self, path:P) -> Result<()> {
		let file = File::create(path.as_ref())?;
		let mut wtr = csv::Writer::from_writer(file);

		wtr.write_record(&["time", "voltage"]).map_err(csv_err)?;
		for s in &self.samples {
			wtr.write_record(&[format!("{:e}", s.time), format!("{:e}", s.voltage)]).map_err(csv_err)?;
		}
		wtr.flush()?;

		Ok(())
	}

}

fn csv_err(e:csv::Error) -> Error { Error::Io(e.into()) }

#[cfg(test)]
mod tests {
	use super::*;
	use crate::devices::infiniium::preamble::{parse_preamble, tests::preamble_reply};

	fn scale() -> ScaleFactors {
		ScaleFactors{ x_increment: 1e-6, x_origin: 0.0, y_increment: 0.01, y_origin: 0.0 }
	}

	fn preamble(points:usize) -> Preamble { parse_preamble(&preamble_reply(1, points, 1, 1)).unwrap() }

	#[test]
	fn byte_samples_are_signed() {
		let raw = decode_samples(WaveformFormat::Byte, &[0x00, 0x0a, 0xf6, 0x80, 0x7f]).unwrap();
		assert_eq!(raw, vec![0, 10, -10, -128, 127]);
	}

	#[test]
	fn wider_formats_are_little_endian() {
		assert_eq!(decode_samples(WaveformFormat::Word, &[0x01, 0x00, 0xff, 0xff, 0x00, 0x80]).unwrap(), vec![1, -1, -32768]);
		assert_eq!(decode_samples(WaveformFormat::Long, &[0x00, 0x01, 0x00, 0x00, 0xfe, 0xff, 0xff, 0xff]).unwrap(), vec![256, -2]);
		assert_eq!(decode_samples(WaveformFormat::LongLong, &(-3i64).to_le_bytes()).unwrap(), vec![-3]);
	}

	#[test]
	fn ragged_block_is_protocol_error() {
		assert!(matches!(decode_samples(WaveformFormat::Word, &[1, 2, 3]), Err(Error::Protocol(_))));
	}

	#[test]
	fn non_integer_formats_are_refused() {
		for fmt in [WaveformFormat::Ascii, WaveformFormat::Float, WaveformFormat::Unknown(7)].iter() {
			assert!(matches!(decode_samples(*fmt, &[0, 0, 0, 0]), Err(Error::Protocol(_))));
		}
	}

	#[test]
	fn transform_matches_hand_computation() {
		let wf = Waveform::from_raw(1, preamble(3), scale(), &[0, 10, -10]);
		let v = wf.voltages();
		let t = wf.times();
		assert_eq!(v.len(), 3);
		assert!((v[0] - 0.0).abs() < 1e-12);
		assert!((v[1] - 0.1).abs() < 1e-12);
		assert!((v[2] + 0.1).abs() < 1e-12);
		assert!((t[0] - 0.0).abs() < 1e-18);
		assert!((t[1] - 1e-6).abs() < 1e-18);
		assert!((t[2] - 2e-6).abs() < 1e-18);
		assert!((wf.sample_rate() - 1e6).abs() < 1e-3);
	}

	#[test]
	fn csv_has_header_and_scientific_rows() {
		let wf = Waveform::from_raw(1, preamble(3), scale(), &[0, 10, -10]);
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("trace.csv");
		wf.write_csv(&path).unwrap();

		let text = std::fs::read_to_string(&path).unwrap();
		let lines:Vec<&str> = text.lines().collect();
		assert_eq!(lines.len(), 4);
		assert_eq!(lines[0], "time,voltage");
		assert_eq!(lines[1], "0e0,0e0");
		assert_eq!(lines[2], format!("{:e},{:e}", 1e-6, 10.0*0.01));

		let mut rdr = csv::Reader::from_path(&path).unwrap();
		let rows:Vec<(f64, f64)> = rdr.deserialize().map(|r| r.unwrap()).collect();
		assert_eq!(rows.len(), 3);
		assert!((rows[2].1 + 0.1).abs() < 1e-12);
	}

	#[test]
	fn csv_name_carries_channel_and_timestamp() {
		let wf = Waveform::from_raw(3, preamble(1), scale(), &[0]);
		let name = wf.timestamped_csv_name();
		assert!(name.starts_with("ch3_"));
		assert!(name.ends_with(".csv"));
		// ch3_ + YYYYmmdd_HHMMSS + .csv
		assert_eq!(name.len(), 4 + 15 + 4);
	}
}
