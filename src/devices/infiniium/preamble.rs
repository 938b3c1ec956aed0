//! `:WAVeform:PREamble?` parsing.
//!
//! The reply is 24 comma-separated fields in a fixed order. The coded fields
//! map onto closed enums that keep unrecognised codes as `Unknown(code)`, and
//! [`parse_preamble`] refuses a preamble carrying any of those.

use serde::{Serialize, Deserialize};

use crate::error::{Error, Result};

pub const PREAMBLE_FIELDS:usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaveformFormat { Ascii, Byte, Word, Long, LongLong, Float, Unknown(i64) }

impl WaveformFormat {
	pub fn from_code(code:i64) -> Self {
		match code {
			0 => WaveformFormat::Ascii,
			1 => WaveformFormat::Byte,
			2 => WaveformFormat::Word,
			3 => WaveformFormat::Long,
			4 => WaveformFormat::LongLong,
			5 => WaveformFormat::Float,
			x => WaveformFormat::Unknown(x),
		}
	}

	pub fn name(self) -> &'static str {
		match self {
			WaveformFormat::Ascii      => "ASCII",
			WaveformFormat::Byte       => "BYTE",
			WaveformFormat::Word       => "WORD",
			WaveformFormat::Long       => "LONG",
			WaveformFormat::LongLong   => "LONGLONG",
			WaveformFormat::Float      => "FLOAT",
			WaveformFormat::Unknown(_) => "UNKNOWN",
		}
	}

	/// Argument for `:WAVeform:FORMat`.
	pub fn scpi(self) -> Option<&'static str> {
		match self {
			WaveformFormat::Ascii      => Some("ASCii"),
			WaveformFormat::Byte       => Some("BYTE"),
			WaveformFormat::Word       => Some("WORD"),
			WaveformFormat::Long       => Some("LONG"),
			WaveformFormat::LongLong   => Some("LONGLONG"),
			WaveformFormat::Float      => Some("FLOat"),
			WaveformFormat::Unknown(_) => None,
		}
	}

	/// Bytes per sample for the signed-integer formats, `None` for the rest.
	pub fn sample_width(self) -> Option<usize> {
		match self {
			WaveformFormat::Byte     => Some(1),
			WaveformFormat::Word     => Some(2),
			WaveformFormat::Long     => Some(4),
			WaveformFormat::LongLong => Some(8),
			_ => None,
		}
	}

	pub fn is_known(self) -> bool { !matches!(self, WaveformFormat::Unknown(_)) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AcquisitionType { Raw, Average, VerticalHistogram, HorizontalHistogram, Interpolate, Digital, PeakDetect, Unknown(i64) }

impl AcquisitionType {
	pub fn from_code(code:i64) -> Self {
		match code {
			1  => AcquisitionType::Raw,
			2  => AcquisitionType::Average,
			3  => AcquisitionType::VerticalHistogram,
			4  => AcquisitionType::HorizontalHistogram,
			6  => AcquisitionType::Interpolate,
			9  => AcquisitionType::Digital,
			10 => AcquisitionType::PeakDetect,
			x  => AcquisitionType::Unknown(x),
		}
	}

	pub fn name(self) -> &'static str {
		match self {
			AcquisitionType::Raw                 => "RAW",
			AcquisitionType::Average             => "AVERAGE",
			AcquisitionType::VerticalHistogram   => "VHISTOGRAM",
			AcquisitionType::HorizontalHistogram => "HHISTOGRAM",
			AcquisitionType::Interpolate         => "INTERPOLATE",
			AcquisitionType::Digital             => "DIGITAL",
			AcquisitionType::PeakDetect          => "PDETECT",
			AcquisitionType::Unknown(_)          => "UNKNOWN",
		}
	}

	pub fn is_known(self) -> bool { !matches!(self, AcquisitionType::Unknown(_)) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Coupling { Ac, Dc, Dc50, LfReject, Unknown(i64) }

impl Coupling {
	pub fn from_code(code:i64) -> Self {
		match code {
			0 => Coupling::Ac,
			1 => Coupling::Dc,
			2 => Coupling::Dc50,
			3 => Coupling::LfReject,
			x => Coupling::Unknown(x),
		}
	}

	pub fn name(self) -> &'static str {
		match self {
			Coupling::Ac         => "AC",
			Coupling::Dc         => "DC",
			Coupling::Dc50       => "DC50",
			Coupling::LfReject   => "LFREJECT",
			Coupling::Unknown(_) => "UNKNOWN",
		}
	}

	pub fn is_known(self) -> bool { !matches!(self, Coupling::Unknown(_)) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AcquisitionMode { RealTime, EquivalentTime, PeakDetect, HighResolution, Segmented, SegmentedPeakDetect, SegmentedHighResolution, Unknown(i64) }

impl AcquisitionMode {
	pub fn from_code(code:i64) -> Self {
		match code {
			0 => AcquisitionMode::RealTime,
			1 => AcquisitionMode::EquivalentTime,
			2 => AcquisitionMode::PeakDetect,
			3 => AcquisitionMode::HighResolution,
			4 => AcquisitionMode::Segmented,
			5 => AcquisitionMode::SegmentedPeakDetect,
			6 => AcquisitionMode::SegmentedHighResolution,
			x => AcquisitionMode::Unknown(x),
		}
	}

	pub fn name(self) -> &'static str {
		match self {
			AcquisitionMode::RealTime                => "RTIME",
			AcquisitionMode::EquivalentTime          => "ETIME",
			AcquisitionMode::PeakDetect              => "PDETECT",
			AcquisitionMode::HighResolution          => "HRESOLUTION",
			AcquisitionMode::Segmented               => "SEGMENTED",
			AcquisitionMode::SegmentedPeakDetect     => "SEGPDETECT",
			AcquisitionMode::SegmentedHighResolution => "SEGHRES",
			AcquisitionMode::Unknown(_)              => "UNKNOWN",
		}
	}

	pub fn is_known(self) -> bool { !matches!(self, AcquisitionMode::Unknown(_)) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Units { Unknown, Volt, Second, Constant, Amp, Decibel, Hertz, Watt, Unrecognized(i64) }

impl Units {
	pub fn from_code(code:i64) -> Self {
		match code {
			0 => Units::Unknown,
			1 => Units::Volt,
			2 => Units::Second,
			3 => Units::Constant,
			4 => Units::Amp,
			5 => Units::Decibel,
			6 => Units::Hertz,
			7 => Units::Watt,
			x => Units::Unrecognized(x),
		}
	}

	pub fn name(self) -> &'static str {
		match self {
			Units::Unknown         => "UNKNOWN",
			Units::Volt            => "VOLT",
			Units::Second          => "SECOND",
			Units::Constant        => "CONSTANT",
			Units::Amp             => "AMP",
			Units::Decibel         => "DECIBEL",
			Units::Hertz           => "HERTZ",
			Units::Watt            => "WATT",
			Units::Unrecognized(_) => "UNRECOGNIZED",
		}
	}

	// Code 0 is the instrument's own "unknown units" and is a valid answer
	pub fn is_known(self) -> bool { !matches!(self, Units::Unrecognized(_)) }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preamble {
	pub format: WaveformFormat,
	pub acquisition_type: AcquisitionType,
	pub points: usize,
	pub count: u32,
	pub x_increment: f64,
	pub x_origin: f64,
	pub x_reference: f64,
	pub y_increment: f64,
	pub y_origin: f64,
	pub y_reference: f64,
	pub coupling: Coupling,
	pub x_display_range: f64,
	pub x_display_origin: f64,
	pub y_display_range: f64,
	pub y_display_origin: f64,
	pub date: String,
	pub time: String,
	pub frame_model: String,
	pub acquisition_mode: AcquisitionMode,
	pub completion: f64,
	pub x_units: Units,
	pub y_units: Units,
	pub max_bandwidth: f64,
	pub min_bandwidth: f64,
}

fn real(fields:&[&str], idx:usize, name:&str) -> Result<f64> {
	let text = fields[idx];
	let x:f64 = text.parse().map_err(|_| Error::Parse(format!("preamble field {} ({}) {:?} is not a number", idx + 1, name, text)))?;
	if x.is_finite() { Ok(x) }
	else { Err(Error::Parse(format!("preamble field {} ({}) is not finite", idx + 1, name))) }
}

// Integer fields sometimes arrive in NR3 form ("6.40000E+04")
fn integer(fields:&[&str], idx:usize, name:&str) -> Result<i64> {
	let x = real(fields, idx, name)?;
	if x.fract() != 0.0 || x.abs() > i64::MAX as f64 {
		return Err(Error::Parse(format!("preamble field {} ({}) {:?} is not an integer", idx + 1, name, fields[idx])));
	}
	Ok(x as i64)
}

fn unsigned(fields:&[&str], idx:usize, name:&str) -> Result<u64> {
	let x = integer(fields, idx, name)?;
	if x < 0 {
		return Err(Error::Parse(format!("preamble field {} ({}) is negative", idx + 1, name)));
	}
	Ok(x as u64)
}

fn text(fields:&[&str], idx:usize) -> String { fields[idx].trim_matches('"').to_owned() }

fn unknown(name:&str, code:i64) -> Error { Error::Protocol(format!("preamble {} code {} is not one the instrument documents", name, code)) }

/// Parses a `:WAVeform:PREamble?` reply.
pub fn parse_preamble(reply:&str) -> Result<Preamble> {
	let fields:Vec<&str> = reply.trim().split(',').map(str::trim).collect();
	if fields.len() != PREAMBLE_FIELDS {
		return Err(Error::Protocol(format!("preamble has {} fields, expected {}", fields.len(), PREAMBLE_FIELDS)));
	}

	let format_code = integer(&fields, 0, "format")?;
	let type_code   = integer(&fields, 1, "type")?;
	let coupling_code = integer(&fields, 10, "coupling")?;
	let mode_code   = integer(&fields, 18, "acquisition mode")?;
	let x_units_code = integer(&fields, 20, "x units")?;
	let y_units_code = integer(&fields, 21, "y units")?;

	let preamble = Preamble {
		format: WaveformFormat::from_code(format_code),
		acquisition_type: AcquisitionType::from_code(type_code),
		points: unsigned(&fields, 2, "points")? as usize,
		count: unsigned(&fields, 3, "count")?.min(u32::MAX as u64) as u32,
		x_increment: real(&fields, 4, "x increment")?,
		x_origin: real(&fields, 5, "x origin")?,
		x_reference: real(&fields, 6, "x reference")?,
		y_increment: real(&fields, 7, "y increment")?,
		y_origin: real(&fields, 8, "y origin")?,
		y_reference: real(&fields, 9, "y reference")?,
		coupling: Coupling::from_code(coupling_code),
		x_display_range: real(&fields, 11, "x display range")?,
		x_display_origin: real(&fields, 12, "x display origin")?,
		y_display_range: real(&fields, 13, "y display range")?,
		y_display_origin: real(&fields, 14, "y display origin")?,
		date: text(&fields, 15),
		time: text(&fields, 16),
		frame_model: text(&fields, 17),
		acquisition_mode: AcquisitionMode::from_code(mode_code),
		completion: real(&fields, 19, "completion")?,
		x_units: Units::from_code(x_units_code),
		y_units: Units::from_code(y_units_code),
		max_bandwidth: real(&fields, 22, "max bandwidth")?,
		min_bandwidth: real(&fields, 23, "min bandwidth")?,
	};

	if !preamble.format.is_known()           { return Err(unknown("format", format_code)); }
	if !preamble.acquisition_type.is_known() { return Err(unknown("type", type_code)); }
	if !preamble.coupling.is_known()         { return Err(unknown("coupling", coupling_code)); }
	if !preamble.acquisition_mode.is_known() { return Err(unknown("acquisition mode", mode_code)); }
	if !preamble.x_units.is_known()          { return Err(unknown("x units", x_units_code)); }
	if !preamble.y_units.is_known()          { return Err(unknown("y units", y_units_code)); }

	Ok(preamble)
}
