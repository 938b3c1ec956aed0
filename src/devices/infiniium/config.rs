//! Front-panel setup for one capture, rendered as an ordered list of SCPI commands.

use std::fs;
use std::path::Path;

use serde::{Serialize, Deserialize};

use crate::error::{Error, Result};
use super::waveform::MAX_SAMPLES;

pub const DEFAULT_CHANNEL_COUNT:u8 = 4;
pub const DIVISIONS_PER_SCREEN:f64 = 10.0;

/// Channel input coupling and termination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Input {
	DC,
	DC50,
	AC,
	LFR1,
	LFR2,
}

impl Input {
	pub fn scpi(self) -> &'static str {
		match self {
			Input::DC   => "DC",
			Input::DC50 => "DC50",
			Input::AC   => "AC",
			Input::LFR1 => "LFR1",
			Input::LFR2 => "LFR2",
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Slope { Positive, Negative, Either }

impl Slope {
	pub fn scpi(self) -> &'static str {
		match self {
			Slope::Positive => "POSitive",
			Slope::Negative => "NEGative",
			Slope::Either   => "EITHer",
		}
	}
}

/// When a window trigger fires relative to the band between its thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowCondition { Enter, Exit, Inside, Outside }

impl WindowCondition {
	pub fn scpi(self) -> &'static str {
		match self {
			WindowCondition::Enter   => "ENTer",
			WindowCondition::Exit    => "EXIT",
			WindowCondition::Inside  => "INSide",
			WindowCondition::Outside => "OUTSide",
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode")]
pub enum TriggerConfig {
	Edge { slope:Slope, level_v:f64 },
	Window { condition:WindowCondition, high_v:f64, low_v:f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sweep { Auto, Triggered, Single }

impl Sweep {
	pub fn scpi(self) -> &'static str {
		match self {
			Sweep::Auto      => "AUTO",
			Sweep::Triggered => "TRIGgered",
			Sweep::Single    => "SINGle",
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SampleRate {
	Auto,
	Fixed(f64),
}

/// One stage of the setup sequence, in the order the instrument receives them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigStep {
	Reset,
	ChannelCoupling,
	ChannelDisplay,
	ChannelRange,
	ChannelOffset,
	TimebaseRange,
	TimebasePosition,
	SampleRate,
	TriggerMode,
	TriggerSource,
	TriggerThresholdHigh,
	TriggerThresholdLow,
	TriggerSweep,
	InterpolationOff,
	AveragingOff,
}

impl ConfigStep {
	pub fn name(self) -> &'static str {
		match self {
			ConfigStep::Reset                => "reset",
			ConfigStep::ChannelCoupling      => "channel_coupling",
			ConfigStep::ChannelDisplay       => "channel_display",
			ConfigStep::ChannelRange         => "channel_range",
			ConfigStep::ChannelOffset        => "channel_offset",
			ConfigStep::TimebaseRange        => "timebase_range",
			ConfigStep::TimebasePosition     => "timebase_position",
			ConfigStep::SampleRate           => "sample_rate",
			ConfigStep::TriggerMode          => "trigger_mode",
			ConfigStep::TriggerSource        => "trigger_source",
			ConfigStep::TriggerThresholdHigh => "trigger_threshold_high",
			ConfigStep::TriggerThresholdLow  => "trigger_threshold_low",
			ConfigStep::TriggerSweep         => "trigger_sweep",
			ConfigStep::InterpolationOff     => "interpolation_off",
			ConfigStep::AveragingOff         => "averaging_off",
		}
	}
}

/// Acquisition setup for a single-channel capture.
///
/// The default is the bench setup used throughout the lab: channel 1 at
/// ±400 mV (0.8 V full range), 200 µs/div, a window trigger at ±300 mV and
/// 64 000 points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
	pub channel: u8,
	pub channel_count: u8,
	pub input: Input,
	pub range_v: f64,
	pub offset_v: f64,
	pub timebase_range_s: f64,
	pub timebase_position_s: f64,
	pub trigger: TriggerConfig,
	pub sweep: Sweep,
	pub sample_rate: SampleRate,
	pub points: usize,
	pub interpolation: bool,
	pub averaging: bool,
}

impl Default for AcquisitionConfig {
	fn default() -> Self {
		AcquisitionConfig {
			channel: 1,
			channel_count: DEFAULT_CHANNEL_COUNT,
			input: Input::DC,
			range_v: 0.8,
			offset_v: 0.0,
			timebase_range_s: 2e-3,
			timebase_position_s: 0.0,
			trigger: TriggerConfig::Window{ condition: WindowCondition::Exit, high_v: 0.3, low_v: -0.3 },
			sweep: Sweep::Triggered,
			sample_rate: SampleRate::Auto,
			points: 64_000,
			interpolation: false,
			averaging: false,
		}
	}
}

fn positive(x:f64, what:&str) -> Result<()> {
	if x.is_finite() && x > 0.0 { Ok(()) }
	else { Err(Error::InvalidParameter(format!("{} must be positive and finite, got {}", what, x))) }
}

fn finite(x:f64, what:&str) -> Result<()> {
	if x.is_finite() { Ok(()) }
	else { Err(Error::InvalidParameter(format!("{} must be finite, got {}", what, x))) }
}

fn on_off(b:bool) -> &'static str { if b { "ON" } else { "OFF" } }

impl AcquisitionConfig {

	pub fn from_json_file<P: AsRef<Path>>(path:P) -> Result<Self> {
		let text = fs::read_to_string(path.as_ref())?;
		let cfg:Self = serde_json::from_str(&text)
			.map_err(|e| Error::InvalidParameter(format!("{}: {}", path.as_ref().display(), e)))?;
		cfg.validate()?;
		Ok(cfg)
	}

	/// Sets a symmetric vertical window of ±`volts` around the offset.
	pub fn set_symmetric_range(&mut self, volts:f64) -> &mut Self {
		self.range_v = 2.0 * volts;
		self
	}

	pub fn set_time_per_division(&mut self, seconds:f64) -> &mut Self {
		self.timebase_range_s = DIVISIONS_PER_SCREEN * seconds;
		self
	}

	pub fn validate(&self) -> Result<()> {
		if self.channel_count == 0 {
			return Err(Error::InvalidParameter("channel_count must be at least 1".into()));
		}
		if self.channel < 1 || self.channel > self.channel_count {
			return Err(Error::InvalidParameter(format!("channel {} is outside 1..={}", self.channel, self.channel_count)));
		}
		if self.points == 0 || self.points > MAX_SAMPLES {
			return Err(Error::InvalidParameter(format!("points must be in 1..={}, got {}", MAX_SAMPLES, self.points)));
		}

		positive(self.range_v, "range_v")?;
		finite(self.offset_v, "offset_v")?;
		positive(self.timebase_range_s, "timebase_range_s")?;
		finite(self.timebase_position_s, "timebase_position_s")?;

		if let SampleRate::Fixed(rate) = self.sample_rate {
			positive(rate, "sample_rate")?;
		}

		match self.trigger {
			TriggerConfig::Edge{ level_v, .. } => finite(level_v, "trigger level_v")?,
			TriggerConfig::Window{ high_v, low_v, .. } => {
				finite(high_v, "trigger high_v")?;
				finite(low_v, "trigger low_v")?;
				if high_v <= low_v {
					return Err(Error::InvalidParameter(format!("window trigger needs high_v > low_v, got {} <= {}", high_v, low_v)));
				}
			},
		}

		Ok(())
	}

	/// The steps that apply to this setup, in send order. An edge trigger has no low threshold.
	pub fn steps(&self) -> Vec<ConfigStep> {
		let mut ans = vec![
			ConfigStep::Reset,
			ConfigStep::ChannelCoupling,
			ConfigStep::ChannelDisplay,
			ConfigStep::ChannelRange,
			ConfigStep::ChannelOffset,
			ConfigStep::TimebaseRange,
			ConfigStep::TimebasePosition,
			ConfigStep::SampleRate,
			ConfigStep::TriggerMode,
			ConfigStep::TriggerSource,
			ConfigStep::TriggerThresholdHigh,
		];
		if let TriggerConfig::Window{ .. } = self.trigger {
			ans.push(ConfigStep::TriggerThresholdLow);
		}
		ans.push(ConfigStep::TriggerSweep);
		ans.push(ConfigStep::InterpolationOff);
		ans.push(ConfigStep::AveragingOff);
		ans
	}

	pub fn render(&self, step:ConfigStep) -> Vec<String> {
		let ch = self.channel;
		match step {
			ConfigStep::Reset => vec!["*CLS".into(), "*RST".into()],
			ConfigStep::ChannelCoupling => vec![format!(":CHANnel{}:INPut {}", ch, self.input.scpi())],
			ConfigStep::ChannelDisplay => {
				let mut cmds:Vec<String> = (1..=self.channel_count).map(|n| format!(":CHANnel{}:DISPlay OFF", n)).collect();
				cmds.push(format!(":CHANnel{}:DISPlay ON", ch));
				cmds
			},
			ConfigStep::ChannelRange  => vec![format!(":CHANnel{}:RANGe {}", ch, self.range_v)],
			ConfigStep::ChannelOffset => vec![format!(":CHANnel{}:OFFSet {}", ch, self.offset_v)],
			ConfigStep::TimebaseRange    => vec![format!(":TIMebase:RANGe {}", self.timebase_range_s)],
			ConfigStep::TimebasePosition => vec![format!(":TIMebase:POSition {}", self.timebase_position_s)],
			ConfigStep::SampleRate => match self.sample_rate {
				SampleRate::Auto        => vec![":ACQuire:SRATe:ANALog AUTO".into()],
				SampleRate::Fixed(rate) => vec![format!(":ACQuire:SRATe:ANALog {}", rate)],
			},
			ConfigStep::TriggerMode => match self.trigger {
				TriggerConfig::Edge{ .. }   => vec![":TRIGger:MODE EDGE".into()],
				TriggerConfig::Window{ .. } => vec![":TRIGger:MODE WINDow".into()],
			},
			ConfigStep::TriggerSource => match self.trigger {
				TriggerConfig::Edge{ .. } => vec![format!(":TRIGger:EDGE:SOURce CHANnel{}", ch)],
				TriggerConfig::Window{ condition, .. } => vec![
					format!(":TRIGger:WINDow:SOURce CHANnel{}", ch),
					format!(":TRIGger:WINDow:CONDition {}", condition.scpi()),
				],
			},
			ConfigStep::TriggerThresholdHigh => match self.trigger {
				TriggerConfig::Edge{ slope, level_v } => vec![
					format!(":TRIGger:LEVel CHANnel{},{}", ch, level_v),
					format!(":TRIGger:EDGE:SLOPe {}", slope.scpi()),
				],
				TriggerConfig::Window{ high_v, .. } => vec![format!(":TRIGger:HTHReshold CHANnel{},{}", ch, high_v)],
			},
			ConfigStep::TriggerThresholdLow => match self.trigger {
				TriggerConfig::Edge{ .. } => vec![],
				TriggerConfig::Window{ low_v, .. } => vec![format!(":TRIGger:LTHReshold CHANnel{},{}", ch, low_v)],
			},
			ConfigStep::TriggerSweep     => vec![format!(":TRIGger:SWEep {}", self.sweep.scpi())],
			ConfigStep::InterpolationOff => vec![format!(":ACQuire:INTerpolate {}", on_off(self.interpolation))],
			ConfigStep::AveragingOff     => vec![format!(":ACQuire:AVERage {}", on_off(self.averaging))],
		}
	}

	/// Every command of the setup, each tagged with the step it belongs to.
	pub fn commands(&self) -> Vec<(ConfigStep, String)> {
		self.steps().into_iter()
			.flat_map(|step| self.render(step).into_iter().map(move |cmd| (step, cmd)))
			.collect()
	}

}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	fn lab_setup() -> AcquisitionConfig { AcquisitionConfig::default() }

	fn rejected<F: Fn(&mut AcquisitionConfig)>(f:F) -> bool {
		let mut cfg = AcquisitionConfig::default();
		f(&mut cfg);
		matches!(cfg.validate(), Err(Error::InvalidParameter(_)))
	}

	#[test]
	fn front_panel_helpers_convert_to_full_scale() {
		let mut cfg = AcquisitionConfig::default();
		cfg.set_symmetric_range(0.4).set_time_per_division(200e-6);
		assert!((cfg.range_v - 0.8).abs() < 1e-12);
		assert!((cfg.timebase_range_s - 2e-3).abs() < 1e-15);
	}

	#[test]
	fn lab_setup_renders_expected_commands() {
		let cfg = lab_setup();
		cfg.validate().unwrap();

		let cmds:Vec<String> = cfg.commands().into_iter().map(|(_, c)| c).collect();
		assert_eq!(cmds, vec![
			"*CLS",
			"*RST",
			":CHANnel1:INPut DC",
			":CHANnel1:DISPlay OFF",
			":CHANnel2:DISPlay OFF",
			":CHANnel3:DISPlay OFF",
			":CHANnel4:DISPlay OFF",
			":CHANnel1:DISPlay ON",
			":CHANnel1:RANGe 0.8",
			":CHANnel1:OFFSet 0",
			":TIMebase:RANGe 0.002",
			":TIMebase:POSition 0",
			":ACQuire:SRATe:ANALog AUTO",
			":TRIGger:MODE WINDow",
			":TRIGger:WINDow:SOURce CHANnel1",
			":TRIGger:WINDow:CONDition EXIT",
			":TRIGger:HTHReshold CHANnel1,0.3",
			":TRIGger:LTHReshold CHANnel1,-0.3",
			":TRIGger:SWEep TRIGgered",
			":ACQuire:INTerpolate OFF",
			":ACQuire:AVERage OFF",
		]);
	}

	#[test]
	fn reset_comes_first_and_averaging_last() {
		let steps = lab_setup().steps();
		assert_eq!(steps.first(), Some(&ConfigStep::Reset));
		assert_eq!(steps.last(), Some(&ConfigStep::AveragingOff));

		let names:Vec<&str> = steps.iter().map(|s| s.name()).collect();
		let pos = |n:&str| names.iter().position(|x| *x == n).unwrap();
		assert!(pos("channel_coupling") < pos("channel_display"));
		assert!(pos("channel_range") < pos("timebase_range"));
		assert!(pos("trigger_mode") < pos("trigger_source"));
		assert!(pos("trigger_threshold_high") < pos("trigger_threshold_low"));
		assert!(pos("trigger_threshold_low") < pos("trigger_sweep"));
		assert!(pos("interpolation_off") < pos("averaging_off"));
	}

	#[test]
	fn edge_trigger_has_no_low_threshold() {
		let mut cfg = AcquisitionConfig::default();
		cfg.trigger = TriggerConfig::Edge{ slope: Slope::Negative, level_v: 0.1 };
		cfg.channel = 2;

		assert!(!cfg.steps().contains(&ConfigStep::TriggerThresholdLow));
		assert_eq!(cfg.render(ConfigStep::TriggerThresholdHigh), vec![
			":TRIGger:LEVel CHANnel2,0.1".to_owned(),
			":TRIGger:EDGE:SLOPe NEGative".to_owned(),
		]);
		assert_eq!(cfg.render(ConfigStep::TriggerSource), vec![":TRIGger:EDGE:SOURce CHANnel2".to_owned()]);
	}

	#[test]
	fn fixed_sample_rate_is_rendered() {
		let mut cfg = AcquisitionConfig::default();
		cfg.sample_rate = SampleRate::Fixed(2.5e9);
		assert_eq!(cfg.render(ConfigStep::SampleRate), vec![":ACQuire:SRATe:ANALog 2500000000".to_owned()]);
	}

	#[test]
	fn validation_rejects_bad_setups() {
		assert!(rejected(|c| c.channel = 0));
		assert!(rejected(|c| c.channel = 5));
		assert!(rejected(|c| c.channel_count = 0));
		assert!(rejected(|c| c.points = 0));
		assert!(rejected(|c| c.points = MAX_SAMPLES + 1));
		assert!(rejected(|c| c.range_v = 0.0));
		assert!(rejected(|c| c.range_v = f64::NAN));
		assert!(rejected(|c| c.timebase_range_s = -1e-3));
		assert!(rejected(|c| c.sample_rate = SampleRate::Fixed(0.0)));
		assert!(rejected(|c| c.trigger = TriggerConfig::Window{ condition: WindowCondition::Exit, high_v: -0.3, low_v: 0.3 }));
		assert!(rejected(|c| c.trigger = TriggerConfig::Edge{ slope: Slope::Positive, level_v: f64::INFINITY }));
		assert!(!rejected(|c| c.channel = 4));
	}

	#[test]
	fn loads_partial_json_over_defaults() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		write!(file, r#"{{ "channel": 2, "points": 1000, "trigger": {{ "mode": "Edge", "slope": "Positive", "level_v": 0.05 }} }}"#).unwrap();

		let cfg = AcquisitionConfig::from_json_file(file.path()).unwrap();
		assert_eq!(cfg.channel, 2);
		assert_eq!(cfg.points, 1000);
		assert_eq!(cfg.trigger, TriggerConfig::Edge{ slope: Slope::Positive, level_v: 0.05 });
		assert_eq!(cfg.range_v, 0.8);
	}

	#[test]
	fn invalid_json_file_is_rejected() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		write!(file, r#"{{ "channel": 9 }}"#).unwrap();
		assert!(matches!(AcquisitionConfig::from_json_file(file.path()), Err(Error::InvalidParameter(_))));

		let mut file = tempfile::NamedTempFile::new().unwrap();
		write!(file, "not json").unwrap();
		assert!(matches!(AcquisitionConfig::from_json_file(file.path()), Err(Error::InvalidParameter(_))));
	}
}
