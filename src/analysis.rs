// Post-processing for captured waveforms: an FFT frequency estimate to cross-check the scope's own
// measurement, and a 1-D least squares line fit

use rustfft::FFTplanner;
use rustfft::num_complex::Complex;
use rustfft::num_traits::Zero;
use serde::{Serialize, Deserialize};

use crate::devices::infiniium::Waveform;
use crate::error::{Error, Result};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct LinearFitProblem {
    pub points: Vec<(f64, f64)>
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFitProblem {

    pub fn solve(&self) -> Result<LinearFit> {
        let n = self.points.len() as f64;
        let xx: f64 = self.points.iter().map(|(x, _)| *x * *x).sum();
        let xy: f64 = self.points.iter().map(|(x, y)| *x * *y).sum();
        let x: f64 = self.points.iter().map(|(x, _)| *x).sum();
        let y: f64 = self.points.iter().map(|(_, y)| *y).sum();

        let denom: f64 = n*xx - x.powi(2);
        if denom == 0.0 || !denom.is_finite() {
            Err(Error::InvalidParameter("singular least squares problem".into()))
        } else {
            let det: f64 = 1.0 / denom;
            Ok(LinearFit {
                slope:     det*( n*xy - x*y),
                intercept: det*(-x*xy + y*xx)
            })
        }
    }

}

/// `v(t) = v0 * exp(-t / tau)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExponentialDecay {
    pub v0: f64,
    pub tau: f64,
}

/// Fits a decaying exponential to the samples above `floor_v` by a line fit of `ln(v)` against time.
pub fn fit_exponential_decay(wf: &Waveform, floor_v: f64) -> Result<ExponentialDecay> {
    let floor_v = floor_v.max(f64::MIN_POSITIVE);
    let problem = LinearFitProblem {
        points: wf.samples().iter()
            .filter(|s| s.voltage > floor_v)
            .map(|s| (s.time, s.voltage.ln()))
            .collect()
    };

    if problem.points.len() < 2 {
        return Err(Error::InvalidParameter(format!("fewer than two samples above {} V", floor_v)));
    }

    let fit = problem.solve()?;
    if fit.slope >= 0.0 {
        return Err(Error::InvalidParameter("waveform is not decaying".into()));
    }

    Ok(ExponentialDecay { v0: fit.intercept.exp(), tau: -1.0 / fit.slope })
}

/// Strongest non-DC frequency in `wf`, in Hz.
///
/// The mean is removed before the FFT and the peak bin is refined with a
/// parabolic fit through its neighbours.
pub fn dominant_frequency(wf: &Waveform) -> Result<f64> {
    let n = wf.len();
    if n < 4 {
        return Err(Error::InvalidParameter(format!("need at least 4 samples for a spectrum, got {}", n)));
    }
    let dt = wf.scale().x_increment;
    if !(dt.is_finite() && dt > 0.0) {
        return Err(Error::InvalidParameter(format!("sample interval {} is not positive", dt)));
    }

    let voltages = wf.voltages();
    let lo = voltages.iter().cloned().fold(f64::INFINITY, f64::min);
    let hi = voltages.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if hi <= lo {
        return Err(Error::InvalidParameter("waveform is flat".into()));
    }
    let mean: f64 = voltages.iter().sum::<f64>() / (n as f64);

    let mut time_domain: Vec<Complex<f64>> = voltages.iter().map(|v| Complex{ re: *v - mean, im: 0.0 }).collect();
    let mut freq_domain: Vec<Complex<f64>> = vec![Complex::zero(); n];

    let mut planner = FFTplanner::new(false);
    let fft = planner.plan_fft(n);
    fft.process(&mut time_domain, &mut freq_domain);

    let mags: Vec<f64> = freq_domain.iter().map(|c| c.norm()).collect();

    // Bins 1..=n/2 cover everything up to Nyquist
    let mut best_idx: usize = 1;
    for idx in 2..=(n / 2) {
        if mags[idx] > mags[best_idx] { best_idx = idx; }
    }

    // best_idx <= n/2 < n - 1, so both neighbours exist
    let (a, b, c) = (mags[best_idx - 1], mags[best_idx], mags[best_idx + 1]);
    let denom = a - 2.0*b + c;
    let offset = if denom != 0.0 { 0.5 * (a - c) / denom } else { 0.0 };

    Ok(((best_idx as f64) + offset) / ((n as f64) * dt))
}
