use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::error::WatermarkError;
use crate::result::Result;

/// A DCT-II / DCT-III pair for one fixed length, computed through an
/// N-point complex FFT.
///
/// The input is reordered (even indices ascending, odd indices descending),
/// fed to the FFT and the spectrum is rotated by `exp(-i·π·k / 2N)`.
/// The inverse runs the same steps backwards. Neither direction is
/// normalized, so `inverse(forward(x)) == x · N/2`.
///
/// Any length `N >= 1` is supported.
pub struct DctPlan {
    len: usize,
    fft: Arc<dyn Fft<f64>>,
    twiddles: Vec<Complex<f64>>,
}

impl DctPlan {
    pub fn new(len: usize) -> Result<Self> {
        Self::with_planner(&mut FftPlanner::new(), len)
    }

    pub fn with_planner(planner: &mut FftPlanner<f64>, len: usize) -> Result<Self> {
        if len == 0 {
            return Err(WatermarkError::UnsupportedTransformLength(len));
        }

        let twiddles = (0..len)
            .map(|k| {
                let angle = k as f64 * PI / (2 * len) as f64;
                Complex::new(angle.cos(), angle.sin())
            })
            .collect();

        Ok(Self {
            len,
            fft: planner.plan_fft_forward(len),
            twiddles,
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// in place DCT-II: `X[k] = Σ x[n]·cos(π/N·(n + ½)·k)`
    pub fn forward(&self, buffer: &mut [f64]) -> Result<()> {
        self.check_len(buffer)?;
        let n = self.len;
        let half = n / 2;

        let mut spectrum = vec![Complex::new(0.0, 0.0); n];
        for i in 0..half {
            spectrum[i].re = buffer[2 * i];
            spectrum[n - 1 - i].re = buffer[2 * i + 1];
        }
        if n % 2 == 1 {
            spectrum[half].re = buffer[n - 1];
        }

        self.fft.process(&mut spectrum);

        for ((out, v), t) in buffer.iter_mut().zip(&spectrum).zip(&self.twiddles) {
            *out = v.re * t.re + v.im * t.im;
        }

        Ok(())
    }

    /// in place DCT-III: `x[n] = X[0]/2 + Σ_{k≥1} X[k]·cos(π/N·(n + ½)·k)`
    pub fn inverse(&self, buffer: &mut [f64]) -> Result<()> {
        self.check_len(buffer)?;
        let n = self.len;
        let half = n / 2;

        let mut spectrum: Vec<Complex<f64>> = buffer
            .iter()
            .zip(&self.twiddles)
            .enumerate()
            .map(|(k, (x, t))| {
                let x = if k == 0 { *x / 2.0 } else { *x };
                Complex::new(x * t.re, -x * t.im)
            })
            .collect();

        self.fft.process(&mut spectrum);

        for i in 0..half {
            buffer[2 * i] = spectrum[i].re;
            buffer[2 * i + 1] = spectrum[n - 1 - i].re;
        }
        if n % 2 == 1 {
            buffer[n - 1] = spectrum[half].re;
        }

        Ok(())
    }

    fn check_len(&self, buffer: &[f64]) -> Result<()> {
        if buffer.len() != self.len {
            return Err(WatermarkError::TransformLengthMismatch {
                expected: self.len,
                actual: buffer.len(),
            });
        }
        Ok(())
    }
}

impl fmt::Debug for DctPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DctPlan").field("len", &self.len).finish()
    }
}
