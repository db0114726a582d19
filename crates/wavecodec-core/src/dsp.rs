//! Small DSP helpers used by the modems
//!
//! Everything here works on whole, materialized `f64` slices.

use std::f64::consts::PI;

/// Arithmetic mean (0.0 for an empty slice)
pub fn mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f64>() / samples.len() as f64
}

/// Subtract the mean from every sample in place
pub fn remove_mean(samples: &mut [f64]) {
    let m = mean(samples);
    samples.iter_mut().for_each(|s| *s -= m);
}

/// Sample-wise dot product over the common length
#[inline]
pub fn correlate(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Sum of absolute values
#[inline]
pub fn abs_sum(samples: &[f64]) -> f64 {
    samples.iter().map(|s| s.abs()).sum()
}

/// Moving average with a uniform kernel of `window` taps.
///
/// Aligned like a centred ("same" mode) convolution: output `i` averages
/// input indices `i + off - window + 1 ..= i + off` with
/// `off = (window - 1) / 2`, and samples past either edge count as zero.
/// The output always has the input's length. A window of 0 is treated as 1.
///
/// Unlike numpy's `convolve(mode="same")`, which returns `max(len, window)`
/// samples, a window longer than the input does not lengthen the output;
/// the demodulators rely on length-preserving filtering.
pub fn moving_average(samples: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let len = samples.len();
    if len == 0 {
        return Vec::new();
    }

    // prefix[k] = sum of samples[..k]
    let mut prefix = Vec::with_capacity(len + 1);
    prefix.push(0.0);
    let mut acc = 0.0;
    for &s in samples {
        acc += s;
        prefix.push(acc);
    }

    let off = (window as isize - 1) / 2;
    let scale = 1.0 / window as f64;
    (0..len as isize)
        .map(|i| {
            let hi = (i + off).min(len as isize - 1);
            let lo = (i + off - window as isize + 1).max(0);
            if hi < lo {
                0.0
            } else {
                (prefix[hi as usize + 1] - prefix[lo as usize]) * scale
            }
        })
        .collect()
}

/// Unwrap a phase sequence by adding multiples of 2π wherever consecutive
/// values jump by more than π.
pub fn unwrap_phase(phase: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(phase.len());
    let Some(&first) = phase.first() else {
        return out;
    };
    out.push(first);

    let mut correction = 0.0;
    for pair in phase.windows(2) {
        let d = pair[1] - pair[0];
        let mut wrapped = (d + PI).rem_euclid(2.0 * PI) - PI;
        if wrapped == -PI && d > 0.0 {
            wrapped = PI;
        }
        if d.abs() >= PI {
            correction += wrapped - d;
        }
        out.push(pair[1] + correction);
    }
    out
}
