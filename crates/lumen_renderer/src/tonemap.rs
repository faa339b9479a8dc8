//! Tone reproduction.
//!
//! Optional post-process over a whole image: radiance is scaled to world
//! luminance (`l_max`), compressed by a global operator and mapped back to
//! the display range (`ld_max`). The operators depend on image statistics,
//! so applying one twice does not give the same result as applying it once.

use lumen_core::ToneParams;
use lumen_math::Color;
use rayon::prelude::*;

/// Offset inside the log so black pixels do not send the average to zero.
const LOG_DELTA: f64 = 1e-5;

/// Reinhard's middle-grey key value.
const REINHARD_KEY: f32 = 0.18;

/// Global tone operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToneOperator {
    /// Ward's contrast-based scale factor
    #[default]
    Ward,
    /// Reinhard's photographic operator. With `key_pixel` the key is the
    /// luminance of that pixel instead of the log-average.
    Reinhard { key_pixel: Option<usize> },
}

/// Log-average luminance: `exp(mean(ln(delta + L)))`.
pub fn log_average_luminance(colors: &[Color]) -> f32 {
    if colors.is_empty() {
        return 0.0;
    }
    let log_sum: f64 = colors
        .par_iter()
        .map(|c| (LOG_DELTA + c.luminance() as f64).ln())
        .sum();
    (log_sum / colors.len() as f64).exp() as f32
}

/// Tone-map `colors` in place.
pub fn apply_tone(colors: &mut [Color], params: &ToneParams, operator: ToneOperator) {
    if colors.is_empty() {
        return;
    }

    colors
        .par_iter_mut()
        .for_each(|c| *c = c.scale(params.l_max, false));

    let log_avg = log_average_luminance(colors);
    log::debug!("Tone mapping {} pixels, log-average luminance {log_avg}", colors.len());

    match operator {
        ToneOperator::Ward => {
            let sf = ward_scale_factor(params.ld_max, log_avg);
            colors.par_iter_mut().for_each(|c| *c = c.scale(sf, false));
        }
        ToneOperator::Reinhard { key_pixel } => {
            let key = key_pixel
                .and_then(|i| colors.get(i))
                .map(|c| c.luminance())
                .filter(|&l| l > 0.0)
                .unwrap_or(log_avg);
            let scale = REINHARD_KEY / key;
            let ld_max = params.ld_max;

            colors.par_iter_mut().for_each(|c| {
                let s = c.scale(scale, false);
                let compress = |v: f32| v * ld_max / (1.0 + v);
                *c = Color::new(compress(s.r), compress(s.g), compress(s.b));
            });
        }
    }

    let inv_ld_max = 1.0 / params.ld_max;
    colors
        .par_iter_mut()
        .for_each(|c| *c = c.scale(inv_ld_max, true));
}

fn ward_scale_factor(ld_max: f32, log_avg: f32) -> f32 {
    ((1.219 + (ld_max / 2.0).powf(0.4)) / (1.219 + log_avg.powf(0.4))).powf(2.5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_average_of_uniform_image() {
        let colors = vec![Color::splat(0.5); 10];
        assert!((log_average_luminance(&colors) - 0.5).abs() < 1e-4);
        assert_eq!(log_average_luminance(&[]), 0.0);
    }

    #[test]
    fn test_ward_uniform_grey() {
        let mut colors = vec![Color::splat(0.2); 4];
        apply_tone(&mut colors, &ToneParams::default(), ToneOperator::Ward);

        // 200 cd/m² world luminance, ld_max 100
        for c in &colors {
            assert!((c.r - 0.627).abs() < 2e-3, "got {}", c.r);
            assert_eq!(c.r, c.g);
        }
    }

    #[test]
    fn test_ward_is_not_idempotent() {
        let params = ToneParams::default();
        let mut once = vec![Color::splat(0.2); 4];
        apply_tone(&mut once, &params, ToneOperator::Ward);

        let mut twice = once.clone();
        apply_tone(&mut twice, &params, ToneOperator::Ward);

        assert!((once[0].r - twice[0].r).abs() > 0.05);
    }

    #[test]
    fn test_reinhard_is_not_idempotent() {
        let params = ToneParams::default();
        let operator = ToneOperator::Reinhard { key_pixel: None };
        let mut once = vec![Color::splat(0.1), Color::splat(0.5)];
        apply_tone(&mut once, &params, operator);

        let mut twice = once.clone();
        apply_tone(&mut twice, &params, operator);

        let changed = once
            .iter()
            .zip(&twice)
            .any(|(a, b)| (a.r - b.r).abs() > 1e-3);
        assert!(changed);
    }

    #[test]
    fn test_reinhard_key_pixel() {
        let params = ToneParams::default();
        let mut colors = vec![Color::splat(0.1), Color::splat(0.5)];
        apply_tone(&mut colors, &params, ToneOperator::Reinhard { key_pixel: Some(1) });

        // The key pixel lands on middle grey before compression
        let expected = REINHARD_KEY / (1.0 + REINHARD_KEY);
        assert!((colors[1].r - expected).abs() < 1e-4);
        assert!(colors[0].r < colors[1].r);
    }

    #[test]
    fn test_output_is_clamped() {
        let params = ToneParams {
            ld_max: 1.0,
            l_max: 1000.0,
        };
        let mut colors = vec![Color::splat(0.001), Color::WHITE];
        apply_tone(&mut colors, &params, ToneOperator::Ward);
        assert!(colors.iter().all(|c| c.r <= 1.0 && c.g <= 1.0 && c.b <= 1.0));
    }
}
