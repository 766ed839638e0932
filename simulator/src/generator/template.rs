use std::f32::consts::PI;

/// One wave of the beat: centre and width as fractions of the RR interval.
struct Wave {
    amplitude: f32,
    centre: f32,
    width: f32,
}

const BEAT: [Wave; 5] = [
    Wave { amplitude: 0.12, centre: 0.18, width: 0.025 }, // P
    Wave { amplitude: -0.10, centre: 0.275, width: 0.008 }, // Q
    Wave { amplitude: 1.00, centre: 0.30, width: 0.010 }, // R
    Wave { amplitude: -0.22, centre: 0.325, width: 0.009 }, // S
    Wave { amplitude: 0.30, centre: 0.55, width: 0.045 }, // T
];

/// Phase of the R wave within one beat.
pub const R_PHASE: f32 = 0.30;

/// Normalized PQRST amplitude at `phase` in `[0, 1)`; the R wave peaks at 1.0.
pub fn pqrst(phase: f32) -> f32 {
    BEAT.iter()
        .map(|wave| {
            let offset = (phase - wave.centre) / wave.width;
            wave.amplitude * (-0.5 * offset * offset).exp()
        })
        .sum()
}

/// Slow respiratory baseline drift.
pub fn baseline(seconds: f32, amplitude: f32) -> f32 {
    amplitude * (2.0 * PI * 0.25 * seconds).sin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn r_wave_dominates_the_beat() {
        let peak = pqrst(R_PHASE);
        assert!((peak - 1.0).abs() < 0.05);
        for step in 0..100 {
            let phase = step as f32 / 100.0;
            assert!(pqrst(phase) <= peak + 1e-6);
        }
    }

    #[test]
    fn isoelectric_between_beats() {
        assert!(pqrst(0.9).abs() < 1e-3);
        assert_eq!(baseline(0.0, 0.05), 0.0);
    }
}
