/// Amplitude statistics shared by the renderers and the synthetic feed.
pub struct StatsHelper;

impl StatsHelper {
    pub fn rms(samples: &[f32]) -> f32 {
        if samples.is_empty() {
            return 0.0;
        }
        let sum_sq: f32 = samples.iter().map(|&v| v * v).sum();
        (sum_sq / samples.len() as f32).sqrt()
    }

    /// Smallest and largest value, or `None` for an empty slice.
    pub fn min_max<I>(values: I) -> Option<(f32, f32)>
    where
        I: IntoIterator<Item = f32>,
    {
        values.into_iter().fold(None, |acc, value| match acc {
            None => Some((value, value)),
            Some((min, max)) => Some((min.min(value), max.max(value))),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rms_zero_sequence_yields_zero() {
        assert_eq!(StatsHelper::rms(&[]), 0.0);
        assert_eq!(StatsHelper::rms(&[0.0, 0.0]), 0.0);
    }

    #[test]
    fn rms_handles_single_value() {
        assert_eq!(StatsHelper::rms(&[4.0]), 4.0);
    }

    #[test]
    fn min_max_spans_sequence() {
        assert_eq!(StatsHelper::min_max([3.0, -1.5, 2.0]), Some((-1.5, 3.0)));
        assert_eq!(StatsHelper::min_max([7.0]), Some((7.0, 7.0)));
        assert_eq!(StatsHelper::min_max(std::iter::empty()), None);
    }
}
