pub mod normalize;
pub mod window;

pub use normalize::{normalize_samples, normalize_value};
pub use window::{WaveformPoint, WaveformWindow};
