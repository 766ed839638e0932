pub mod live;
pub mod stored;
pub mod surface;

pub use live::{LiveRenderer, WAITING_MESSAGE};
pub use stored::{StoredWaveformRenderer, NO_DATA_MESSAGE};
pub use surface::{CanvasSize, Point2, Rgb, StrokeStyle, Surface, TextStyle};
