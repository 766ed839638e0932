/// Canvas dimensions in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasSize {
    pub width: f32,
    pub height: f32,
}

impl CanvasSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub color: Rgb,
    pub width: f32,
    pub rounded: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub color: Rgb,
    pub size: f32,
}

pub const TRACE_RED: Rgb = Rgb::new(0.91, 0.30, 0.24);
pub const PLAYBACK_RED: Rgb = Rgb::new(0.94, 0.27, 0.27);
pub const MUTED_GRAY: Rgb = Rgb::new(0.60, 0.60, 0.60);
pub const NOTE_GRAY: Rgb = Rgb::new(0.42, 0.45, 0.50);
pub const GRID_MINOR: Rgb = Rgb::new(0.90, 0.91, 0.92);
pub const GRID_MAJOR: Rgb = Rgb::new(0.80, 0.84, 0.96);

/// 2D drawing target. Coordinates are logical pixels with the origin top-left;
/// the backend rasterizes at the display's pixel ratio.
pub trait Surface {
    fn size(&self) -> CanvasSize;
    fn clear(&mut self);
    fn stroke_polyline(&mut self, points: &[Point2], style: StrokeStyle);
    fn fill_text_centered(&mut self, text: &str, at: Point2, style: TextStyle);
}
