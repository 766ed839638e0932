use crate::Message;
use ecgcore::render::{
    CanvasSize, LiveRenderer, Point2, Rgb, StoredWaveformRenderer, StrokeStyle, Surface, TextStyle,
};
use iced::{
    mouse,
    widget::canvas::{self, Cache, Frame, Geometry, LineCap, LineJoin, Path, Stroke},
    Color, Point, Rectangle, Renderer, Theme,
};

const LIVE_BACKGROUND: Color = Color::from_rgb(0.05, 0.05, 0.05);
const PAPER_BACKGROUND: Color = Color::WHITE;

fn color(rgb: Rgb) -> Color {
    Color::from_rgb(rgb.r, rgb.g, rgb.b)
}

/// Drawing surface over an iced canvas frame.
struct FrameSurface<'a> {
    frame: &'a mut Frame,
    size: CanvasSize,
    background: Color,
}

impl<'a> FrameSurface<'a> {
    fn new(frame: &'a mut Frame, background: Color) -> Self {
        let bounds = frame.size();
        Self {
            frame,
            size: CanvasSize::new(bounds.width, bounds.height),
            background,
        }
    }
}

impl Surface for FrameSurface<'_> {
    fn size(&self) -> CanvasSize {
        self.size
    }

    fn clear(&mut self) {
        let bounds = self.frame.size();
        self.frame
            .fill_rectangle(Point::ORIGIN, bounds, self.background);
    }

    fn stroke_polyline(&mut self, points: &[Point2], style: StrokeStyle) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        let path = Path::new(|builder| {
            builder.move_to(Point::new(first.x, first.y));
            for point in rest {
                builder.line_to(Point::new(point.x, point.y));
            }
        });
        let (cap, join) = if style.rounded {
            (LineCap::Round, LineJoin::Round)
        } else {
            (LineCap::Butt, LineJoin::Miter)
        };
        self.frame.stroke(
            &path,
            Stroke::default()
                .with_width(style.width)
                .with_color(color(style.color))
                .with_line_cap(cap)
                .with_line_join(join),
        );
    }

    fn fill_text_centered(&mut self, text: &str, at: Point2, style: TextStyle) {
        // frame text is anchored top-left; offset by an estimated glyph box
        let estimated_width = text.chars().count() as f32 * style.size * 0.5;
        self.frame.fill_text(canvas::Text {
            content: text.to_string(),
            position: Point::new(at.x - estimated_width / 2.0, at.y - style.size / 2.0),
            color: color(style.color),
            size: style.size.into(),
            ..canvas::Text::default()
        });
    }
}

/// Live auto-scaling trace; redrawn on every frame the renderer changes.
pub struct LiveTrace<'a> {
    pub renderer: &'a LiveRenderer,
}

impl canvas::Program<Message> for LiveTrace<'_> {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        self.renderer
            .render(&mut FrameSurface::new(&mut frame, LIVE_BACKGROUND));
        vec![frame.into_geometry()]
    }
}

/// Stored waveform on grid paper. The cache is rebuilt when the canvas is
/// resized or cleared for a new reading.
pub struct StoredTrace<'a> {
    pub renderer: &'a StoredWaveformRenderer,
    pub cache: &'a Cache,
}

impl canvas::Program<Message> for StoredTrace<'_> {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let geometry = self.cache.draw(renderer, bounds.size(), |frame| {
            self.renderer
                .render(&mut FrameSurface::new(frame, PAPER_BACKGROUND));
        });
        vec![geometry]
    }
}
