use image::RgbaImage;
use vello_cpu::{
    kurbo::{Affine, BezPath, Cap, Join, Point, Rect, Stroke},
    peniko::Color,
    Pixmap, RenderContext,
};

use crate::{config::AnimationConfig, surface::DrawingSurface, Result, StepGifError};

/// CPU implementation of [`DrawingSurface`] backed by `vello_cpu`.
///
/// Path points are mapped to device space when they are added, so later
/// transform changes do not affect an open path. Strokes use round caps and
/// joins. Drawing is deferred until [`RasterSurface::finish_frame`].
pub struct RasterSurface {
    width: u16,
    height: u16,
    ctx: RenderContext,
    pixmap: Pixmap,
    image: RgbaImage,
    background: Color,
    stroke_color: Color,
    line_width: f64,
    transform: Affine,
    saved: Vec<Affine>,
    path: BezPath,
    current: Option<Point>,
}

impl RasterSurface {
    pub fn new(
        width: u32,
        height: u32,
        background: [u8; 4],
        stroke_color: [u8; 4],
        line_width: f64,
    ) -> Result<Self> {
        let to_u16 = |value: u32, what: &str| {
            u16::try_from(value)
                .map_err(|_| StepGifError::invalid_config(format!("surface {what} exceeds u16")))
        };
        let (w, h) = (to_u16(width, "width")?, to_u16(height, "height")?);
        let [br, bg, bb, ba] = background;
        let [sr, sg, sb, sa] = stroke_color;

        let mut surface = Self {
            width: w,
            height: h,
            ctx: RenderContext::new(w, h),
            pixmap: Pixmap::new(w, h),
            image: RgbaImage::new(width, height),
            background: Color::from_rgba8(br, bg, bb, ba),
            stroke_color: Color::from_rgba8(sr, sg, sb, sa),
            line_width,
            transform: Affine::IDENTITY,
            saved: Vec::new(),
            path: BezPath::new(),
            current: None,
        };
        surface.clear();
        Ok(surface)
    }

    pub fn from_config(config: &AnimationConfig) -> Result<Self> {
        Self::new(
            config.width,
            config.height,
            config.style.background,
            config.style.stroke,
            config.line_width(),
        )
    }

    /// Starts a new frame: background fill, identity transform, empty path.
    pub fn clear(&mut self) {
        self.ctx = RenderContext::new(self.width, self.height);
        self.ctx.set_transform(Affine::IDENTITY);
        self.ctx.set_paint(self.background);
        self.ctx.fill_rect(&Rect::new(
            0.0,
            0.0,
            f64::from(self.width),
            f64::from(self.height),
        ));
        self.transform = Affine::IDENTITY;
        self.saved.clear();
        self.path = BezPath::new();
        self.current = None;
    }

    /// Rasterizes everything drawn since [`RasterSurface::clear`] and returns
    /// the frame with straight alpha.
    pub fn finish_frame(&mut self) -> &RgbaImage {
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut self.pixmap);
        let premul = self.pixmap.data_as_u8_slice();
        for (dst, src) in self.image.chunks_exact_mut(4).zip(premul.chunks_exact(4)) {
            dst.copy_from_slice(&unpremultiply([src[0], src[1], src[2], src[3]]));
        }
        &self.image
    }
}

impl DrawingSurface for RasterSurface {
    fn save(&mut self) {
        self.saved.push(self.transform);
    }

    fn restore(&mut self) {
        if let Some(transform) = self.saved.pop() {
            self.transform = transform;
        }
    }

    fn translate(&mut self, x: f64, y: f64) {
        self.transform = self.transform * Affine::translate((x, y));
    }

    fn rotate(&mut self, radians: f64) {
        self.transform = self.transform * Affine::rotate(radians);
    }

    fn begin_path(&mut self) {
        self.path = BezPath::new();
        self.current = None;
    }

    fn move_to(&mut self, x: f64, y: f64) {
        let point = self.transform * Point::new(x, y);
        self.path.move_to(point);
        self.current = Some(point);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        let point = self.transform * Point::new(x, y);
        if self.current.is_none() {
            self.path.move_to(point);
        } else {
            self.path.line_to(point);
        }
        self.current = Some(point);
    }

    fn stroke(&mut self) {
        // A path of bare move_to points has nothing to stroke.
        if self.path.segments().next().is_none() {
            return;
        }
        self.ctx.set_transform(Affine::IDENTITY);
        self.ctx.set_paint(self.stroke_color);
        self.ctx.set_stroke(
            Stroke::new(self.line_width)
                .with_caps(Cap::Round)
                .with_join(Join::Round),
        );
        self.ctx.stroke_path(&self.path);
    }
}

impl std::fmt::Debug for RasterSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterSurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("line_width", &self.line_width)
            .field("saved", &self.saved.len())
            .finish()
    }
}

fn unpremultiply([r, g, b, a]: [u8; 4]) -> [u8; 4] {
    if a == 0 {
        return [0, 0, 0, 0];
    }
    let un = |c: u8| ((u16::from(c) * 255 + u16::from(a) / 2) / u16::from(a)).min(255) as u8;
    [un(r), un(g), un(b), a]
}

#[cfg(test)]
mod tests {
    use super::*;

    const BG: [u8; 4] = [255, 255, 255, 255];
    const INK: [u8; 4] = [0, 0, 0, 255];

    fn surface() -> RasterSurface {
        RasterSurface::new(40, 40, BG, INK, 2.0).unwrap()
    }

    fn inked(canvas: &mut RasterSurface, x: u32, y: u32) -> bool {
        let pixel = canvas.finish_frame().get_pixel(x, y).0;
        pixel[0] < 64 && pixel[3] == 255
    }

    fn blank(canvas: &mut RasterSurface) -> bool {
        canvas.finish_frame().pixels().all(|p| p.0 == BG)
    }

    #[test]
    fn stroke_paints_along_the_segment() {
        let mut canvas = surface();
        canvas.begin_path();
        canvas.move_to(5.0, 20.0);
        canvas.line_to(35.0, 20.0);
        canvas.stroke();

        assert!(inked(&mut canvas, 20, 19));
        assert_eq!(canvas.finish_frame().get_pixel(20, 5).0, BG);
    }

    #[test]
    fn transforms_apply_and_restore() {
        let mut canvas = surface();
        canvas.save();
        canvas.translate(20.0, 20.0);
        canvas.rotate(std::f64::consts::FRAC_PI_2);
        canvas.begin_path();
        canvas.move_to(0.0, 0.0);
        canvas.line_to(10.0, 0.0);
        canvas.stroke();
        canvas.restore();

        // +x rotated a quarter turn points down the screen.
        assert!(inked(&mut canvas, 20, 27));
        assert_eq!(canvas.finish_frame().get_pixel(27, 20).0, BG);

        canvas.begin_path();
        canvas.move_to(0.0, 2.0);
        canvas.line_to(3.0, 2.0);
        canvas.stroke();
        assert!(inked(&mut canvas, 1, 1));
    }

    #[test]
    fn lone_move_to_draws_nothing() {
        let mut canvas = surface();
        canvas.begin_path();
        canvas.move_to(20.0, 20.0);
        canvas.stroke();
        assert!(blank(&mut canvas));
    }

    #[test]
    fn segments_outside_the_canvas_are_ignored() {
        let mut canvas = surface();
        canvas.begin_path();
        canvas.move_to(-50.0, -50.0);
        canvas.line_to(-45.0, -50.0);
        canvas.stroke();
        assert!(blank(&mut canvas));
    }

    #[test]
    fn clear_resets_pixels_and_state() {
        let mut canvas = surface();
        canvas.translate(100.0, 0.0);
        canvas.save();
        canvas.begin_path();
        canvas.move_to(-95.0, 10.0);
        canvas.line_to(-65.0, 10.0);
        canvas.stroke();
        assert!(inked(&mut canvas, 20, 10));

        canvas.clear();
        assert!(blank(&mut canvas));
        canvas.begin_path();
        canvas.move_to(5.0, 30.0);
        canvas.line_to(35.0, 30.0);
        canvas.stroke();
        assert!(inked(&mut canvas, 20, 29));
    }

    #[test]
    fn rejects_dimensions_beyond_u16() {
        let err = RasterSurface::new(70_000, 2, BG, INK, 1.0).unwrap_err();
        assert!(matches!(err, StepGifError::InvalidConfig(_)));
    }

    #[test]
    fn unpremultiply_restores_straight_alpha() {
        assert_eq!(unpremultiply([0, 0, 0, 0]), [0, 0, 0, 0]);
        assert_eq!(unpremultiply([10, 20, 30, 255]), [10, 20, 30, 255]);
        assert_eq!(unpremultiply([64, 0, 128, 128]), [128, 0, 255, 128]);
    }
}
