/// Canvas-style drawing capabilities the chain renders through.
///
/// Coordinates passed to `move_to`/`line_to` are in the current user space;
/// `translate` and `rotate` compose onto the current transform, and
/// `save`/`restore` push and pop it.
pub trait DrawingSurface {
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, x: f64, y: f64);
    /// Rotates the user space by `radians`, clockwise in screen space.
    fn rotate(&mut self, radians: f64);
    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn stroke(&mut self);
}
