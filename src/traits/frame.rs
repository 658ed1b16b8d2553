/// "Run me before the next repaint" primitive.
///
/// The host answers every request by calling `Wirecam::frame` (or
/// `PositionTracker::pump` when no engine is attached) on its next tick.
pub trait FrameScheduler {
    fn request_frame(&self);
}
