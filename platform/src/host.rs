use std::cell::RefCell;
use crate::{app::AppState, error::Error, graphics::PixelBuffer};

/// Client area of a live window.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct WindowDimension {
    pub width: i32,
    pub height: i32,
}

impl WindowDimension {
    pub fn is_empty(self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

/// Outcome of draining the notification queue.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Pump {
    Drained,
    /// A quit notification was seen during the drain.
    Quit,
}

/// A window the present loop can drive.
///
/// The host dispatches OS notifications into [`AppState::handle`] while
/// draining, so the state sits behind a `RefCell` shared with the handler.
pub trait WindowHost {
    fn state(&self) -> &RefCell<AppState>;

    /// Dispatches every pending notification without blocking.
    fn pump_messages(&self) -> Pump;

    /// Queries the current client area.
    fn window_dimension(&self) -> Result<WindowDimension, Error>;

    /// Stretches the whole of `buffer` over `target`, starting at the window origin.
    fn present(&self, buffer: &PixelBuffer, target: WindowDimension) -> Result<(), Error>;
}
