use tracing::{debug, error, info, warn};
use crate::{
    config::{Config, ResizePolicy},
    error::Error,
    graphics::PixelBuffer,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Uninitialized,
    Created,
    Running,
    Closed,
}

/// Window notifications the application reacts to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Notification {
    Resize { width: i32, height: i32 },
    Close,
    Destroy,
    ActivateApp { active: bool },
    Paint,
    Other,
}

/// How the host should finish a notification after the state has seen it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Response {
    Handled,
    /// Present the backbuffer into the paint context.
    Paint,
    /// Hand the notification to the OS default handler.
    PassThrough,
}

/// Everything the message handler and the present loop share.
pub struct AppState {
    lifecycle: Lifecycle,
    backbuffer: PixelBuffer,
    resize_policy: ResizePolicy,
    failure: Option<Error>,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let backbuffer = PixelBuffer::with_dimensions(config.width, config.height)?;
        Ok(Self {
            lifecycle: Lifecycle::Uninitialized,
            backbuffer,
            resize_policy: config.resize_policy,
            failure: None,
        })
    }

    #[inline(always)] pub fn lifecycle(&self) -> Lifecycle { self.lifecycle }
    #[inline(always)] pub fn is_running(&self) -> bool { self.lifecycle == Lifecycle::Running }
    #[inline(always)] pub fn backbuffer(&self) -> &PixelBuffer { &self.backbuffer }
    #[inline(always)] pub fn backbuffer_mut(&mut self) -> &mut PixelBuffer { &mut self.backbuffer }

    pub fn on_created(&mut self) {
        self.transition(Lifecycle::Uninitialized, Lifecycle::Created);
    }

    pub fn start(&mut self) {
        self.transition(Lifecycle::Created, Lifecycle::Running);
    }

    /// Closed is terminal, nothing moves the state out of it.
    pub fn close(&mut self) {
        if self.lifecycle != Lifecycle::Closed {
            info!(from = ?self.lifecycle, "closing");
            self.lifecycle = Lifecycle::Closed;
        }
    }

    fn transition(&mut self, from: Lifecycle, to: Lifecycle) {
        if self.lifecycle == from {
            debug!(?from, ?to, "lifecycle transition");
            self.lifecycle = to;
        } else {
            warn!(current = ?self.lifecycle, ?from, ?to, "ignored lifecycle transition");
        }
    }

    /// Error that stopped the application from inside the message handler.
    pub fn take_failure(&mut self) -> Option<Error> {
        self.failure.take()
    }

    pub fn handle(&mut self, notification: Notification) -> Response {
        match notification {
            Notification::Resize { width, height } => {
                self.on_resize(width, height);
                Response::Handled
            }
            Notification::Close | Notification::Destroy => {
                debug!(?notification, "window is going away");
                self.close();
                Response::Handled
            }
            Notification::ActivateApp { active } => {
                debug!(active, "activation changed");
                Response::Handled
            }
            Notification::Paint => Response::Paint,
            Notification::Other => Response::PassThrough,
        }
    }

    fn on_resize(&mut self, width: i32, height: i32) {
        if !self.is_running() || self.resize_policy == ResizePolicy::Keep {
            debug!(width, height, "client area resized, backbuffer kept");
            return;
        }
        // minimized windows report an empty client area
        if width <= 0 || height <= 0 || self.backbuffer.dim() == (width, height) {
            return;
        }
        if let Err(e) = self.backbuffer.resize(width, height) {
            error!(error = %e, "backbuffer reallocation failed");
            self.failure = Some(e);
            self.close();
        }
    }
}
