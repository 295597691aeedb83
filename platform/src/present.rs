use tracing::{debug, info, trace};
use crate::{
    error::Error,
    graphics::PixelBuffer,
    host::{Pump, WindowHost},
};

/// Animation offsets fed to the pattern generator, one step per frame.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameOffsets {
    pub x: u32,
    pub y: u32,
}

impl FrameOffsets {
    pub fn advance(&mut self) {
        self.x = self.x.wrapping_add(1);
        self.y = self.y.wrapping_add(2);
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub frames: u64,
}

/// Runs frames until the window closes or a quit notification arrives.
///
/// Every frame drains the notification queue, renders into the backbuffer
/// and presents it over the current client area. A frame during which the
/// application stopped is neither rendered nor presented.
pub fn run<H, R>(host: &H, mut render: R) -> Result<LoopStats, Error>
where
    H: WindowHost,
    R: FnMut(&mut PixelBuffer, FrameOffsets),
{
    host.state().borrow_mut().start();

    let mut offsets = FrameOffsets::default();
    let mut stats = LoopStats::default();
    while host.state().borrow().is_running() {
        if host.pump_messages() == Pump::Quit {
            debug!("quit notification received");
            host.state().borrow_mut().close();
        }
        if let Some(failure) = host.state().borrow_mut().take_failure() {
            return Err(failure);
        }
        if !host.state().borrow().is_running() {
            break;
        }

        render(host.state().borrow_mut().backbuffer_mut(), offsets);

        let dimension = host.window_dimension()?;
        {
            let state = host.state().borrow();
            host.present(state.backbuffer(), dimension)?;
        }
        trace!(frame = stats.frames, ?offsets, ?dimension, "frame presented");

        stats.frames += 1;
        offsets.advance();
    }

    info!(frames = stats.frames, "present loop finished");
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::RefCell, collections::VecDeque};
    use crate::{
        app::{AppState, Lifecycle, Notification},
        config::{Config, ResizePolicy},
        host::WindowDimension,
    };

    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    enum Message {
        Notify(Notification),
        Quit,
    }

    #[derive(Clone, Debug, PartialEq, Eq)]
    enum Call {
        Dispatched(Notification),
        Quit,
        Present { buffer: (i32, i32), target: WindowDimension },
    }

    /// Hands out one scripted batch of messages per pump; closes the window when the script runs out.
    struct ScriptedHost {
        state: RefCell<AppState>,
        script: RefCell<VecDeque<Vec<Message>>>,
        calls: RefCell<Vec<Call>>,
        dimension: WindowDimension,
    }

    impl ScriptedHost {
        fn new(policy: ResizePolicy, script: Vec<Vec<Message>>) -> Self {
            let config = Config {
                width: 8,
                height: 4,
                resize_policy: policy,
                ..Config::default()
            };
            let mut state = AppState::new(&config).unwrap();
            state.on_created();
            Self {
                state: RefCell::new(state),
                script: RefCell::new(script.into()),
                calls: RefCell::new(Vec::new()),
                dimension: WindowDimension { width: 640, height: 360 },
            }
        }

        fn presents(&self) -> usize {
            self.calls.borrow().iter()
                .filter(|call| matches!(call, Call::Present { .. }))
                .count()
        }
    }

    impl WindowHost for ScriptedHost {
        fn state(&self) -> &RefCell<AppState> {
            &self.state
        }

        fn pump_messages(&self) -> Pump {
            let batch = self.script.borrow_mut().pop_front()
                .unwrap_or_else(|| vec![Message::Notify(Notification::Close)]);

            let mut pump = Pump::Drained;
            for message in batch {
                match message {
                    Message::Notify(notification) => {
                        self.calls.borrow_mut().push(Call::Dispatched(notification));
                        self.state.borrow_mut().handle(notification);
                    }
                    Message::Quit => {
                        self.calls.borrow_mut().push(Call::Quit);
                        pump = Pump::Quit;
                    }
                }
            }
            pump
        }

        fn window_dimension(&self) -> Result<WindowDimension, Error> {
            Ok(self.dimension)
        }

        fn present(&self, buffer: &PixelBuffer, target: WindowDimension) -> Result<(), Error> {
            self.calls.borrow_mut().push(Call::Present { buffer: buffer.dim(), target });
            Ok(())
        }
    }

    #[test]
    fn offsets_advance_and_wrap() {
        let mut offsets = FrameOffsets { x: u32::MAX, y: u32::MAX - 1 };
        offsets.advance();
        assert_eq!(offsets, FrameOffsets { x: 0, y: 0 });
    }

    #[test]
    fn quit_mid_drain_stops_before_presenting() {
        let host = ScriptedHost::new(ResizePolicy::Keep, vec![
            vec![],
            vec![],
            vec![
                Message::Notify(Notification::Other),
                Message::Quit,
                Message::Notify(Notification::Other),
            ],
        ]);

        let stats = run(&host, |_, _| {}).unwrap();

        assert_eq!(stats.frames, 2);
        assert_eq!(host.presents(), 2);
        let calls = host.calls.borrow();
        let quit_at = calls.iter().position(|call| *call == Call::Quit).unwrap();
        assert!(!calls[quit_at..].iter().any(|call| matches!(call, Call::Present { .. })));
        // the rest of the queue is still drained
        assert_eq!(calls.last(), Some(&Call::Dispatched(Notification::Other)));
        assert_eq!(host.state.borrow().lifecycle(), Lifecycle::Closed);
    }

    #[test]
    fn close_notification_ends_the_loop() {
        let host = ScriptedHost::new(ResizePolicy::Keep, vec![
            vec![],
            vec![Message::Notify(Notification::Close)],
            vec![],
        ]);

        let stats = run(&host, |_, _| {}).unwrap();

        assert_eq!(stats.frames, 1);
        assert_eq!(host.presents(), 1);
        // the remaining batch is never pumped
        assert_eq!(host.script.borrow().len(), 1);
    }

    #[test]
    fn renders_with_evolving_offsets_then_presents_full_buffer() {
        let host = ScriptedHost::new(ResizePolicy::Keep, vec![vec![], vec![], vec![]]);
        let mut seen = Vec::new();

        run(&host, |buffer, offsets| {
            assert_eq!(buffer.dim(), (8, 4));
            seen.push((offsets.x, offsets.y));
        }).unwrap();

        assert_eq!(seen, vec![(0, 0), (1, 2), (2, 4)]);
        assert!(host.calls.borrow().iter()
            .filter_map(|call| match call {
                Call::Present { buffer, target } => Some((*buffer, *target)),
                _ => None,
            })
            .all(|present| present == ((8, 4), host.dimension)));
    }

    #[test]
    fn rendered_pixels_reach_present() {
        let host = ScriptedHost::new(ResizePolicy::Keep, vec![vec![]]);

        run(&host, |buffer, _| {
            for row in buffer.rows_mut() {
                for pixel in row.chunks_exact_mut(4) {
                    pixel.copy_from_slice(&0x00FF_0000u32.to_le_bytes());
                }
            }
        }).unwrap();

        assert_eq!(host.state.borrow().backbuffer().pixel(7, 3), Some(0x00FF_0000));
    }

    #[test]
    fn reallocation_failure_is_surfaced() {
        let host = ScriptedHost::new(ResizePolicy::Reallocate, vec![
            vec![],
            vec![Message::Notify(Notification::Resize { width: i32::MAX, height: i32::MAX })],
        ]);

        let result = run(&host, |_, _| {});

        assert!(matches!(result, Err(Error::Allocation { .. })));
        assert_eq!(host.presents(), 1);
    }

    #[test]
    fn closed_state_is_not_restarted() {
        let host = ScriptedHost::new(ResizePolicy::Keep, vec![]);
        host.state.borrow_mut().close();

        let stats = run(&host, |_, _| panic!("rendered a closed window")).unwrap();

        assert_eq!(stats.frames, 0);
        assert!(host.calls.borrow().is_empty());
        assert_eq!(host.state.borrow().lifecycle(), Lifecycle::Closed);
    }
}
