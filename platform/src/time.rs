use std::mem::MaybeUninit;
use winapi::um::profileapi::{QueryPerformanceCounter, QueryPerformanceFrequency};

lazy_static::lazy_static! {
    static ref PERFORMANCE_FREQUENCY: i64 = unsafe {
        let mut pf = MaybeUninit::zeroed();
        QueryPerformanceFrequency(pf.as_mut_ptr());
        *pf.assume_init().QuadPart()
    };
}

/// Performance counter stopwatch.
pub struct Counter {
    start_ticks: i64,
}

impl Counter {
    pub fn start() -> Self {
        Self { start_ticks: Self::count() }
    }

    pub fn elapsed(&self) -> TicksElapsed {
        TicksElapsed(Self::count() - self.start_ticks)
    }

    fn count() -> i64 {
        unsafe {
            let mut performance_count = MaybeUninit::zeroed();
            QueryPerformanceCounter(performance_count.as_mut_ptr());
            *performance_count.assume_init().QuadPart()
        }
    }
}

#[derive(Copy, Clone)]
pub struct TicksElapsed(i64);

impl TicksElapsed {
    pub fn as_secs(self) -> f64 {
        self.0 as f64 / *PERFORMANCE_FREQUENCY as f64
    }

    pub fn as_ms(self) -> f64 {
        self.as_secs() * 1000.0
    }
}
