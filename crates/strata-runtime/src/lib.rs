//! Frame pacing harness and rolling performance meters.
#![forbid(unsafe_code)]

use std::collections::VecDeque;
use std::time::Instant;

use thiserror::Error;

pub const TICKS_PER_SECOND: u32 = 60;
/// Cap on fixed updates drained per frame; the backlog past it is dropped.
pub const TICKS_PER_FRAME: u32 = 4;
/// Suggested host pump interval in milliseconds.
pub const TICK_RESOLUTION: u32 = 4;

const PERF_WINDOW: usize = 60;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine callback failed: {0}")]
    Callback(String),
}

pub type HookResult = Result<(), EngineError>;
/// Engine callback; receives elapsed milliseconds.
pub type Hook = Box<dyn FnMut(f64) -> HookResult>;

/// Rolling average over the last `PERF_WINDOW` samples.
pub struct PerfMeter {
    samples: VecDeque<f64>,
    sum: f64,
}

impl PerfMeter {
    pub fn new() -> Self {
        Self {
            samples: VecDeque::with_capacity(PERF_WINDOW),
            sum: 0.0,
        }
    }

    pub fn record(&mut self, sample_ms: f64) {
        self.samples.push_back(sample_ms);
        self.sum += sample_ms;
        if self.samples.len() > PERF_WINDOW {
            if let Some(old) = self.samples.pop_front() {
                self.sum -= old;
            }
        }
    }

    pub fn average_ms(&self) -> f64 {
        if self.samples.is_empty() {
            0.0
        } else {
            self.sum / self.samples.len() as f64
        }
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.samples.len()
    }
}

impl Default for PerfMeter {
    fn default() -> Self {
        Self::new()
    }
}

/// Host-clocked frame harness: per frame, `remesh` and `render` run once,
/// then fixed-grid `update` ticks are drained (at most `TICKS_PER_FRAME`;
/// any remaining backlog is discarded by snapping the update clock
/// forward). Running updates after the render keeps chunks admitted by a
/// recenter out of the same frame's remesh.
///
/// An error escaping any callback permanently silences all three; the
/// engine stops in place and the error is retained.
pub struct Timing {
    remesh: Hook,
    render: Hook,
    update: Hook,
    remesh_meter: PerfMeter,
    render_meter: PerfMeter,
    update_meter: PerfMeter,
    last_render: f64,
    last_update: f64,
    started: bool,
    error: Option<EngineError>,
}

impl Timing {
    pub fn new(remesh: Hook, render: Hook, update: Hook) -> Self {
        Self {
            remesh,
            render,
            update,
            remesh_meter: PerfMeter::new(),
            render_meter: PerfMeter::new(),
            update_meter: PerfMeter::new(),
            last_render: 0.0,
            last_update: 0.0,
            started: false,
            error: None,
        }
    }

    /// Drive one animation frame at the host-supplied timestamp.
    pub fn frame(&mut self, now_ms: f64) {
        if self.error.is_some() {
            return;
        }
        if !self.started {
            self.started = true;
            self.last_render = now_ms;
            self.last_update = now_ms;
        }
        let dt = now_ms - self.last_render;
        self.last_render = now_ms;

        if let Err(e) = run_hook(&mut self.remesh, &mut self.remesh_meter, dt) {
            self.halt(e);
            return;
        }
        if let Err(e) = run_hook(&mut self.render, &mut self.render_meter, dt) {
            self.halt(e);
            return;
        }

        let tick = 1000.0 / f64::from(TICKS_PER_SECOND);
        let mut ticks = 0;
        while now_ms - self.last_update >= tick && ticks < TICKS_PER_FRAME {
            if let Err(e) = run_hook(&mut self.update, &mut self.update_meter, tick) {
                self.halt(e);
                return;
            }
            self.last_update += tick;
            ticks += 1;
        }
        if now_ms - self.last_update >= tick {
            self.last_update = now_ms;
        }
    }

    fn halt(&mut self, error: EngineError) {
        log::error!("engine halted: {}", error);
        self.error = Some(error);
    }

    #[inline]
    pub fn is_halted(&self) -> bool {
        self.error.is_some()
    }

    pub fn error(&self) -> Option<&EngineError> {
        self.error.as_ref()
    }

    pub fn remesh_meter(&self) -> &PerfMeter {
        &self.remesh_meter
    }

    pub fn render_meter(&self) -> &PerfMeter {
        &self.render_meter
    }

    pub fn update_meter(&self) -> &PerfMeter {
        &self.update_meter
    }
}

fn run_hook(hook: &mut Hook, meter: &mut PerfMeter, dt: f64) -> HookResult {
    let start = Instant::now();
    let result = hook(dt);
    meter.record(start.elapsed().as_secs_f64() * 1000.0);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Counters {
        remesh: Cell<u32>,
        render: Cell<u32>,
        update: Cell<u32>,
    }

    fn counting_timing(fail_update_at: Option<u32>) -> (Timing, Rc<Counters>) {
        let counters = Rc::new(Counters {
            remesh: Cell::new(0),
            render: Cell::new(0),
            update: Cell::new(0),
        });
        let (c1, c2, c3) = (counters.clone(), counters.clone(), counters.clone());
        let timing = Timing::new(
            Box::new(move |_| {
                c1.remesh.set(c1.remesh.get() + 1);
                Ok(())
            }),
            Box::new(move |_| {
                c2.render.set(c2.render.get() + 1);
                Ok(())
            }),
            Box::new(move |_| {
                let n = c3.update.get() + 1;
                c3.update.set(n);
                if fail_update_at == Some(n) {
                    return Err(EngineError::Callback("boom".into()));
                }
                Ok(())
            }),
        );
        (timing, counters)
    }

    #[test]
    fn updates_run_on_the_fixed_grid() {
        let (mut timing, counters) = counting_timing(None);
        timing.frame(0.0);
        assert_eq!(counters.update.get(), 0);
        assert_eq!(counters.remesh.get(), 1);
        assert_eq!(counters.render.get(), 1);

        // Two ticks fit into 33.4 ms at 60 ticks/s.
        timing.frame(33.4);
        assert_eq!(counters.update.get(), 2);
    }

    #[test]
    fn tick_cap_drops_the_backlog() {
        let (mut timing, counters) = counting_timing(None);
        timing.frame(0.0);
        // A one-second stall yields only TICKS_PER_FRAME updates...
        timing.frame(1000.0);
        assert_eq!(counters.update.get(), TICKS_PER_FRAME);
        // ...and the excess is discarded rather than replayed.
        timing.frame(1017.0);
        assert_eq!(counters.update.get(), TICKS_PER_FRAME + 1);
    }

    #[test]
    fn a_callback_error_silences_everything() {
        let (mut timing, counters) = counting_timing(Some(1));
        timing.frame(0.0);
        timing.frame(20.0);
        assert!(timing.is_halted());
        let after = (
            counters.remesh.get(),
            counters.render.get(),
            counters.update.get(),
        );
        timing.frame(40.0);
        timing.frame(60.0);
        assert_eq!(
            after,
            (
                counters.remesh.get(),
                counters.render.get(),
                counters.update.get()
            )
        );
        assert!(timing.error().is_some());
    }

    #[test]
    fn meter_averages_over_a_bounded_window() {
        let mut meter = PerfMeter::new();
        for _ in 0..100 {
            meter.record(2.0);
        }
        assert_eq!(meter.count(), 60);
        assert!((meter.average_ms() - 2.0).abs() < 1e-9);
        meter.record(62.0);
        // Window slides: one 62 among 59 twos.
        assert!((meter.average_ms() - 3.0).abs() < 1e-9);
    }
}
