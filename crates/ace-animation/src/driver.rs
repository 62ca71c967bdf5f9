use crate::curve::AnimationOption;

/// Receives the eased fraction of a running animation.
pub type FrameFn<C> = Box<dyn FnMut(&mut C, f32) + 'static>;
/// Runs once when an animation reaches its end. Stopped animations never run it.
pub type FinishFn<C> = Box<dyn FnOnce(&mut C) + 'static>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AnimationHandle(u64);

struct RunningAnimation<C> {
    handle: AnimationHandle,
    name: String,
    option: AnimationOption,
    start_millis: u64,
    on_frame: FrameFn<C>,
    on_finish: Option<FinishFn<C>>,
}

/// Time-driven animations over a context `C`.
///
/// The driver lives inside `C`; [`pump_animations`] takes the running set
/// out, feeds every animation its fraction, then merges back whatever is
/// still running so callbacks may start or stop animations freely.
pub struct AnimationDriver<C> {
    running: Vec<RunningAnimation<C>>,
    next_id: u64,
    now_millis: u64,
    in_flight: Vec<AnimationHandle>,
    stopped_while_pumping: Vec<AnimationHandle>,
}

impl<C> Default for AnimationDriver<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> AnimationDriver<C> {
    pub fn new() -> Self {
        Self {
            running: Vec::new(),
            next_id: 1,
            now_millis: 0,
            in_flight: Vec::new(),
            stopped_while_pumping: Vec::new(),
        }
    }

    pub fn now_millis(&self) -> u64 {
        self.now_millis
    }

    pub fn start(
        &mut self,
        name: &str,
        option: AnimationOption,
        on_frame: FrameFn<C>,
        on_finish: Option<FinishFn<C>>,
    ) -> AnimationHandle {
        let handle = AnimationHandle(self.next_id);
        self.next_id += 1;
        log::trace!("animation {name} started, {}ms", option.duration_millis);
        self.running.push(RunningAnimation {
            handle,
            name: name.to_owned(),
            option,
            start_millis: self.now_millis,
            on_frame,
            on_finish,
        });
        handle
    }

    /// Cancels the animation without running its finish callback.
    pub fn stop(&mut self, handle: AnimationHandle) -> bool {
        if let Some(index) = self.running.iter().position(|a| a.handle == handle) {
            let animation = self.running.remove(index);
            log::trace!("animation {} stopped", animation.name);
            return true;
        }
        if self.in_flight.contains(&handle) && !self.stopped_while_pumping.contains(&handle) {
            self.stopped_while_pumping.push(handle);
            return true;
        }
        false
    }

    pub fn is_running(&self, handle: AnimationHandle) -> bool {
        self.running.iter().any(|a| a.handle == handle)
            || (self.in_flight.contains(&handle) && !self.stopped_while_pumping.contains(&handle))
    }

    pub fn has_running(&self) -> bool {
        !self.running.is_empty()
    }

    pub fn running_count(&self) -> usize {
        self.running.len()
    }
}

/// Advances every animation to `now_millis`. Returns how many finished.
pub fn pump_animations<C>(
    ctx: &mut C,
    driver: fn(&mut C) -> &mut AnimationDriver<C>,
    now_millis: u64,
) -> usize {
    let batch = {
        let d = driver(ctx);
        d.now_millis = d.now_millis.max(now_millis);
        d.in_flight = d.running.iter().map(|a| a.handle).collect();
        std::mem::take(&mut d.running)
    };
    let now = driver(ctx).now_millis;

    let mut still_running = Vec::with_capacity(batch.len());
    let mut finished = Vec::new();
    for mut animation in batch {
        if driver(ctx).stopped_while_pumping.contains(&animation.handle) {
            continue;
        }
        let elapsed = now.saturating_sub(animation.start_millis);
        if elapsed < animation.option.delay_millis {
            still_running.push(animation);
            continue;
        }
        let active = elapsed - animation.option.delay_millis;
        let fraction = if animation.option.duration_millis == 0 {
            1.0
        } else {
            (active as f32 / animation.option.duration_millis as f32).min(1.0)
        };
        (animation.on_frame)(ctx, animation.option.curve.transform(fraction));
        if fraction >= 1.0 {
            finished.push(animation);
        } else {
            still_running.push(animation);
        }
    }

    let d = driver(ctx);
    let stopped = std::mem::take(&mut d.stopped_while_pumping);
    d.in_flight.clear();
    still_running.retain(|a| !stopped.contains(&a.handle));
    finished.retain(|a| !stopped.contains(&a.handle));
    still_running.append(&mut d.running);
    d.running = still_running;

    let count = finished.len();
    for animation in finished {
        log::trace!("animation {} finished", animation.name);
        if let Some(on_finish) = animation.on_finish {
            on_finish(ctx);
        }
    }
    count
}

/// Jumps every running animation to its end, running finish callbacks.
/// Animations started by finish callbacks are finished too, up to a bounded
/// number of rounds.
pub fn finish_all_animations<C>(ctx: &mut C, driver: fn(&mut C) -> &mut AnimationDriver<C>) {
    const MAX_ROUNDS: usize = 64;
    for _ in 0..MAX_ROUNDS {
        let batch = std::mem::take(&mut driver(ctx).running);
        if batch.is_empty() {
            return;
        }
        for mut animation in batch {
            (animation.on_frame)(ctx, animation.option.curve.transform(1.0));
            if let Some(on_finish) = animation.on_finish {
                on_finish(ctx);
            }
        }
    }
    log::warn!("animations kept restarting while finishing; giving up");
}

#[cfg(test)]
#[path = "tests/animation_tests.rs"]
mod tests;
