//! Scheduling primitives for the sampling loop

/// Scoped token for code that must not be preempted.
///
/// `run` suspends interrupts/preemption, executes `f`, and restores normal
/// scheduling before returning, whatever `f` returns.
pub trait Uninterruptible {
    fn run<T>(&mut self, f: impl FnOnce() -> T) -> T;
}

/// Interrupts masked for the duration of the closure.
#[cfg(target_arch = "avr")]
pub struct InterruptFree {
    _private: (),
}

#[cfg(target_arch = "avr")]
impl InterruptFree {
    pub const fn new() -> Self {
        Self { _private: () }
    }
}

#[cfg(target_arch = "avr")]
impl Uninterruptible for InterruptFree {
    #[inline]
    fn run<T>(&mut self, f: impl FnOnce() -> T) -> T {
        // SREG is saved and restored by `free`
        avr_device::interrupt::free(|_cs| f())
    }
}

/// Scheduling policy the sampler thread ended up with.
#[cfg(not(target_arch = "avr"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheduling {
    /// `SCHED_FIFO` at `priority`
    RealTime { priority: i32 },
    /// The host refused the request; default time sharing.
    TimeShared,
}

/// Hosted stand-in: a user-space process cannot mask interrupts, so the
/// sampler gets a thread of its own, moved to `SCHED_FIFO` when the host
/// allows it, and busy-waits between reads. Jitter from the host scheduler
/// is reduced, not eliminated.
#[cfg(not(target_arch = "avr"))]
#[derive(Debug)]
pub struct DedicatedThread {
    scheduling: Scheduling,
}

#[cfg(not(target_arch = "avr"))]
impl DedicatedThread {
    /// Name of the thread the sampling loop runs on.
    pub const NAME: &'static str = "sampler";

    /// Token for the calling thread, if it is the sampler thread.
    ///
    /// Asks for real-time scheduling at
    /// [`SAMPLER_RT_PRIORITY`](crate::config::SAMPLER_RT_PRIORITY). A refusal
    /// (typically `EPERM` without `CAP_SYS_NICE`) is logged and the thread
    /// keeps running time-shared.
    pub fn current() -> Option<Self> {
        if std::thread::current().name() != Some(Self::NAME) {
            return None;
        }

        let priority = crate::config::SAMPLER_RT_PRIORITY;
        let scheduling = match set_fifo_scheduler(priority) {
            Ok(()) => {
                log::debug!("sampler thread running SCHED_FIFO at priority {}", priority);
                Scheduling::RealTime { priority }
            }
            Err(err) => {
                log::warn!("sampler thread keeps default scheduling: {}", err);
                Scheduling::TimeShared
            }
        };
        Some(Self { scheduling })
    }

    pub fn scheduling(&self) -> Scheduling {
        self.scheduling
    }
}

#[cfg(target_os = "linux")]
fn set_fifo_scheduler(priority: i32) -> std::io::Result<()> {
    let param = libc::sched_param {
        sched_priority: priority,
    };
    // pid 0 is the calling thread
    let ret = unsafe { libc::sched_setscheduler(0, libc::SCHED_FIFO, &param) };
    if ret != 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(all(not(target_arch = "avr"), not(target_os = "linux")))]
fn set_fifo_scheduler(_priority: i32) -> std::io::Result<()> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "SCHED_FIFO not available on this host",
    ))
}

#[cfg(not(target_arch = "avr"))]
impl Uninterruptible for DedicatedThread {
    #[inline]
    fn run<T>(&mut self, f: impl FnOnce() -> T) -> T {
        f()
    }
}

/// Milliseconds spanned by `ticks` scheduler ticks.
#[inline]
pub const fn ticks_to_ms(ticks: u32, tick_period_ms: u32) -> u32 {
    ticks * tick_period_ms
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_ticks_convert_to_milliseconds() {
        assert_eq!(ticks_to_ms(250, 10), 2_500);
        assert_eq!(ticks_to_ms(0, 10), 0);
    }

    #[test]
    fn sampler_token_only_on_sampler_thread() {
        assert!(DedicatedThread::current().is_none());

        let handle = std::thread::Builder::new()
            .name(DedicatedThread::NAME.into())
            .spawn(|| {
                let mut token = DedicatedThread::current().expect("sampler thread");
                token.run(|| 41 + 1)
            })
            .unwrap();
        assert_eq!(handle.join().unwrap(), 42);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn sampler_thread_policy_matches_token() {
        let handle = std::thread::Builder::new()
            .name(DedicatedThread::NAME.into())
            .spawn(|| {
                let token = DedicatedThread::current().expect("sampler thread");
                let mut param = libc::sched_param { sched_priority: 0 };
                let policy = unsafe { libc::sched_getscheduler(0) };
                assert_eq!(unsafe { libc::sched_getparam(0, &mut param) }, 0);
                (token.scheduling(), policy, param.sched_priority)
            })
            .unwrap();

        let (scheduling, policy, priority) = handle.join().unwrap();
        match scheduling {
            Scheduling::RealTime { priority: requested } => {
                assert_eq!(policy, libc::SCHED_FIFO);
                assert_eq!(priority, requested);
                assert_eq!(requested, crate::config::SAMPLER_RT_PRIORITY);
            }
            Scheduling::TimeShared => {
                assert_eq!(policy, libc::SCHED_OTHER);
                assert_eq!(priority, 0);
            }
        }
    }
}
