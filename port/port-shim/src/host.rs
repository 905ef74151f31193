/// Services the host RTOS provides to the port.
///
/// Implementations wrap whatever the platform hands out — a timer driver
/// endpoint for time, the kernel's yield call for scheduling. The port
/// never talks to the kernel directly; this trait is its only window.
pub trait Host {
    /// Milliseconds since an arbitrary epoch.
    ///
    /// Must be monotonically non-decreasing. At millisecond resolution a
    /// `u64` does not wrap within any realistic uptime, so no wraparound
    /// handling exists downstream.
    fn ticks_ms(&self) -> u64;

    /// Voluntarily hand the processor back to the host scheduler.
    ///
    /// No return value and no failure mode; the stack calls this from its
    /// idle loop.
    fn yield_now(&self);
}
