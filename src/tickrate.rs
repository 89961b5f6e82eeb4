use std::thread;

/// Counts loop iterations and reports them once per second.
pub struct TickRate {
    thread_name: String,
    last_report: f64,
    ticks: u32,
}

impl TickRate {
    pub fn new(now: f64) -> TickRate {
        let cur_thread = thread::current();
        let thread_name = if let Some(name) = cur_thread.name() {
            name
        } else {
            "unnamed"
        };

        TickRate {
            thread_name: thread_name.to_string(),
            last_report: now,
            ticks: 0,
        }
    }

    /// Returns the number of ticks of the last full second when a report is due.
    pub fn tick(&mut self, now: f64) -> Option<u32> {
        self.ticks += 1;

        if now - self.last_report < 1.0 {
            return None;
        }

        let ticks = self.ticks;
        log::debug!("{} ticks/s: {}", self.thread_name, ticks);
        self.ticks = 0;
        self.last_report = now;
        Some(ticks)
    }
}
