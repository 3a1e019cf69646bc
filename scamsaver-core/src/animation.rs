// Cosmetic scan progress. Driven purely by elapsed time, never by the request.

use std::time::Duration;

pub const SCAN_STEPS: [&str; 6] = [
    "Querying DNS records...",
    "Checking blacklists...",
    "Validating SSL/TLS certificates...",
    "Analyzing WHOIS data...",
    "Evaluating social sentiment...",
    "Compiling AI risk assessment...",
];

pub const PROGRESS_TICK: Duration = Duration::from_millis(80);
pub const PROGRESS_PER_TICK: f32 = 1.5;
pub const STEP_INTERVAL: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanFrame {
    /// 0.0 to 100.0
    pub progress: f32,
    pub step: usize,
    pub label: &'static str,
}

impl ScanFrame {
    pub fn percent(&self) -> u64 {
        self.progress.floor() as u64
    }
}

pub fn frame_at(elapsed: Duration) -> ScanFrame {
    let ticks = (elapsed.as_millis() / PROGRESS_TICK.as_millis()) as f32;
    let progress = (ticks * PROGRESS_PER_TICK).min(100.0);
    let step = ((elapsed.as_millis() / STEP_INTERVAL.as_millis()) % SCAN_STEPS.len() as u128) as usize;

    ScanFrame {
        progress,
        step,
        label: SCAN_STEPS[step],
    }
}
