// View state for a sequence of user-submitted scans

use scamsaver_analyzer::{AnalysisError, AnalysisResult};
use tracing::debug;

/// Identity of one submitted scan. Later submissions carry larger values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn sequence(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Idle,
    Scanning { ticket: Ticket, url: String },
    Complete(AnalysisResult),
    Failed(String),
}

/// Tracks the latest submitted scan so that late responses from earlier
/// submissions cannot overwrite what the user is looking at.
#[derive(Debug)]
pub struct ScanSession {
    next_sequence: u64,
    latest: Option<Ticket>,
    state: ViewState,
}

impl Default for ScanSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanSession {
    pub fn new() -> Self {
        Self {
            next_sequence: 1,
            latest: None,
            state: ViewState::Idle,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn is_scanning(&self) -> bool {
        matches!(self.state, ViewState::Scanning { .. })
    }

    pub fn latest_ticket(&self) -> Option<Ticket> {
        self.latest
    }

    /// Start a scan of `url`. Empty input is ignored and leaves the state as it was.
    pub fn submit(&mut self, url: &str) -> Option<Ticket> {
        if url.trim().is_empty() {
            return None;
        }

        let ticket = Ticket(self.next_sequence);
        self.next_sequence += 1;
        self.latest = Some(ticket);
        self.state = ViewState::Scanning {
            ticket,
            url: url.to_string(),
        };
        Some(ticket)
    }

    /// Apply the outcome of a scan. Returns `false` and changes nothing when
    /// `ticket` is not the most recent submission.
    pub fn settle(
        &mut self,
        ticket: Ticket,
        outcome: Result<AnalysisResult, AnalysisError>,
    ) -> bool {
        if self.latest != Some(ticket) {
            debug!("Discarding stale result for scan #{}", ticket.0);
            return false;
        }

        self.state = match outcome {
            Ok(result) => ViewState::Complete(result),
            Err(e) => ViewState::Failed(e.user_message().to_string()),
        };
        true
    }

    pub fn reset(&mut self) {
        self.latest = None;
        self.state = ViewState::Idle;
    }
}
