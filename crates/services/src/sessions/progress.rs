/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionProgress {
    pub total: usize,
    pub answered: usize,
    pub marked: usize,
    pub remaining_secs: u32,
    pub is_complete: bool,
}

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Question set is being fetched; no engine exists yet.
    Loading,
    Active,
    Terminated,
}
