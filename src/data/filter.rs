// ---------------------------------------------------------------------------
// Timestep range: which snapshots a read keeps
// ---------------------------------------------------------------------------

/// Inclusive `[start, stop]` timestep bounds. A missing bound is open-ended.
///
/// Dump files are assumed to be sorted by increasing timestep, so a reader
/// stops at the first timestep past `stop` instead of scanning to the end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimestepRange {
    pub start: Option<i64>,
    pub stop: Option<i64>,
}

impl TimestepRange {
    /// Range that keeps every timestep.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new(start: Option<i64>, stop: Option<i64>) -> Self {
        Self { start, stop }
    }

    pub fn starting_at(start: i64) -> Self {
        Self {
            start: Some(start),
            stop: None,
        }
    }

    pub fn until(stop: i64) -> Self {
        Self {
            start: None,
            stop: Some(stop),
        }
    }

    /// Timestep lies before `start`; its section is skipped but scanning goes on.
    pub fn is_before(&self, timestep: i64) -> bool {
        self.start.is_some_and(|s| timestep < s)
    }

    /// Timestep lies past `stop`; nothing later in the file can match.
    pub fn is_past(&self, timestep: i64) -> bool {
        self.stop.is_some_and(|s| timestep > s)
    }
}
