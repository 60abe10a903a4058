use crate::entry::DirectoryEntry;
use crate::error::ValidationError;
use std::time::{Duration, SystemTime};

const SECS_PER_DAY: u64 = 86_400;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeThreshold {
    days: u32,
}

impl AgeThreshold {
    pub const DEFAULT: AgeThreshold = AgeThreshold { days: 30 };

    pub fn new(days: i64) -> Result<Self, ValidationError> {
        if days <= 0 {
            return Err(ValidationError::Threshold(days));
        }
        u32::try_from(days)
            .map(|days| Self { days })
            .map_err(|_| ValidationError::ThresholdTooLarge(days))
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    /// `None` when the cutoff is before anything the platform clock can represent.
    pub fn cutoff(&self, now: SystemTime) -> Option<SystemTime> {
        now.checked_sub(Duration::from_secs(u64::from(self.days) * SECS_PER_DAY))
    }
}

/// Pick the files older than `threshold`, keeping input order. Directories never match.
pub fn select<'a>(
    entries: &'a [DirectoryEntry],
    now: SystemTime,
    threshold: AgeThreshold,
) -> Vec<&'a DirectoryEntry> {
    modified_before(entries, threshold.cutoff(now))
}

fn modified_before(
    entries: &[DirectoryEntry],
    cutoff: Option<SystemTime>,
) -> Vec<&DirectoryEntry> {
    let Some(cutoff) = cutoff else {
        return Vec::new();
    };
    entries
        .iter()
        .filter(|e| !e.is_dir && e.modified < cutoff)
        .collect()
}
