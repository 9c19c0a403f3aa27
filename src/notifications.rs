use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::models::{Notification, NotificationKind};

pub const DEFAULT_DURATION_MS: u64 = 5_000;
pub const RETENTION_HOURS: i64 = 24;

pub fn new_notification(
    message: impl Into<String>,
    kind: NotificationKind,
    duration_ms: u64,
    now: DateTime<Utc>,
) -> Notification {
    Notification {
        id: Uuid::new_v4(),
        message: message.into(),
        kind,
        timestamp: now,
        duration: duration_ms,
    }
}

impl Notification {
    pub fn expires_at(&self) -> DateTime<Utc> {
        let millis = i64::try_from(self.duration).unwrap_or(i64::MAX);
        Duration::try_milliseconds(millis)
            .and_then(|d| self.timestamp.checked_add_signed(d))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at() <= now
    }
}

pub fn expire(notifications: &mut Vec<Notification>, now: DateTime<Utc>) -> usize {
    let before = notifications.len();
    notifications.retain(|n| !n.is_expired(now));
    before - notifications.len()
}

pub fn prune_old(notifications: &mut Vec<Notification>, now: DateTime<Utc>) -> usize {
    let cutoff = now - Duration::hours(RETENTION_HOURS);
    let before = notifications.len();
    notifications.retain(|n| n.timestamp > cutoff);
    before - notifications.len()
}
