
use crate::entities::{EventType, FilterRule, ObjectNotification};
use crate::events::EventProcessingError;

/// Decides whether a notification should reach the dispatcher.
///
/// Only object-creation events whose key starts with `rule.prefix` and ends
/// with `rule.suffix` pass. Both comparisons are case-sensitive and an empty
/// prefix or suffix matches anything. A notification without bucket or key is
/// an error, not a reject.
pub fn accepts(
    notification: &ObjectNotification,
    rule: &FilterRule,
) -> Result<bool, EventProcessingError> {
    if notification.bucket.is_empty() || notification.key.is_empty() {
        return Err(EventProcessingError::MalformedNotification(format!(
            "Notification lacks bucket or key: bucket={:?} key={:?}",
            &notification.bucket, &notification.key
        )));
    }
    Ok(notification.event_type == EventType::Created
        && key_matches(&notification.key, rule))
}

pub fn key_matches(key: &str, rule: &FilterRule) -> bool {
    key.starts_with(&rule.prefix) && key.ends_with(&rule.suffix)
}
