
use crate::entities::{EventType, ObjectNotification};
use aws_lambda_events::event::s3::{S3Event, S3EventRecord};
use lambda_runtime::LambdaEvent;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use time::OffsetDateTime;
use tracing::{event, Level};
use url::form_urlencoded;

/// Reserved out of every invocation for logging and returning the report.
const DEADLINE_SAFETY_MARGIN: Duration = Duration::from_millis(250);

#[derive(Debug)]
pub enum EventProcessingError {
    MalformedNotification(String),
}

/// Anything that can hand over the notifications of a single delivery.
pub trait NotificationSource {
    fn notifications(self) -> Vec<Result<ObjectNotification, EventProcessingError>>;
}

impl NotificationSource for S3Event {
    fn notifications(self) -> Vec<Result<ObjectNotification, EventProcessingError>> {
        self.records
            .into_iter()
            .enumerate()
            .map(|(position, record)| _to_object_notification(position, record))
            .collect()
    }
}

fn _to_object_notification(
    position: usize,
    record: S3EventRecord,
) -> Result<ObjectNotification, EventProcessingError> {
    let bucket = record
        .s3
        .bucket
        .name
        .filter(|name| !name.is_empty())
        .ok_or_else(|| {
            EventProcessingError::MalformedNotification(format!(
                "Record {} has no bucket name.",
                position
            ))
        })?;
    let key = record
        .s3
        .object
        .key
        .map(|raw| decode_object_key(&raw))
        .filter(|key| !key.is_empty())
        .ok_or_else(|| {
            EventProcessingError::MalformedNotification(format!(
                "Record {} in bucket {} has no object key.",
                position, bucket
            ))
        })?;
    let event_time = OffsetDateTime::from_unix_timestamp(record.event_time.timestamp())
        .and_then(|t| t.replace_nanosecond(record.event_time.timestamp_subsec_nanos()))
        .map_err(|e| {
            EventProcessingError::MalformedNotification(format!(
                "Record {} for {}/{} has an unusable event time:\n{:?}",
                position, bucket, key, e
            ))
        })?;
    Ok(ObjectNotification {
        bucket,
        key,
        event_time,
        event_type: event_type_from_name(record.event_name.as_deref()),
    })
}

pub fn event_type_from_name(event_name: Option<&str>) -> EventType {
    match event_name {
        Some(name) if name.trim_start_matches("s3:").starts_with("ObjectCreated:") => {
            EventType::Created
        }
        _ => EventType::Other,
    }
}

/// S3 form-encodes object keys in notifications (`+` for space, `%XX` escapes).
pub fn decode_object_key(raw_key: &str) -> String {
    // literal separators belong to the key itself
    let escaped = raw_key.replace('&', "%26").replace('=', "%3D");
    form_urlencoded::parse(escaped.as_bytes())
        .next()
        .map(|(name, _)| name.into_owned())
        .unwrap_or_default()
}

/// Time left before the runtime kills the invocation, minus a margin for
/// wrapping up. Zero once the deadline has passed.
pub fn invocation_budget(deadline_ms: u64, now: SystemTime) -> Duration {
    let now_since_epoch = now.duration_since(UNIX_EPOCH).unwrap_or_default();
    Duration::from_millis(deadline_ms)
        .saturating_sub(now_since_epoch)
        .saturating_sub(DEADLINE_SAFETY_MARGIN)
}

pub fn process_lambda_event(
    event: LambdaEvent<S3Event>,
) -> (Vec<Result<ObjectNotification, EventProcessingError>>, Duration) {
    let (payload, context) = event.into_parts();
    let budget = invocation_budget(context.deadline, SystemTime::now());
    if payload.records.is_empty() {
        event!(
            Level::INFO,
            "Invocation {} carried no records; nothing to dispatch.",
            context.request_id
        );
    }
    (payload.notifications(), budget)
}
