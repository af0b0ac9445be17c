use super::{FormatContext, InputData};
use crate::domain::EventRecord;
use chrono::{DateTime, Local, TimeZone};
use serde_json::Value;
use std::fmt::Display;

/// Human-readable time, e.g. `Thu May 17 2018 17:44:37 GMT+0300`.
pub fn format_time_string<Tz>(time: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    time.format("%a %b %d %Y %H:%M:%S GMT%z").to_string()
}

/// Structured record rendered in the local time zone.
pub fn format_network(event: &EventRecord, ctx: &FormatContext) -> String {
    format_network_in(event, ctx, &Local)
}

/// Structured record: the event envelope, overlaid with the projected fields,
/// `timeString` and the severity label as `level`.
pub fn format_network_in<Tz>(event: &EventRecord, ctx: &FormatContext, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let data = InputData::project(event, ctx);
    let mut out = event.envelope();
    out.insert("msg".into(), Value::String(data.msg));
    out.insert("tag".into(), Value::String(data.tag));
    out.insert("label".into(), Value::String(data.label));
    out.insert("data".into(), data.data);
    out.insert(
        "timeString".into(),
        Value::String(format_time_string(&event.timestamp.with_timezone(tz))),
    );
    out.insert(
        "level".into(),
        Value::String(event.severity.as_str().to_string()),
    );
    Value::Object(out).to_string()
}
