use super::{FormatContext, InputData, format_date};
use crate::domain::EventRecord;

/// `<date> <SEVERITY> <label> / <tag> "<msg>", <json(data)>`
pub fn format_file(event: &EventRecord, ctx: &FormatContext) -> String {
    let data = InputData::project(event, ctx);
    format!(
        "{} {} {} / {} \"{}\", {}",
        format_date(&event.timestamp),
        event.severity.as_str().to_uppercase(),
        data.label,
        data.tag,
        data.msg,
        data.data
    )
}
