//! Version numbering, ordering and construction.
//!
//! Version numbers are computed client side as `max + 1` over the versions
//! the store reports. Two editors publishing at once can compute the same
//! number; nothing here prevents that.

use crate::document::{FlowDraft, FlowVersion, VersionGraph};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use std::cmp::Ordering;

/// Parses a version number the way a lenient integer parser would.
///
/// Leading whitespace and an optional `+` are accepted, then leading digits
/// are read and the rest ignored. Anything unparsable is 0.
#[must_use]
pub fn version_number(version: Option<&str>) -> u64 {
    let Some(text) = version else {
        return 0;
    };
    let text = text.trim_start();
    let text = text.strip_prefix('+').unwrap_or(text);
    let digits: String = text.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}

/// Returns `max(existing) + 1`, or 1 when there are none.
#[must_use]
pub fn next_version(existing: &[FlowVersion]) -> u64 {
    existing
        .iter()
        .map(|v| version_number(v.version.as_deref()))
        .max()
        .unwrap_or(0)
        + 1
}

/// Parses a `created` timestamp.
///
/// Accepts an RFC 3339 string, epoch milliseconds as a number or numeric
/// string, or either of those nested under `timestamp`.
#[must_use]
pub fn parse_created(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Object(map) => parse_created(map.get("timestamp")?),
        Value::String(text) => DateTime::parse_from_rfc3339(text)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| from_millis(text.trim().parse::<f64>().ok()?)),
        Value::Number(number) => from_millis(number.as_f64()?),
        _ => None,
    }
}

fn from_millis(millis: f64) -> Option<DateTime<Utc>> {
    if !millis.is_finite() {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    Utc.timestamp_millis_opt(millis as i64).single()
}

fn created_millis(version: &FlowVersion) -> i64 {
    version
        .created
        .as_ref()
        .and_then(parse_created)
        .map_or(0, |dt| dt.timestamp_millis())
}

/// Orders versions newest first: by number, then by creation time.
pub fn sort_versions(versions: &mut [FlowVersion]) {
    versions.sort_by(compare_newest_first);
}

fn compare_newest_first(a: &FlowVersion, b: &FlowVersion) -> Ordering {
    version_number(b.version.as_deref())
        .cmp(&version_number(a.version.as_deref()))
        .then_with(|| created_millis(b).cmp(&created_millis(a)))
}

/// Builds the version document to publish for `flow`.
#[must_use]
pub fn build_version(
    flow: &FlowDraft,
    number: u64,
    graph: VersionGraph,
    organization_fallback: &str,
    description: &str,
) -> FlowVersion {
    let organization_id = flow
        .organization_id
        .clone()
        .filter(|org| !org.is_empty())
        .unwrap_or_else(|| organization_fallback.to_string());

    FlowVersion {
        version: Some(number.to_string()),
        flow_definition_id: flow.id.clone(),
        flow_slug: Some(flow.slug.clone()),
        organization_id: Some(organization_id),
        name: Some(format!("{} v{number}", flow.name)),
        description: Some(description.to_string()),
        graph: Some(graph),
        trigger_ids: flow.trigger_ids.clone(),
        default_trigger_id: flow.default_trigger_id.clone(),
        is_default: true,
        ..FlowVersion::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowdesk_core::FlowId;
    use serde_json::json;

    fn version(number: &str, created: Value) -> FlowVersion {
        FlowVersion {
            version: Some(number.to_string()),
            created: Some(created),
            ..FlowVersion::default()
        }
    }

    #[test]
    fn version_number_parses_leading_digits() {
        assert_eq!(version_number(Some("12")), 12);
        assert_eq!(version_number(Some("3-beta")), 3);
        assert_eq!(version_number(Some("  7")), 7);
        assert_eq!(version_number(Some("v2")), 0);
        assert_eq!(version_number(Some("")), 0);
        assert_eq!(version_number(None), 0);
    }

    #[test]
    fn next_version_is_max_plus_one() {
        assert_eq!(next_version(&[]), 1);
        let versions = vec![
            version("1", json!(null)),
            version("3", json!(null)),
            version("2", json!(null)),
        ];
        assert_eq!(next_version(&versions), 4);
    }

    #[test]
    fn created_formats() {
        let expected = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let millis = expected.timestamp_millis();
        assert_eq!(parse_created(&json!("2026-03-01T12:00:00Z")), Some(expected));
        assert_eq!(parse_created(&json!(millis)), Some(expected));
        assert_eq!(parse_created(&json!(millis.to_string())), Some(expected));
        assert_eq!(
            parse_created(&json!({"timestamp": "2026-03-01T12:00:00Z"})),
            Some(expected)
        );
        assert_eq!(parse_created(&json!("yesterday")), None);
        assert_eq!(parse_created(&json!(null)), None);
    }

    #[test]
    fn sort_by_number_then_created() {
        let mut versions = vec![
            version("1", json!("2026-01-01T00:00:00Z")),
            version("2", json!("2026-01-02T00:00:00Z")),
            version("2", json!("2026-01-03T00:00:00Z")),
            version("junk", json!(null)),
            version("10", json!(null)),
        ];
        sort_versions(&mut versions);
        let order: Vec<(&str, Option<&Value>)> = versions
            .iter()
            .map(|v| (v.version.as_deref().unwrap(), v.created.as_ref()))
            .collect();
        assert_eq!(order[0].0, "10");
        assert_eq!(order[1], ("2", Some(&json!("2026-01-03T00:00:00Z"))));
        assert_eq!(order[2], ("2", Some(&json!("2026-01-02T00:00:00Z"))));
        assert_eq!(order[3].0, "1");
        assert_eq!(order[4].0, "junk");
    }

    #[test]
    fn build_version_payload() {
        let mut flow = FlowDraft::new("Onboarding", "onboarding");
        flow.id = Some(FlowId::from("flow_1"));
        flow.trigger_ids = Some(json!(["t1"]));

        let built = build_version(&flow, 3, VersionGraph::default(), "org_default", "Published");
        assert_eq!(built.version.as_deref(), Some("3"));
        assert_eq!(built.name.as_deref(), Some("Onboarding v3"));
        assert_eq!(built.flow_definition_id, flow.id);
        assert_eq!(built.flow_slug.as_deref(), Some("onboarding"));
        assert_eq!(built.organization_id.as_deref(), Some("org_default"));
        assert_eq!(built.trigger_ids, Some(json!(["t1"])));
        assert!(built.is_default);
    }
}
