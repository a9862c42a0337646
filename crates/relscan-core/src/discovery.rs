//! Custom field discovery for building a catalog by hand.
//!
//! Samples a handful of issues, collects every populated `customfield_*`,
//! and guesses what each one is for from its display name. The guesses are
//! a starting point for a human editing the report config, nothing more.

use std::collections::{BTreeSet, HashMap};

use serde_json::{Map, Value};

const CUSTOM_PREFIX: &str = "customfield_";
const MAX_SAMPLES: usize = 3;
const PREVIEW_LEN: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldPurpose {
    StoryPoints,
    Sprint,
    SdlcInformation,
    ApplicationName,
    AcceptanceCriteria,
    FeatureLink,
    Notes,
    PossibleLink,
    Unknown,
}

impl FieldPurpose {
    /// Suggested logical name for the report config, if the guess maps to one.
    pub fn logical_name(&self) -> Option<&'static str> {
        match self {
            Self::StoryPoints => Some("story_points"),
            Self::Sprint => Some("sprint"),
            Self::SdlcInformation => Some("sdlc_information"),
            Self::ApplicationName => Some("application_name"),
            Self::AcceptanceCriteria => Some("acceptance_criteria"),
            Self::FeatureLink => Some("feature_link"),
            Self::Notes => Some("notes"),
            Self::PossibleLink | Self::Unknown => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::StoryPoints => "Story Points",
            Self::Sprint => "Sprint",
            Self::SdlcInformation => "SDLC Information",
            Self::ApplicationName => "Application Name",
            Self::AcceptanceCriteria => "Acceptance Criteria",
            Self::FeatureLink => "Feature Link",
            Self::Notes => "Notes",
            Self::PossibleLink => "Possible Link",
            Self::Unknown => "Unknown",
        }
    }
}

// Checked in order; the first rule with a matching keyword wins.
const PURPOSE_RULES: &[(FieldPurpose, &[&str])] = &[
    (FieldPurpose::StoryPoints, &["story point", "point", "estimate"]),
    (FieldPurpose::Sprint, &["sprint"]),
    (FieldPurpose::SdlcInformation, &["sdlc", "lifecycle", "environment"]),
    (FieldPurpose::ApplicationName, &["app", "application"]),
    (FieldPurpose::AcceptanceCriteria, &["acceptance", "criteria", "ac"]),
    (FieldPurpose::FeatureLink, &["feature", "link", "url"]),
    (FieldPurpose::Notes, &["note", "comment", "remark"]),
];

/// Guess a field's purpose from its display name, then from a sample value.
pub fn guess_purpose(field_name: &str, value: &Value) -> FieldPurpose {
    let lower = field_name.to_lowercase();
    for (purpose, keywords) in PURPOSE_RULES {
        if keywords.iter().any(|k| lower.contains(k)) {
            return *purpose;
        }
    }
    match value {
        Value::String(s) if s.contains("http") || s.contains("www") => FieldPurpose::PossibleLink,
        _ => FieldPurpose::Unknown,
    }
}

/// JSON kind name used in survey output.
pub fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

/// Short human-readable preview of a raw value.
pub fn describe_sample(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            if let Some(name) = map.get("name") {
                format!("object with name: {}", crate::normalize_json(name))
            } else if let Some(v) = map.get("value") {
                format!("object with value: {}", crate::normalize_json(v))
            } else {
                format!("object: {}", preview(&value.to_string()))
            }
        }
        Value::Array(items) if items.is_empty() => "empty list".to_string(),
        Value::Array(items) => {
            let names: Vec<String> = items
                .iter()
                .take(2)
                .filter_map(|i| i.get("name").map(crate::normalize_json))
                .collect();
            if names.is_empty() {
                format!("list: {}", preview(&value.to_string()))
            } else {
                format!("list with names: {}", names.join(", "))
            }
        }
        other => preview(&crate::normalize_json(other)),
    }
}

fn preview(s: &str) -> String {
    if s.chars().count() > PREVIEW_LEN {
        let cut: String = s.chars().take(PREVIEW_LEN).collect();
        format!("{cut}...")
    } else {
        s.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSample {
    pub issue_key: String,
    pub kind: &'static str,
    pub preview: String,
}

/// Observations for one custom field across the sampled issues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldUsage {
    pub field_id: String,
    pub field_name: String,
    pub purpose: FieldPurpose,
    pub kinds: BTreeSet<&'static str>,
    pub issue_keys: Vec<String>,
    pub samples: Vec<FieldSample>,
}

impl FieldUsage {
    pub fn usage_count(&self) -> usize {
        self.issue_keys.len()
    }
}

/// Aggregates custom field usage across issues.
#[derive(Debug, Default)]
pub struct FieldSurvey {
    usages: HashMap<String, FieldUsage>,
}

impl FieldSurvey {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one issue. `names` maps field ids to display names (the
    /// search response's `names` block when requested with `expand=names`).
    pub fn observe(&mut self, issue: &Value, names: &Map<String, Value>) {
        let key = issue
            .get("key")
            .map(crate::normalize_json)
            .unwrap_or_default();
        let Some(fields) = issue.get("fields").and_then(Value::as_object) else {
            return;
        };

        for (field_id, value) in fields {
            if !field_id.starts_with(CUSTOM_PREFIX) || value.is_null() {
                continue;
            }
            let usage = self.usages.entry(field_id.clone()).or_insert_with(|| {
                let field_name = names
                    .get(field_id)
                    .and_then(Value::as_str)
                    .unwrap_or("Unknown Field Name")
                    .to_string();
                FieldUsage {
                    field_id: field_id.clone(),
                    purpose: guess_purpose(&field_name, value),
                    field_name,
                    kinds: BTreeSet::new(),
                    issue_keys: Vec::new(),
                    samples: Vec::new(),
                }
            });
            usage.kinds.insert(kind_of(value));
            usage.issue_keys.push(key.clone());
            if usage.samples.len() < MAX_SAMPLES {
                usage.samples.push(FieldSample {
                    issue_key: key.clone(),
                    kind: kind_of(value),
                    preview: describe_sample(value),
                });
            }
        }
    }

    /// Usages sorted by usage count (descending), then field id.
    pub fn report(&self) -> Vec<&FieldUsage> {
        let mut out: Vec<&FieldUsage> = self.usages.values().collect();
        out.sort_by(|a, b| {
            b.usage_count()
                .cmp(&a.usage_count())
                .then_with(|| a.field_id.cmp(&b.field_id))
        });
        out
    }

    pub fn len(&self) -> usize {
        self.usages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.usages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn purpose_from_name() {
        assert_eq!(guess_purpose("Story Points", &json!(3)), FieldPurpose::StoryPoints);
        assert_eq!(guess_purpose("Sprint", &json!([])), FieldPurpose::Sprint);
        assert_eq!(guess_purpose("SDLC Information", &json!("x")), FieldPurpose::SdlcInformation);
        assert_eq!(guess_purpose("Application Name", &json!({})), FieldPurpose::ApplicationName);
        assert_eq!(guess_purpose("Release Notes", &json!("x")), FieldPurpose::Notes);
    }

    #[test]
    fn first_rule_wins() {
        // "Estimate" hits story points before anything else.
        assert_eq!(guess_purpose("Estimate Notes", &json!(1)), FieldPurpose::StoryPoints);
    }

    #[test]
    fn purpose_from_value_when_name_unhelpful() {
        assert_eq!(
            guess_purpose("Xyz", &json!("https://wiki/x")),
            FieldPurpose::PossibleLink
        );
        assert_eq!(guess_purpose("Xyz", &json!(5)), FieldPurpose::Unknown);
    }

    #[test]
    fn describe_shapes() {
        assert_eq!(describe_sample(&json!({"name": "Core"})), "object with name: Core");
        assert_eq!(describe_sample(&json!({"value": "Yes"})), "object with value: Yes");
        assert_eq!(describe_sample(&json!([])), "empty list");
        assert_eq!(
            describe_sample(&json!([{"name": "a"}, {"name": "b"}, {"name": "c"}])),
            "list with names: a, b"
        );
        let long = "y".repeat(150);
        assert_eq!(describe_sample(&json!(long)).chars().count(), PREVIEW_LEN + 3);
    }

    #[test]
    fn survey_aggregates_and_sorts() {
        let names = json!({
            "customfield_1": "Story Points",
            "customfield_2": "Team"
        });
        let names = names.as_object().unwrap();
        let mut survey = FieldSurvey::new();
        survey.observe(
            &json!({"key": "A-1", "fields": {"customfield_1": 3, "customfield_2": {"value": "Blue"}, "summary": "s"}}),
            names,
        );
        survey.observe(
            &json!({"key": "A-2", "fields": {"customfield_1": 5.5, "customfield_2": null}}),
            names,
        );

        assert_eq!(survey.len(), 2);
        let report = survey.report();
        assert_eq!(report[0].field_id, "customfield_1");
        assert_eq!(report[0].usage_count(), 2);
        assert_eq!(report[0].purpose, FieldPurpose::StoryPoints);
        assert_eq!(report[0].kinds.iter().copied().collect::<Vec<_>>(), vec!["number"]);
        assert_eq!(report[1].field_name, "Team");
        assert_eq!(report[1].usage_count(), 1);
    }

    #[test]
    fn samples_capped() {
        let mut survey = FieldSurvey::new();
        let names = Map::new();
        for i in 0..5 {
            survey.observe(
                &json!({"key": format!("A-{i}"), "fields": {"customfield_9": "v"}}),
                &names,
            );
        }
        let usage = survey.report()[0];
        assert_eq!(usage.samples.len(), MAX_SAMPLES);
        assert_eq!(usage.usage_count(), 5);
        assert_eq!(usage.field_name, "Unknown Field Name");
    }
}
