//! Conversion between plain records and the document store's typed-value
//! wire shape, where every scalar is wrapped in a type-tagged object and
//! integers travel as decimal strings.

use std::collections::BTreeMap;

use anyhow::{bail, Context};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Challenge, MonthlyWinnersRecord, Winner};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldValue {
    StringValue(String),
    /// The wire format encodes 64-bit integers as decimal strings.
    IntegerValue(String),
    DoubleValue(f64),
    BooleanValue(bool),
    TimestampValue(String),
    ArrayValue(ArrayValue),
    MapValue(MapValue),
    NullValue(Option<()>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayValue {
    #[serde(default)]
    pub values: Vec<FieldValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapValue {
    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
}

impl FieldValue {
    pub fn string(value: impl Into<String>) -> Self {
        FieldValue::StringValue(value.into())
    }

    pub fn integer(value: i64) -> Self {
        FieldValue::IntegerValue(value.to_string())
    }

    pub fn timestamp(value: DateTime<Utc>) -> Self {
        FieldValue::TimestampValue(value.to_rfc3339_opts(SecondsFormat::Micros, true))
    }
}

/// A stored document. `name` is the full resource path when the store
/// returned the document; upsert bodies carry only `fields`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
}

impl Document {
    /// Last path segment of the resource name, i.e. the document id.
    pub fn id(&self) -> Option<&str> {
        self.name.as_deref().and_then(|name| name.rsplit('/').next())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListDocumentsResponse {
    #[serde(default)]
    pub documents: Option<Vec<Document>>,
}

// Encoding is total: every declared field of the record shapes below is
// always emitted, defaults included, so a re-run fully replaces the
// previous document instead of leaving stale fields behind.

pub fn encode_winners_record(record: &MonthlyWinnersRecord) -> Document {
    let mut fields = BTreeMap::new();
    fields.insert("month".to_owned(), FieldValue::string(&record.month));
    fields.insert("savedAt".to_owned(), FieldValue::timestamp(record.saved_at));
    fields.insert(
        "totalWinners".to_owned(),
        FieldValue::integer(record.total_winners as i64),
    );
    fields.insert(
        "winners".to_owned(),
        FieldValue::ArrayValue(ArrayValue {
            values: record
                .winners
                .iter()
                .map(|winner| FieldValue::MapValue(encode_winner(winner)))
                .collect(),
        }),
    );
    Document { name: None, fields }
}

fn encode_winner(winner: &Winner) -> MapValue {
    let mut fields = BTreeMap::new();
    fields.insert("userId".to_owned(), FieldValue::string(&winner.user_id));
    fields.insert(
        "displayName".to_owned(),
        FieldValue::string(&winner.display_name),
    );
    fields.insert("score".to_owned(), FieldValue::integer(winner.score));
    fields.insert(
        "executionTime".to_owned(),
        FieldValue::DoubleValue(winner.execution_time),
    );
    fields.insert("memory".to_owned(), FieldValue::integer(winner.memory));
    fields.insert(
        "hairColor".to_owned(),
        FieldValue::integer(winner.hair_color),
    );
    fields.insert(
        "skinColor".to_owned(),
        FieldValue::integer(winner.skin_color),
    );
    fields.insert("topColor".to_owned(), FieldValue::integer(winner.top_color));
    fields.insert(
        "accessory".to_owned(),
        FieldValue::integer(winner.accessory),
    );
    MapValue { fields }
}

pub fn encode_challenge(challenge: &Challenge) -> Document {
    let mut fields = BTreeMap::new();
    fields.insert("id".to_owned(), FieldValue::string(&challenge.id));
    fields.insert("title".to_owned(), FieldValue::string(&challenge.title));
    fields.insert(
        "description".to_owned(),
        FieldValue::string(&challenge.description),
    );
    fields.insert(
        "testCases".to_owned(),
        FieldValue::ArrayValue(ArrayValue {
            values: challenge
                .test_cases
                .iter()
                .map(|tc| {
                    let mut tc_fields = BTreeMap::new();
                    tc_fields.insert("name".to_owned(), FieldValue::string(&tc.name));
                    tc_fields.insert("input".to_owned(), FieldValue::string(&tc.input));
                    tc_fields.insert(
                        "expectedOutput".to_owned(),
                        FieldValue::string(&tc.expected_output),
                    );
                    FieldValue::MapValue(MapValue { fields: tc_fields })
                })
                .collect(),
        }),
    );
    fields.insert(
        "starterCode".to_owned(),
        FieldValue::MapValue(MapValue {
            fields: challenge
                .starter_code
                .iter()
                .map(|(language, code)| (language.clone(), FieldValue::string(code)))
                .collect(),
        }),
    );
    fields.insert(
        "difficulty".to_owned(),
        FieldValue::string(&challenge.difficulty),
    );
    fields.insert(
        "timeLimit".to_owned(),
        FieldValue::integer(i64::from(challenge.time_limit)),
    );
    fields.insert(
        "memoryLimit".to_owned(),
        FieldValue::integer(i64::from(challenge.memory_limit)),
    );
    fields.insert(
        "createdAt".to_owned(),
        FieldValue::timestamp(challenge.created_at),
    );
    fields.insert(
        "active".to_owned(),
        FieldValue::BooleanValue(challenge.active),
    );
    Document { name: None, fields }
}

/// Decodes a best-score document into a [`Winner`]. Absent fields fall back
/// to defaults (0, or a placeholder name derived from the user id); a field
/// that is present but malformed is an error, so the caller can skip the
/// user instead of silently ranking them with a zero.
pub fn decode_winner(
    user_id: &str,
    fields: &BTreeMap<String, FieldValue>,
) -> anyhow::Result<Winner> {
    let display_name = match string_field(fields, "displayName")? {
        Some(name) => name.to_owned(),
        None => format!("Agent-{}", user_id.get(..6).unwrap_or(user_id)),
    };
    Ok(Winner {
        user_id: user_id.to_owned(),
        display_name,
        score: int_field(fields, "score")?,
        execution_time: double_field(fields, "executionTime")?,
        memory: int_field(fields, "memory")?,
        hair_color: int_field(fields, "hairColor")?,
        skin_color: int_field(fields, "skinColor")?,
        top_color: int_field(fields, "topColor")?,
        accessory: int_field(fields, "accessory")?,
    })
}

fn string_field<'a>(
    fields: &'a BTreeMap<String, FieldValue>,
    name: &str,
) -> anyhow::Result<Option<&'a str>> {
    match fields.get(name) {
        None => Ok(None),
        Some(FieldValue::StringValue(value)) => Ok(Some(value)),
        Some(other) => bail!("field {name} is not a string: {other:?}"),
    }
}

fn int_field(fields: &BTreeMap<String, FieldValue>, name: &str) -> anyhow::Result<i64> {
    match fields.get(name) {
        None => Ok(0),
        Some(FieldValue::IntegerValue(raw)) => raw
            .parse()
            .with_context(|| format!("field {name} holds a malformed integer: {raw:?}")),
        Some(other) => bail!("field {name} is not an integer: {other:?}"),
    }
}

fn double_field(fields: &BTreeMap<String, FieldValue>, name: &str) -> anyhow::Result<f64> {
    match fields.get(name) {
        None => Ok(0.0),
        Some(FieldValue::DoubleValue(value)) => Ok(*value),
        // Whole numbers come back integer-tagged even for double fields.
        Some(FieldValue::IntegerValue(raw)) => raw
            .parse()
            .with_context(|| format!("field {name} holds a malformed number: {raw:?}")),
        Some(other) => bail!("field {name} is not a number: {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample_winner() -> Winner {
        Winner {
            user_id: "abc123def".to_owned(),
            display_name: "Agent A".to_owned(),
            score: 100,
            execution_time: 0.0,
            memory: 2048,
            hair_color: 1,
            skin_color: 2,
            top_color: 3,
            accessory: 0,
        }
    }

    #[test]
    fn winners_record_encoding_is_total() {
        let record = MonthlyWinnersRecord {
            month: "2025-08".to_owned(),
            winners: vec![sample_winner()],
            saved_at: Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 0).unwrap(),
            total_winners: 1,
        };
        let doc = serde_json::to_value(encode_winners_record(&record)).unwrap();

        assert_eq!(doc["fields"]["month"], json!({"stringValue": "2025-08"}));
        assert_eq!(
            doc["fields"]["savedAt"],
            json!({"timestampValue": "2025-09-01T00:00:00.000000Z"})
        );
        assert_eq!(doc["fields"]["totalWinners"], json!({"integerValue": "1"}));

        let winner = &doc["fields"]["winners"]["arrayValue"]["values"][0]["mapValue"]["fields"];
        // A zero execution time is still an explicit double, never omitted.
        assert_eq!(winner["executionTime"], json!({"doubleValue": 0.0}));
        assert_eq!(winner["score"], json!({"integerValue": "100"}));
        assert_eq!(winner["displayName"], json!({"stringValue": "Agent A"}));
        assert_eq!(winner["accessory"], json!({"integerValue": "0"}));
    }

    #[test]
    fn challenge_encoding_covers_every_field() {
        let challenge = Challenge {
            id: "2025-09".to_owned(),
            title: "First Missing Positive".to_owned(),
            description: "desc".to_owned(),
            test_cases: vec![crate::models::TestCase {
                name: "Example 1".to_owned(),
                input: "[1,2,0]".to_owned(),
                expected_output: "3".to_owned(),
            }],
            starter_code: [("python".to_owned(), "pass".to_owned())].into(),
            difficulty: "Medium".to_owned(),
            time_limit: 5,
            memory_limit: 128000,
            created_at: Utc.with_ymd_and_hms(2025, 8, 26, 12, 0, 0).unwrap(),
            active: true,
        };
        let doc = serde_json::to_value(encode_challenge(&challenge)).unwrap();

        assert_eq!(doc["fields"]["timeLimit"], json!({"integerValue": "5"}));
        assert_eq!(
            doc["fields"]["memoryLimit"],
            json!({"integerValue": "128000"})
        );
        assert_eq!(doc["fields"]["active"], json!({"booleanValue": true}));
        assert_eq!(
            doc["fields"]["testCases"]["arrayValue"]["values"][0]["mapValue"]["fields"]
                ["expectedOutput"],
            json!({"stringValue": "3"})
        );
        assert_eq!(
            doc["fields"]["starterCode"]["mapValue"]["fields"]["python"],
            json!({"stringValue": "pass"})
        );
        // No field of the document body may ever be dropped.
        assert_eq!(doc["fields"].as_object().unwrap().len(), 10);
    }

    #[test]
    fn document_deserializes_from_store_response() {
        let doc: Document = serde_json::from_value(json!({
            "name": "projects/p/databases/(default)/documents/artifacts/p/users/abc123def",
            "fields": {
                "score": {"integerValue": "42"},
                "displayName": {"stringValue": "Agent A"},
                "executionTime": {"doubleValue": 1.5}
            },
            "createTime": "2025-08-01T00:00:00Z",
            "updateTime": "2025-08-01T00:00:00Z"
        }))
        .unwrap();

        assert_eq!(doc.id(), Some("abc123def"));
        assert_eq!(
            doc.fields["score"],
            FieldValue::IntegerValue("42".to_owned())
        );
    }

    #[test]
    fn decode_winner_defaults_absent_fields() {
        let mut fields = BTreeMap::new();
        fields.insert("score".to_owned(), FieldValue::integer(42));

        let winner = decode_winner("abc123def", &fields).unwrap();
        assert_eq!(winner.display_name, "Agent-abc123");
        assert_eq!(winner.score, 42);
        assert_eq!(winner.execution_time, 0.0);
        assert_eq!(winner.memory, 0);
    }

    #[test]
    fn decode_winner_accepts_integer_tagged_doubles() {
        let mut fields = BTreeMap::new();
        fields.insert("score".to_owned(), FieldValue::integer(10));
        fields.insert(
            "executionTime".to_owned(),
            FieldValue::IntegerValue("2".to_owned()),
        );

        let winner = decode_winner("u", &fields).unwrap();
        assert_eq!(winner.execution_time, 2.0);
    }

    #[test]
    fn decode_winner_rejects_malformed_fields() {
        let mut fields = BTreeMap::new();
        fields.insert(
            "score".to_owned(),
            FieldValue::IntegerValue("not-a-number".to_owned()),
        );
        assert!(decode_winner("u", &fields).is_err());

        let mut fields = BTreeMap::new();
        fields.insert("score".to_owned(), FieldValue::BooleanValue(true));
        assert!(decode_winner("u", &fields).is_err());
    }

    #[test]
    fn short_user_ids_keep_their_full_placeholder() {
        let winner = decode_winner("ab", &BTreeMap::new()).unwrap();
        assert_eq!(winner.display_name, "Agent-ab");
    }
}
