//! Wire contracts for the issue-positions backend.
//!
//! These types mirror the JSON bodies served by the positions API. Missing or
//! `null` collections always decode to empty values so the layout never sees
//! a partially-populated payload.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Lower bound of the score domain.
pub const SCORE_MIN: f64 = -1.0;
/// Upper bound of the score domain.
pub const SCORE_MAX: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Party affiliation tag. Unknown tags are preserved as [`Category::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Democrat,
    Republican,
    Independent,
    Other(String),
}

impl Category {
    pub fn tag(&self) -> &str {
        match self {
            Category::Democrat => "D",
            Category::Republican => "R",
            Category::Independent => "I",
            Category::Other(tag) => tag,
        }
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        match value.trim() {
            "D" => Category::Democrat,
            "R" => Category::Republican,
            "I" => Category::Independent,
            _ => Category::Other(value),
        }
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        value.tag().to_string()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Chamber {
    Senate,
    House,
}

impl Chamber {
    pub fn as_query(self) -> &'static str {
        match self {
            Chamber::Senate => "senate",
            Chamber::House => "house",
        }
    }
}

impl std::str::FromStr for Chamber {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "senate" => Ok(Chamber::Senate),
            "house" => Ok(Chamber::House),
            other => Err(format!("unknown chamber '{other}'")),
        }
    }
}

/// One scored legislator as served in `positions[]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionEntity {
    #[serde(rename = "member_id", alias = "id")]
    pub id: EntityId,
    #[serde(rename = "name", alias = "display_name")]
    pub display_name: String,
    #[serde(rename = "party", alias = "category")]
    pub category: Category,
    #[serde(rename = "state", alias = "region", default)]
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chamber: Option<Chamber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence_count: Option<u32>,
}

impl PositionEntity {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        category: Category,
        region: impl Into<String>,
        score: f64,
    ) -> Self {
        Self {
            id: EntityId::new(id),
            display_name: display_name.into(),
            category,
            region: region.into(),
            chamber: None,
            photo_url: None,
            score,
            confidence: None,
            evidence_count: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IssueHeader {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub spectrum_left_label: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub spectrum_right_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spectrum_description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionStats {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u32>,
    #[serde(alias = "by_party", default, deserialize_with = "null_as_default")]
    pub by_category: BTreeMap<String, u32>,
}

/// Body of `GET /api/issues/{issue_id}/positions`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionsResponse {
    #[serde(default)]
    pub issue: IssueHeader,
    #[serde(default, deserialize_with = "null_as_default")]
    pub positions: Vec<PositionEntity>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stats: PositionStats,
    #[serde(default, deserialize_with = "null_as_default")]
    pub no_data: Vec<serde_json::Value>,
}

/// Entry of `GET /api/issues`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueSummary {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub spectrum_left_label: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub spectrum_right_label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteChoice {
    Yes,
    No,
    Abstain,
    NotVoting,
}

impl VoteChoice {
    pub fn label(self) -> &'static str {
        match self {
            VoteChoice::Yes => "YES",
            VoteChoice::No => "NO",
            VoteChoice::Abstain => "ABSTAIN",
            VoteChoice::NotVoting => "NOT VOTING",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteEvidence {
    #[serde(default, deserialize_with = "null_as_default")]
    pub bill_id: String,
    pub vote: VoteChoice,
    #[serde(default, deserialize_with = "null_as_default")]
    pub bill_title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub bill_position_indicator: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementEvidence {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub source_date: String,
    #[serde(alias = "cr_page", default, skip_serializing_if = "Option::is_none")]
    pub reference_page: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberIssuePosition {
    #[serde(deserialize_with = "string_or_number")]
    pub issue_id: String,
    pub score: f64,
    #[serde(default)]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemberEvidence {
    #[serde(default, deserialize_with = "null_as_default")]
    pub votes: Vec<VoteEvidence>,
}

/// Body of `GET /api/members/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberDetail {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub state: String,
    pub party: Category,
    #[serde(default)]
    pub chamber: Option<Chamber>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub positions: Vec<MemberIssuePosition>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub evidence: MemberEvidence,
}

/// Body of `GET /api/members/{id}/statements`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementsResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub statements: Vec<StatementEvidence>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Int(value) => value.to_string(),
        Raw::Float(value) => value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_payload_decodes_backend_shape() {
        let json = r#"{
            "issue": {
                "name": "Trade Policy",
                "slug": "trade-policy",
                "spectrum_left_label": "Free Trade",
                "spectrum_right_label": "Protectionist"
            },
            "positions": [
                {"member_id": "S000033", "name": "Bernard Sanders", "state": "VT",
                 "party": "I", "chamber": "senate", "photo_url": null,
                 "score": 0.62, "confidence": 0.8, "evidence_count": 12}
            ],
            "stats": {"total": 1, "by_party": {"D": 0, "R": 0, "I": 1}}
        }"#;
        let payload: PositionsResponse = serde_json::from_str(json).expect("payload decodes");
        assert_eq!(payload.issue.spectrum_left_label, "Free Trade");
        assert_eq!(payload.positions.len(), 1);
        let entity = &payload.positions[0];
        assert_eq!(entity.id.as_str(), "S000033");
        assert_eq!(entity.category, Category::Independent);
        assert_eq!(entity.region, "VT");
        assert_eq!(entity.chamber, Some(Chamber::Senate));
        assert_eq!(payload.stats.by_category.get("I"), Some(&1));
        assert!(payload.no_data.is_empty());
    }

    #[test]
    fn null_collections_decode_as_empty() {
        let json = r#"{"issue": {"name": "Trade"}, "positions": null, "stats": null, "no_data": null}"#;
        let payload: PositionsResponse = serde_json::from_str(json).expect("payload decodes");
        assert!(payload.positions.is_empty());
        assert!(payload.stats.by_category.is_empty());

        let detail: MemberDetail = serde_json::from_str(
            r#"{"id": "A000001", "name": "Test", "party": "R", "evidence": null}"#,
        )
        .expect("detail decodes");
        assert!(detail.evidence.votes.is_empty());
    }

    #[test]
    fn unknown_party_tag_is_preserved() {
        let category: Category = serde_json::from_str("\"L\"").expect("category decodes");
        assert_eq!(category, Category::Other("L".to_string()));
        assert_eq!(serde_json::to_string(&category).unwrap(), "\"L\"");
    }

    #[test]
    fn statements_accept_numeric_ids_and_record_pages() {
        let json = r#"{"statements": [
            {"id": 17, "title": null, "text": "On tariffs", "source_date": "2024-03-01", "cr_page": "S1234"}
        ]}"#;
        let response: StatementsResponse = serde_json::from_str(json).expect("statements decode");
        let statement = &response.statements[0];
        assert_eq!(statement.id, "17");
        assert_eq!(statement.reference_page.as_deref(), Some("S1234"));
        assert!(statement.title.is_none());
    }

    #[test]
    fn vote_choices_cover_non_scored_outcomes() {
        let vote: VoteEvidence = serde_json::from_str(
            r#"{"bill_id": "hr1-118", "vote": "not_voting", "bill_title": "Act", "bill_position_indicator": -0.5}"#,
        )
        .expect("vote decodes");
        assert_eq!(vote.vote, VoteChoice::NotVoting);
        assert_eq!(vote.vote.label(), "NOT VOTING");
    }
}
