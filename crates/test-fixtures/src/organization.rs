//! Declarative organizations: a JSON list of streams and edges, seeded into
//! any `IGraphStorage` with deterministic ids and strictly increasing
//! timestamps (file order), so "oldest edge" tie-breaks are predictable.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::Deserialize;

use strata_core::errors::StrataResult;
use strata_core::models::{
    InheritanceRule, Relation, RelationType, Stream, StreamRole, StreamStatus,
};
use strata_core::traits::IGraphStorage;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamFixture {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub role: Option<StreamRole>,
    #[serde(default = "default_type_tag")]
    pub type_tag: String,
    #[serde(default)]
    pub status: StreamStatus,
    #[serde(default = "empty_object")]
    pub config: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationFixture {
    pub parent: String,
    pub child: String,
    #[serde(default)]
    pub relation_type: RelationType,
    #[serde(default)]
    pub inheritance: InheritanceRule,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationFixture {
    pub organization_id: String,
    pub streams: Vec<StreamFixture>,
    #[serde(default)]
    pub relations: Vec<RelationFixture>,
}

fn default_type_tag() -> String {
    strata_core::models::type_tags::STREAM.to_string()
}

fn empty_object() -> serde_json::Value {
    serde_json::json!({})
}

/// What [`OrganizationFixture::seed`] wrote.
#[derive(Debug, Clone)]
pub struct SeededOrganization {
    pub organization_id: String,
    pub streams: BTreeMap<String, Stream>,
    pub relations: Vec<Relation>,
}

impl SeededOrganization {
    /// # Panics
    /// Panics if the fixture declared no stream with this id.
    pub fn stream(&self, id: &str) -> &Stream {
        self.streams
            .get(id)
            .unwrap_or_else(|| panic!("fixture has no stream {id}"))
    }

    /// The relation seeded for `parent → child`, if any.
    pub fn relation(&self, parent: &str, child: &str) -> Option<&Relation> {
        self.relations
            .iter()
            .find(|r| r.parent_id == parent && r.child_id == child)
    }
}

fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

impl OrganizationFixture {
    /// Materialize streams and relations without touching storage.
    pub fn build(&self) -> (Vec<Stream>, Vec<Relation>) {
        let base = epoch();
        let streams: Vec<Stream> = self
            .streams
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let at = base + Duration::seconds(i as i64);
                Stream {
                    id: s.id.clone(),
                    organization_id: self.organization_id.clone(),
                    name: s.name.clone(),
                    description: s.description.clone(),
                    role: s.role,
                    type_tag: s.type_tag.clone(),
                    status: s.status,
                    config: s.config.clone(),
                    created_at: at,
                    updated_at: at,
                }
            })
            .collect();

        let offset = self.streams.len() as i64;
        let relations = self
            .relations
            .iter()
            .enumerate()
            .map(|(i, r)| Relation {
                id: format!("{}->{}", r.parent, r.child),
                parent_id: r.parent.clone(),
                child_id: r.child.clone(),
                relation_type: r.relation_type,
                inheritance: r.inheritance,
                active: true,
                created_by: Some("fixture".to_string()),
                created_at: base + Duration::seconds(offset + i as i64),
                deactivated_at: None,
            })
            .collect();

        (streams, relations)
    }

    /// Write every stream, then every relation, through `storage`.
    pub fn seed(&self, storage: &dyn IGraphStorage) -> StrataResult<SeededOrganization> {
        let (streams, relations) = self.build();
        for stream in &streams {
            storage.create_stream(stream)?;
        }
        for relation in &relations {
            storage.add_relation(relation)?;
        }
        Ok(SeededOrganization {
            organization_id: self.organization_id.clone(),
            streams: streams.into_iter().map(|s| (s.id.clone(), s)).collect(),
            relations,
        })
    }
}

/// Load `data/organizations/<name>.json`.
pub fn load_organization(name: &str) -> OrganizationFixture {
    crate::load_fixture(&format!("organizations/{name}.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_orders_timestamps_by_file_position() {
        let org = load_organization("diamond");
        let (streams, relations) = org.build();
        assert!(streams.windows(2).all(|w| w[0].created_at < w[1].created_at));
        assert!(relations.windows(2).all(|w| w[0].created_at < w[1].created_at));
        let last_stream = streams.last().map(|s| s.created_at);
        assert!(relations.first().map(|r| r.created_at) > last_stream);
    }

    #[test]
    fn defaults_fill_missing_fields() {
        let org: OrganizationFixture = serde_json::from_value(serde_json::json!({
            "organizationId": "org-x",
            "streams": [{ "id": "a", "name": "A" }]
        }))
        .unwrap();
        let (streams, relations) = org.build();
        assert_eq!(streams[0].type_tag, "STREAM");
        assert_eq!(streams[0].status, StreamStatus::Active);
        assert_eq!(streams[0].config, serde_json::json!({}));
        assert!(relations.is_empty());
    }
}
