use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiNode {
    pub id: String,
    #[serde(default, deserialize_with = "lenient_label")]
    pub label: String,
    // kept raw; coercion into closed enums happens in the viewer transform
    #[serde(default, rename = "type", deserialize_with = "lenient_string")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub risk: Option<String>,
    #[serde(default, rename = "createdAt", deserialize_with = "lenient_string")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiEdge {
    pub source: String,
    pub target: String,
    #[serde(default, rename = "relationType", deserialize_with = "lenient_string")]
    pub relation_type: Option<String>,
    /// Position in the response's `edges` array, counting records that were
    /// skipped. Set by payload decoding; edge ids are derived from it.
    #[serde(skip)]
    pub index: Option<usize>,
}

/// Body returned by every graph endpoint.
///
/// `nodes`/`edges` that are missing, `null`, or not arrays decode as empty,
/// and individual records that don't fit the shape are skipped.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GraphPayload {
    #[serde(default, deserialize_with = "lenient_vec")]
    pub nodes: Vec<ApiNode>,
    #[serde(default, deserialize_with = "lenient_edges")]
    pub edges: Vec<ApiEdge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cypher: Option<String>,
}

fn lenient_vec<'de, D, T>(de: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = serde_json::Value::deserialize(de)?;
    let serde_json::Value::Array(items) = value else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

fn lenient_edges<'de, D>(de: D) -> Result<Vec<ApiEdge>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(de)?;
    let serde_json::Value::Array(items) = value else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .enumerate()
        .filter_map(|(i, item)| {
            let mut edge: ApiEdge = serde_json::from_value(item).ok()?;
            edge.index = Some(i);
            Some(edge)
        })
        .collect())
}

fn lenient_label<'de, D>(de: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_string(de)?.unwrap_or_default())
}

// Non-string values (numbers, objects) read as absent.
fn lenient_string<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(de)? {
        serde_json::Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

/// Error body a non-2xx response may carry.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImpactRequest {
    pub field_name: String,
    #[serde(rename = "curriculumId", skip_serializing_if = "Option::is_none")]
    pub curriculum_id: Option<String>,
}

/// Shared by the natural-language ask and the raw query endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryRequest {
    pub query: String,
    #[serde(rename = "curriculumId", skip_serializing_if = "Option::is_none")]
    pub curriculum_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum RequestBody {
    Impact(ImpactRequest),
    Query(QueryRequest),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_tolerates_missing_and_non_array_fields() {
        let p: GraphPayload = serde_json::from_str(r#"{"nodes": null}"#).unwrap();
        assert!(p.nodes.is_empty());
        assert!(p.edges.is_empty());
        assert!(p.cypher.is_none());

        let p: GraphPayload =
            serde_json::from_str(r#"{"nodes": {"id": "x"}, "edges": 3, "cypher": "MATCH (n)"}"#)
                .unwrap();
        assert!(p.nodes.is_empty());
        assert!(p.edges.is_empty());
        assert_eq!(p.cypher.as_deref(), Some("MATCH (n)"));
    }

    #[test]
    fn payload_skips_records_without_required_fields() {
        let body = r#"{
            "nodes": [{"id": "Account.Status", "label": "Status", "type": "Field"}, {"label": "no id"}],
            "edges": [{"source": "a", "target": "b", "relationType": "CALLS"}, {"source": "a"}]
        }"#;
        let p: GraphPayload = serde_json::from_str(body).unwrap();
        assert_eq!(p.nodes.len(), 1);
        assert_eq!(p.nodes[0].kind.as_deref(), Some("Field"));
        assert_eq!(p.edges.len(), 1);
        assert_eq!(p.edges[0].relation_type.as_deref(), Some("CALLS"));
    }

    #[test]
    fn wrongly_typed_optional_fields_keep_the_record() {
        let body = r#"{
            "nodes": [
                {"id": "Account.Status", "label": null, "type": "Field"},
                {"id": "Handler", "label": 42, "type": "Apex"}
            ],
            "edges": [
                {"source": "Account.Status", "target": "Handler", "relationType": 7},
                {"source": "Handler", "target": "Account.Status", "relationType": "CALLS"}
            ]
        }"#;
        let p: GraphPayload = serde_json::from_str(body).unwrap();
        let ids: Vec<_> = p.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["Account.Status", "Handler"]);
        assert_eq!(p.nodes[0].label, "");
        assert_eq!(p.nodes[1].label, "");
        assert_eq!(p.edges.len(), 2);
        assert_eq!(p.edges[0].relation_type, None);
        assert_eq!(p.edges[1].relation_type.as_deref(), Some("CALLS"));
    }

    #[test]
    fn skipped_edges_keep_their_slot() {
        let body = r#"{"edges": [
            {"source": "a"},
            "junk",
            {"source": "a", "target": "b"}
        ]}"#;
        let p: GraphPayload = serde_json::from_str(body).unwrap();
        assert_eq!(p.edges.len(), 1);
        assert_eq!(p.edges[0].index, Some(2));
    }

    #[test]
    fn non_string_classification_reads_as_absent() {
        let n: ApiNode =
            serde_json::from_str(r#"{"id": "a", "label": "A", "type": 7, "risk": null, "createdAt": {}}"#)
                .unwrap();
        assert_eq!(n.kind, None);
        assert_eq!(n.risk, None);
        assert_eq!(n.created_at, None);
    }

    #[test]
    fn request_bodies_use_backend_field_names() {
        let body = RequestBody::Impact(ImpactRequest {
            field_name: "Account.Status".into(),
            curriculum_id: Some("ctx-1".into()),
        });
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v["field_name"], "Account.Status");
        assert_eq!(v["curriculumId"], "ctx-1");

        let body = RequestBody::Query(QueryRequest {
            query: "MATCH (f:Field) RETURN f".into(),
            curriculum_id: None,
        });
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v["query"], "MATCH (f:Field) RETURN f");
        assert!(v.get("curriculumId").is_none());
    }
}
