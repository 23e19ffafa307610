use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::Hero;

/// Envelope returned by the paged catalog endpoint.
///
/// Only `data.results` and `data.total` carry meaning for pagination; all
/// other fields are kept so callers can render attribution or reuse the etag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub data: ResponseData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribution_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseData {
    pub results: Vec<Hero>,
    pub total: u64,
    #[serde(default)]
    pub offset: i64,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub count: u64,
}

impl ResponseEnvelope {
    pub fn from_results(results: Vec<Hero>, total: u64) -> Self {
        let count = results.len() as u64;
        Self {
            data: ResponseData {
                results,
                total,
                count,
                ..ResponseData::default()
            },
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_unknown_envelope_fields() {
        let raw = r#"{
            "code": 200,
            "status": "Ok",
            "copyright": "(c) catalog",
            "attributionText": "Data provided by the catalog",
            "etag": "abc",
            "data": {
                "offset": 20,
                "limit": 10,
                "total": 1562,
                "count": 1,
                "results": [{"id": 1011334, "name": "3-D Man", "thumbnail": {"path": "http://i.example/3dman", "extension": "jpg"}}]
            }
        }"#;
        let envelope: ResponseEnvelope = serde_json::from_str(raw).expect("decode");
        assert_eq!(envelope.data.total, 1562);
        assert_eq!(envelope.data.offset, 20);
        assert_eq!(envelope.data.results[0].name, "3-D Man");
        assert_eq!(
            envelope.data.results[0].thumbnail.url().as_deref(),
            Some("http://i.example/3dman.jpg")
        );
        assert_eq!(
            envelope.extra.get("copyright"),
            Some(&Value::String("(c) catalog".into()))
        );
    }

    #[test]
    fn envelope_without_data_is_rejected() {
        assert!(serde_json::from_str::<ResponseEnvelope>(r#"{"code":200}"#).is_err());
    }
}
