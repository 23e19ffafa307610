use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(HeroId);

/// A single catalog entry. Only `id` and `name` are rendered by the bundled
/// front-end; everything else is carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Hero {
    pub id: HeroId,
    pub name: String,
    pub description: String,
    pub modified: Option<String>,
    pub thumbnail: HeroThumbnail,
    #[serde(rename = "resourceURI")]
    pub resource_uri: String,
    pub comics: HeroSubItems,
    pub events: HeroSubItems,
    pub series: HeroSubItems,
    pub stories: HeroSubItems,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeroThumbnail {
    pub path: String,
    pub extension: String,
}

impl HeroThumbnail {
    pub fn url(&self) -> Option<String> {
        if self.path.is_empty() {
            return None;
        }
        if self.extension.is_empty() {
            return Some(self.path.clone());
        }
        Some(format!("{}.{}", self.path, self.extension))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeroSubItems {
    pub available: u64,
    pub returned: u64,
    #[serde(rename = "collectionURI")]
    pub collection_uri: String,
    pub items: Vec<HeroSubItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeroSubItem {
    #[serde(rename = "resourceURI")]
    pub resource_uri: String,
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}
