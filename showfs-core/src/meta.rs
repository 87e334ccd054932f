//! Persistent per-object metadata record (the sidecar).
//!
//! The record is an opaque serde structure; the core only round-trips the
//! fields declared here and never invents new ones.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Image information section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImgInfo {
    pub width: i32,
    pub height: i32,
}

/// Numeric sequence section (`plate.1001.exr` .. `plate.1100.exr`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Seq {
    pub base_name: String,
    pub first: i32,
    pub last: i32,
}

/// Contract section: the object selector a contract object delivers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contract {
    pub pattern: String,
}

/// Metadata persisted in an object's sidecar file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistentMeta {
    /// Show-relative reference to the prototype this object was made from
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "empty_as_none"
    )]
    pub proto: Option<String>,
    /// Show-relative references to objects made from this one
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub instances: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub user_data: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_show_root: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub img_info: Option<ImgInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seq: Option<Seq>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract: Option<Contract>,
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

impl PersistentMeta {
    /// Decode a sidecar record
    pub fn decode(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Encode the record for writing to disk
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(self)
    }

    /// Add an instance reference; returns false if it was already present.
    pub fn add_instance(&mut self, reference: &str) -> bool {
        if self.instances.iter().any(|i| i == reference) {
            return false;
        }
        self.instances.push(reference.to_string());
        true
    }

    /// Remove an instance reference; returns false if it was not present.
    pub fn remove_instance(&mut self, reference: &str) -> bool {
        let before = self.instances.len();
        self.instances.retain(|i| i != reference);
        self.instances.len() != before
    }

    /// Case-insensitive user data lookup
    pub fn user_value(&self, key: &str) -> Option<&str> {
        self.user_key(key)
            .and_then(|k| self.user_data.get(k))
            .map(String::as_str)
    }

    /// Set a user data entry, replacing an entry whose key differs only in case.
    pub fn set_user(&mut self, key: &str, value: &str) {
        if let Some(existing) = self.user_key(key).map(str::to_string) {
            self.user_data.remove(&existing);
        }
        self.user_data.insert(key.to_string(), value.to_string());
    }

    /// Remove a user data entry (case-insensitive); returns the removed value.
    pub fn remove_user(&mut self, key: &str) -> Option<String> {
        let existing = self.user_key(key)?.to_string();
        self.user_data.remove(&existing)
    }

    fn user_key(&self, key: &str) -> Option<&str> {
        self.user_data
            .keys()
            .find(|k| k.eq_ignore_ascii_case(key) || k.to_lowercase() == key.to_lowercase())
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_record_encodes_to_empty_object() {
        let meta = PersistentMeta::default();
        let bytes = meta.encode().unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "{}");
    }

    #[test]
    fn test_decode_empty_proto_is_none() {
        let meta = PersistentMeta::decode(br#"{"proto": "", "is_show_root": true}"#).unwrap();
        assert_eq!(meta.proto, None);
        assert!(meta.is_show_root);
    }

    #[test]
    fn test_decode_full_record() {
        let json = br#"{
            "proto": "//.meta/proto/Default",
            "instances": ["//a", "//b"],
            "user_data": {"Width": "1920"},
            "img_info": {"width": 1920, "height": 1080},
            "seq": {"base_name": "plate", "first": 1001, "last": 1100}
        }"#;
        let meta = PersistentMeta::decode(json).unwrap();
        assert_eq!(meta.proto.as_deref(), Some("//.meta/proto/Default"));
        assert_eq!(meta.instances, vec!["//a", "//b"]);
        assert_eq!(meta.img_info, Some(ImgInfo { width: 1920, height: 1080 }));
        assert_eq!(meta.seq.as_ref().map(|s| s.last), Some(1100));
        assert!(!meta.is_show_root);

        let again = PersistentMeta::decode(&meta.encode().unwrap()).unwrap();
        assert_eq!(again, meta);
    }

    #[test]
    fn test_instances_have_no_duplicates() {
        let mut meta = PersistentMeta::default();
        assert!(meta.add_instance("//shot_010"));
        assert!(!meta.add_instance("//shot_010"));
        assert!(meta.add_instance("//shot_020"));
        assert_eq!(meta.instances.len(), 2);

        assert!(meta.remove_instance("//shot_010"));
        assert!(!meta.remove_instance("//shot_010"));
        assert_eq!(meta.instances, vec!["//shot_020"]);
    }

    #[test]
    fn test_user_data_is_case_insensitive() {
        let mut meta = PersistentMeta::default();
        meta.set_user("Width", "1920");
        assert_eq!(meta.user_value("width"), Some("1920"));
        assert_eq!(meta.user_value("WIDTH"), Some("1920"));

        meta.set_user("width", "2048");
        assert_eq!(meta.user_data.len(), 1);
        assert_eq!(meta.user_value("Width"), Some("2048"));

        assert_eq!(meta.remove_user("WIDTH"), Some("2048".to_string()));
        assert!(meta.user_data.is_empty());
    }
}
