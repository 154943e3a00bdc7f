//! ZIVPN configuration document model.
//!
//! Only `auth.config` is owned by this tool. Every other key, at the top
//! level and inside `auth`, is kept in the flattened `extra` maps, and
//! explicit nulls stay null, so a load/save cycle writes back what it read.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigDocument {
    /// Outer `None` when the key is absent, `Some(None)` for an explicit null.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub auth: Option<Option<AuthSection>>,

    /// Everything else, `server` included, written back exactly as read.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthSection {
    /// Accepted passwords, in display order.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub config: Option<Option<Vec<String>>>,

    /// `method`, `mode`, and any other auth settings.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Called only when the key exists, so a null lands as `Some(None)`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl ConfigDocument {
    fn auth_section(&self) -> Option<&AuthSection> {
        self.auth.as_ref().and_then(Option::as_ref)
    }

    /// Server settings, opaque to this tool.
    pub fn server(&self) -> Option<&Value> {
        self.extra.get("server")
    }

    /// Registered passwords, empty when the section is absent or null.
    pub fn credentials(&self) -> &[String] {
        self.auth_section()
            .and_then(|a| a.config.as_ref())
            .and_then(|c| c.as_deref())
            .unwrap_or(&[])
    }

    /// Mutable password list, creating `auth.config` on demand.
    pub fn credentials_mut(&mut self) -> &mut Vec<String> {
        self.auth
            .get_or_insert(None)
            .get_or_insert_with(AuthSection::default)
            .config
            .get_or_insert(None)
            .get_or_insert_with(Vec::new)
    }

    /// Auth method, falling back to the `mode` key the ZIVPN server writes.
    pub fn auth_method(&self) -> Option<&str> {
        let auth = self.auth_section()?;
        auth.extra
            .get("method")
            .and_then(Value::as_str)
            .or_else(|| auth.extra.get("mode").and_then(Value::as_str))
    }

    /// Listen address as shown on the dashboard.
    ///
    /// Looks at `server.listen`, then `server.port`, then a top-level `listen`.
    pub fn listen_address(&self) -> Option<String> {
        if let Some(server) = self.server().and_then(Value::as_object) {
            if let Some(listen) = server.get("listen").and_then(Value::as_str) {
                return Some(listen.to_string());
            }
            if let Some(port) = server.get("port") {
                return match port {
                    Value::String(s) => Some(format!(":{}", s)),
                    Value::Number(n) => Some(format!(":{}", n)),
                    _ => None,
                };
            }
        }
        self.extra
            .get("listen")
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    /// Top-level keys in the order they are written.
    pub fn top_level_keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        if self.auth.is_some() {
            keys.push("auth".to_string());
        }
        keys.extend(self.extra.keys().cloned());
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_absent_is_empty() {
        let doc: ConfigDocument = serde_json::from_str(r#"{"listen": ":5667"}"#).unwrap();
        assert!(doc.credentials().is_empty());
        assert_eq!(doc.listen_address().as_deref(), Some(":5667"));
    }

    #[test]
    fn test_credentials_mut_creates_section() {
        let mut doc = ConfigDocument::default();
        doc.credentials_mut().push("alpha".into());
        assert_eq!(doc.credentials(), ["alpha"]);
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["auth"]["config"][0], "alpha");
    }

    #[test]
    fn test_unknown_keys_kept() {
        let raw = r#"{
            "server": {"port": 5667, "protocol": "udp"},
            "auth": {"mode": "passwords", "config": ["zi"], "ttl": 3},
            "obfs": "zivpn",
            "cert": "/etc/zivpn/zivpn.crt"
        }"#;
        let doc: ConfigDocument = serde_json::from_str(raw).unwrap();
        assert_eq!(doc.auth_method(), Some("passwords"));
        assert_eq!(doc.listen_address().as_deref(), Some(":5667"));
        assert_eq!(doc.extra.get("obfs").and_then(Value::as_str), Some("zivpn"));

        let back: Value = serde_json::to_value(&doc).unwrap();
        let orig: Value = serde_json::from_str(raw).unwrap();
        assert_eq!(back, orig);
    }

    #[test]
    fn test_top_level_keys() {
        let raw = r#"{"listen": ":1", "auth": {"config": []}, "obfs": "x"}"#;
        let doc: ConfigDocument = serde_json::from_str(raw).unwrap();
        assert_eq!(doc.top_level_keys(), vec!["auth", "listen", "obfs"]);
    }

    #[test]
    fn test_nulls_and_opaque_server_kept() {
        let raw = r#"{"server": "udp", "auth": {"method": null, "config": null}, "obfs": null}"#;
        let doc: ConfigDocument = serde_json::from_str(raw).unwrap();
        assert!(doc.credentials().is_empty());
        assert_eq!(doc.auth_method(), None);
        assert_eq!(doc.listen_address(), None);
        assert_eq!(doc.server(), Some(&Value::from("udp")));

        let back = serde_json::to_value(&doc).unwrap();
        let orig: Value = serde_json::from_str(raw).unwrap();
        assert_eq!(back, orig);
    }

    #[test]
    fn test_null_auth_is_kept_until_written() {
        let mut doc: ConfigDocument = serde_json::from_str(r#"{"auth": null}"#).unwrap();
        assert_eq!(doc.auth, Some(None));
        assert_eq!(serde_json::to_string(&doc).unwrap(), r#"{"auth":null}"#);

        doc.credentials_mut().push("alpha".into());
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["auth"]["config"], serde_json::json!(["alpha"]));
    }
}
