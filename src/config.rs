use serde::{Deserialize, Serialize};

/// Id of the element the admin page mounts into.
pub const MOUNT_ID: &str = "hunt-admin";
/// Id of the `<script type="application/json">` element holding the page snapshot.
pub const BOOTSTRAP_ID: &str = "hunt-bootstrap";
/// Class marking host page elements whose raw timestamp should be reformatted.
pub const RAW_TIME_CLASS: &str = "uglytime";

/// Page settings. Every field has a default so the server only needs to send what differs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Prefix for the backend routes. Empty means same origin.
    pub api_base: String,
    /// Where the batch creation form is submitted.
    pub form_action: String,
    pub slow_ms: u32,
    pub fast_ms: u32,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            form_action: String::new(),
            slow_ms: 600,
            fast_ms: 200,
        }
    }
}

/// Animation speed for showing or hiding a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speed {
    Instant,
    Fast,
    Slow,
}

impl AdminConfig {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base.trim_end_matches('/'), path)
    }

    pub fn duration_ms(&self, speed: Speed) -> u32 {
        match speed {
            Speed::Instant => 0,
            Speed::Fast => self.fast_ms,
            Speed::Slow => self.slow_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_base_and_path() {
        let mut config = AdminConfig::default();
        assert_eq!(config.url("/new_item"), "/new_item");

        config.api_base = "https://hunts.example.com/".to_string();
        assert_eq!(config.url("/edit_hunt/3"), "https://hunts.example.com/edit_hunt/3");
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: AdminConfig = serde_json::from_str(r#"{"fast_ms": 50}"#).unwrap();
        assert_eq!(config.duration_ms(Speed::Fast), 50);
        assert_eq!(config.duration_ms(Speed::Slow), 600);
        assert_eq!(config.api_base, "");
    }
}
