use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::AdminConfig;

/// Who may join a hunt. The wire form is the snake_case name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantRule {
    #[default]
    Anyone,
    ByDomain,
    ByWhitelist,
}

impl ParticipantRule {
    pub const ALL: [ParticipantRule; 3] = [
        ParticipantRule::Anyone,
        ParticipantRule::ByDomain,
        ParticipantRule::ByWhitelist,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ParticipantRule::Anyone => "anyone",
            ParticipantRule::ByDomain => "by_domain",
            ParticipantRule::ByWhitelist => "by_whitelist",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ParticipantRule::Anyone => "Anyone",
            ParticipantRule::ByDomain => "Same email domain",
            ParticipantRule::ByWhitelist => "Invited participants only",
        }
    }
}

impl fmt::Display for ParticipantRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRule(pub String);

impl fmt::Display for UnknownRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown participant rule: {}", self.0)
    }
}

impl FromStr for ParticipantRule {
    type Err = UnknownRule;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ParticipantRule::ALL
            .into_iter()
            .find(|rule| rule.as_str() == s)
            .ok_or_else(|| UnknownRule(s.to_string()))
    }
}

/// The hunt fields that can be edited in place once a hunt exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HuntField {
    Name,
    WelcomeMessage,
    CongratulationsMessage,
    ParticipantRule,
}

impl HuntField {
    /// The form field name used both by the page and by `/edit_hunt`.
    pub fn form_name(self) -> &'static str {
        match self {
            HuntField::Name => "name",
            HuntField::WelcomeMessage => "welcome_message",
            HuntField::CongratulationsMessage => "congratulations_message",
            HuntField::ParticipantRule => "participant_rule",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub item_id: i32,
    pub name: String,
    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub email: String,
}

/// Initial state of the admin page as rendered by the server. A snapshot without a `hunt_id`
/// describes the creation form for a new hunt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HuntSnapshot {
    pub hunt_id: Option<i32>,
    pub name: String,
    pub welcome_message: String,
    pub congratulations_message: String,
    pub participant_rule: ParticipantRule,
    pub all_required: bool,
    pub num_required: Option<u32>,
    pub created_at: Option<String>,
    pub items: Vec<Item>,
    pub participants: Vec<Participant>,
    pub config: AdminConfig,
}

impl HuntSnapshot {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}
