//! Mention mapping: placeholder name to Slack user or user-group id.

use crate::error::{BroadcastError, Result};
use serde::de::{self, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// What a mapped id refers to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MentionKind {
    #[default]
    User,
    /// A Slack user group, mentioned as `<!subteam^ID>`
    Team,
}

impl MentionKind {
    /// Anything other than `team` is treated as a user.
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        match raw {
            Some("team") => MentionKind::Team,
            _ => MentionKind::User,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MentionEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: MentionKind,
}

impl MentionEntry {
    pub fn user(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: MentionKind::User,
        }
    }

    pub fn team(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: MentionKind::Team,
        }
    }

    /// Slack mention syntax for this entry
    pub fn to_slack(&self) -> String {
        match self.kind {
            MentionKind::User => format!("<@{}>", self.id),
            MentionKind::Team => format!("<!subteam^{}>", self.id),
        }
    }
}

/// The two shapes accepted in configuration: `alice: U123` or
/// `alice: { id: U123, type: user }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawMention {
    Id(String),
    Entry {
        id: String,
        #[serde(default, rename = "type")]
        kind: Option<String>,
    },
}

impl From<RawMention> for MentionEntry {
    fn from(raw: RawMention) -> Self {
        match raw {
            RawMention::Id(id) => MentionEntry::user(id),
            RawMention::Entry { id, kind } => MentionEntry {
                id,
                kind: MentionKind::parse_lenient(kind.as_deref()),
            },
        }
    }
}

/// Name to entry lookup. Keys are case-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MentionMapping {
    entries: HashMap<String, MentionEntry>,
}

impl MentionMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later inserts for the same name replace earlier ones.
    pub fn insert(&mut self, name: impl Into<String>, entry: MentionEntry) {
        self.entries.insert(name.into(), entry);
    }

    pub fn get(&self, name: &str) -> Option<&MentionEntry> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, MentionEntry)> for MentionMapping {
    fn from_iter<I: IntoIterator<Item = (String, MentionEntry)>>(iter: I) -> Self {
        let mut mapping = MentionMapping::new();
        for (name, entry) in iter {
            mapping.insert(name, entry);
        }
        mapping
    }
}

impl<'de> Deserialize<'de> for MentionMapping {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct MappingVisitor;

        impl<'de> Visitor<'de> for MappingVisitor {
            type Value = MentionMapping;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of mention names to ids or {id, type} entries")
            }

            fn visit_map<A>(self, mut access: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut mapping = MentionMapping::new();
                while let Some((name, raw)) = access.next_entry::<String, RawMention>()? {
                    if name.is_empty() {
                        return Err(de::Error::custom("mention name must not be empty"));
                    }
                    mapping.insert(name, raw.into());
                }
                Ok(mapping)
            }
        }

        deserializer.deserialize_map(MappingVisitor)
    }
}

/// The `mentions` block as written, entries in document order.
///
/// Normalization is deferred to [`RawMentions::normalize`] so that a broken
/// block only disables mention resolution. Repeated names are kept here and
/// collapse to the last one when normalized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawMentions {
    entries: Vec<(serde_yaml::Value, serde_yaml::Value)>,
    malformed: Option<String>,
}

impl RawMentions {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.malformed.is_none()
    }

    pub fn normalize(&self) -> Result<MentionMapping> {
        if let Some(reason) = &self.malformed {
            return Err(BroadcastError::Mapping(reason.clone()));
        }

        let mut mapping = MentionMapping::new();
        for (key, value) in &self.entries {
            let name = key.as_str().ok_or_else(|| {
                BroadcastError::Mapping(format!("mention name must be a string, got {key:?}"))
            })?;
            if name.is_empty() {
                return Err(BroadcastError::Mapping(
                    "mention name must not be empty".to_string(),
                ));
            }
            let raw: RawMention = serde_yaml::from_value(value.clone())
                .map_err(|e| BroadcastError::Mapping(format!("mention {name}: {e}")))?;
            mapping.insert(name, raw.into());
        }
        Ok(mapping)
    }

    fn not_a_map(found: &str) -> Self {
        Self {
            entries: Vec::new(),
            malformed: Some(format!("mentions must be a map, found {found}")),
        }
    }
}

impl<'de> Deserialize<'de> for RawMentions {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RawVisitor;

        impl<'de> Visitor<'de> for RawVisitor {
            type Value = RawMentions;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a mentions block")
            }

            fn visit_map<A>(self, mut access: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::new();
                while let Some(entry) =
                    access.next_entry::<serde_yaml::Value, serde_yaml::Value>()?
                {
                    entries.push(entry);
                }
                Ok(RawMentions {
                    entries,
                    malformed: None,
                })
            }

            fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                while seq.next_element::<IgnoredAny>()?.is_some() {}
                Ok(RawMentions::not_a_map("a list"))
            }

            fn visit_unit<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
                Ok(RawMentions::default())
            }

            fn visit_none<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
                Ok(RawMentions::default())
            }

            fn visit_some<D>(self, deserializer: D) -> std::result::Result<Self::Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                RawMentions::deserialize(deserializer)
            }

            fn visit_bool<E: de::Error>(self, _: bool) -> std::result::Result<Self::Value, E> {
                Ok(RawMentions::not_a_map("a boolean"))
            }

            fn visit_i64<E: de::Error>(self, _: i64) -> std::result::Result<Self::Value, E> {
                Ok(RawMentions::not_a_map("a number"))
            }

            fn visit_u64<E: de::Error>(self, _: u64) -> std::result::Result<Self::Value, E> {
                Ok(RawMentions::not_a_map("a number"))
            }

            fn visit_f64<E: de::Error>(self, _: f64) -> std::result::Result<Self::Value, E> {
                Ok(RawMentions::not_a_map("a number"))
            }

            fn visit_str<E: de::Error>(self, _: &str) -> std::result::Result<Self::Value, E> {
                Ok(RawMentions::not_a_map("a string"))
            }
        }

        deserializer.deserialize_any(RawVisitor)
    }
}
