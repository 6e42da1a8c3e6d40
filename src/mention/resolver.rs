use crate::mention::mapping::MentionMapping;
use crate::mention::scanner::{PlaceholderToken, tokenize};
use serde::Serialize;
use std::collections::BTreeMap;

/// Always resolves to a channel-wide notification, whatever the mapping says.
const HERE: &str = "here";
const HERE_MENTION: &str = "<!here>";

/// What happened to the placeholders of one message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionSummary {
    /// Name to number of substitutions, ordered by name
    pub replacements: BTreeMap<String, usize>,
    /// Literal placeholders with no mapping, first appearance order, no duplicates
    pub unresolved: Vec<String>,
    pub total_replacements: usize,
    pub had_placeholders: bool,
}

impl ResolutionSummary {
    fn record_replacement(&mut self, name: &str) {
        *self.replacements.entry(name.to_string()).or_insert(0) += 1;
        self.total_replacements += 1;
    }

    fn record_unresolved(&mut self, literal: &str) {
        if !self.unresolved.iter().any(|u| u == literal) {
            self.unresolved.push(literal.to_string());
        }
    }

    /// Human-readable lines describing the resolution
    ///
    /// ```text
    /// Replacements: alice=1, team=1 (total=2)
    /// Unresolved: none
    /// ```
    pub fn lines(&self) -> Vec<String> {
        if !self.had_placeholders {
            return vec!["Placeholders: none".to_string()];
        }

        let mut lines = Vec::with_capacity(2);
        if self.total_replacements > 0 {
            let pairs = self
                .replacements
                .iter()
                .map(|(name, count)| format!("{name}={count}"))
                .collect::<Vec<_>>()
                .join(", ");
            lines.push(format!(
                "Replacements: {} (total={})",
                pairs, self.total_replacements
            ));
        }

        if self.unresolved.is_empty() {
            lines.push("Unresolved: none".to_string());
        } else {
            lines.push(format!("Unresolved: {}", self.unresolved.join(", ")));
        }

        lines
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub text: String,
    pub summary: ResolutionSummary,
}

fn replacement_for(token: &PlaceholderToken, mapping: &MentionMapping) -> Option<String> {
    if token.name == HERE {
        return Some(HERE_MENTION.to_string());
    }
    mapping.get(&token.name).map(|entry| entry.to_slack())
}

/// Replace `@name` and `@{name}` placeholders with Slack mention syntax.
///
/// Never fails: anything that isn't a well-formed placeholder, or has no
/// mapping entry, is kept as written.
pub fn resolve(text: &str, mapping: &MentionMapping) -> Resolution {
    if !text.contains('@') {
        return Resolution {
            text: text.to_string(),
            summary: ResolutionSummary::default(),
        };
    }

    let tokens = tokenize(text);
    let mut summary = ResolutionSummary {
        had_placeholders: !tokens.is_empty(),
        ..Default::default()
    };

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for token in &tokens {
        out.push_str(&text[cursor..token.start]);
        match replacement_for(token, mapping) {
            Some(mention) => {
                out.push_str(&mention);
                summary.record_replacement(&token.name);
            }
            None => {
                out.push_str(&token.original);
                summary.record_unresolved(&token.original);
            }
        }
        cursor = token.end;
    }
    out.push_str(&text[cursor..]);

    Resolution { text: out, summary }
}
