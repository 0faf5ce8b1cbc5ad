//! Detection of `@agent` references in comment text.

use super::AgentRoster;

/// Finds roster agents referenced as `@Name` in free text.
///
/// Matching ignores case. When several roster names share a prefix the
/// longest one wins, so `@Code Reviewer` never resolves to a shorter
/// `@Code` entry.
#[derive(Debug, Clone)]
pub struct MentionScanner {
    names: Vec<(String, String)>,
}

impl MentionScanner {
    /// Builds a scanner for every agent in the roster.
    #[must_use]
    pub fn new(roster: &AgentRoster) -> Self {
        let mut names: Vec<(String, String)> = roster
            .agents()
            .iter()
            .map(|agent| (agent.name().to_lowercase(), agent.name().to_owned()))
            .collect();
        names.sort_by(|left, right| right.0.chars().count().cmp(&left.0.chars().count()));
        Self { names }
    }

    /// Returns the distinct agents mentioned in `content`, in order of first
    /// appearance, using their canonical roster spelling.
    #[must_use]
    pub fn scan(&self, content: &str) -> Vec<String> {
        let mut found: Vec<String> = Vec::new();
        for (at, _) in content.match_indices('@') {
            let Some(rest) = content.get(at + 1..) else {
                continue;
            };
            let Some(canonical) = self.match_at(rest) else {
                continue;
            };
            if !found.iter().any(|name| name == canonical) {
                found.push(canonical.to_owned());
            }
        }
        found
    }

    fn match_at(&self, rest: &str) -> Option<&str> {
        self.names.iter().find_map(|(lowered, canonical)| {
            let width = lowered.chars().count();
            let end = rest
                .char_indices()
                .nth(width)
                .map_or(rest.len(), |(index, _)| index);
            let candidate = rest.get(..end)?;
            (candidate.chars().count() == width && candidate.to_lowercase() == *lowered)
                .then_some(canonical.as_str())
        })
    }
}
