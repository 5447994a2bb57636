use std::collections::HashMap;

use crate::model::{Competition, DirectoryEntity, MatchResult};
use crate::normalize::normalize;

/// Look a raw team name up in a normalized-name map.
pub fn resolve<'a>(
    name: &str,
    directory: &'a HashMap<String, DirectoryEntity>,
) -> Option<&'a DirectoryEntity> {
    directory.get(&normalize(name))
}

/// Read-only cross-competition lookup of team identity, keyed by normalized
/// name. Built once per page/session and shared by reference.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    entries: HashMap<String, DirectoryEntity>,
}

impl Directory {
    /// First entity seen for a normalized name wins.
    pub fn from_entities(entities: impl IntoIterator<Item = DirectoryEntity>) -> Self {
        let mut entries: HashMap<String, DirectoryEntity> = HashMap::new();
        for entity in entities {
            let key = normalize(&entity.name);
            if key.is_empty() {
                continue;
            }
            entries.entry(key).or_insert(entity);
        }
        Self { entries }
    }

    /// Build entries from competition rosters. Earlier competitions own a name,
    /// so pass the league before cups.
    pub fn from_competitions(competitions: &[Competition]) -> Self {
        let entities = competitions.iter().flat_map(|comp| {
            let competition_id = non_empty(&comp.id);
            comp.teams.iter().map(move |team| DirectoryEntity {
                name: team.name.clone(),
                crest_url: team.crest_url.clone(),
                team_id: Some(team.id),
                competition_id: competition_id.clone(),
            })
        });
        Self::from_entities(entities)
    }

    pub fn resolve(&self, name: &str) -> Option<&DirectoryEntity> {
        resolve(name, &self.entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn as_map(&self) -> &HashMap<String, DirectoryEntity> {
        &self.entries
    }
}

impl From<HashMap<String, DirectoryEntity>> for Directory {
    fn from(entries: HashMap<String, DirectoryEntity>) -> Self {
        // Keys may come from an older normalizer; re-key to stay consistent.
        Self::from_entities(entries.into_values())
    }
}

/// Crest to show for a team: its own roster crest, else the directory one.
pub fn crest_for<'a>(
    name: &str,
    own_crest: Option<&'a str>,
    directory: &'a Directory,
) -> Option<&'a str> {
    own_crest
        .filter(|url| !url.trim().is_empty())
        .or_else(|| directory.resolve(name)?.crest_url.as_deref())
}

/// Directory entries for both sides of a fixture card.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchLinks<'a> {
    pub team_a: Option<&'a DirectoryEntity>,
    pub team_b: Option<&'a DirectoryEntity>,
}

pub fn link_match<'a>(fixture: &MatchResult, directory: &'a Directory) -> MatchLinks<'a> {
    MatchLinks {
        team_a: directory.resolve(&fixture.team_a),
        team_b: directory.resolve(&fixture.team_b),
    }
}

fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
