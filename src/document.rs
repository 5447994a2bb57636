use log::debug;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::directory::Directory;
use crate::error::StandingsError;
use crate::model::{Competition, DirectoryEntity, value_to_string};

/// Parse a competition document as exported from the remote store.
///
/// `null` or an empty body is an empty competition. `teams`, `fixtures` and
/// `results` may be absent but must be arrays when present; records inside
/// them are read best-effort.
pub fn parse_competition_json(raw: &str) -> Result<Competition, StandingsError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Competition::default());
    }
    let root: Value = serde_json::from_str(trimmed).map_err(|err| StandingsError::Json {
        what: "competition",
        message: err.to_string(),
    })?;
    competition_from_value(&root)
}

pub fn competition_from_value(root: &Value) -> Result<Competition, StandingsError> {
    if root.is_null() {
        return Ok(Competition::default());
    }
    if !root.is_object() {
        return Err(StandingsError::InvalidInput {
            field: "competition",
            found: crate::error::json_kind(root),
        });
    }
    let field = |key: &str| root.get(key).unwrap_or(&Value::Null);

    Ok(Competition {
        id: value_to_string(field("id")).unwrap_or_default(),
        name: value_to_string(field("name")).unwrap_or_default(),
        teams: parse_items(array_field("teams", field("teams"), true)?, "team"),
        fixtures: parse_items(array_field("fixtures", field("fixtures"), true)?, "fixture"),
        results: parse_items(array_field("results", field("results"), true)?, "result"),
    })
}

/// Directory export: either a list of entities or an object whose values are
/// entities (keys are ignored and recomputed).
pub fn parse_directory_json(raw: &str) -> Result<Directory, StandingsError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Directory::default());
    }
    let root: Value = serde_json::from_str(trimmed).map_err(|err| StandingsError::Json {
        what: "directory",
        message: err.to_string(),
    })?;
    let entities: Vec<DirectoryEntity> = match &root {
        Value::Array(items) => parse_items(items, "directory entry"),
        Value::Object(map) => {
            let items: Vec<Value> = map.values().cloned().collect();
            parse_items(&items, "directory entry")
        }
        other => return Err(StandingsError::not_an_array("directory", other)),
    };
    Ok(Directory::from_entities(entities))
}

pub(crate) fn array_field<'a>(
    field: &'static str,
    value: &'a Value,
    allow_null: bool,
) -> Result<&'a [Value], StandingsError> {
    match value {
        Value::Array(items) => Ok(items.as_slice()),
        Value::Null if allow_null => Ok(&[]),
        other => Err(StandingsError::not_an_array(field, other)),
    }
}

pub(crate) fn parse_items<T: DeserializeOwned>(items: &[Value], what: &str) -> Vec<T> {
    items
        .iter()
        .filter_map(|item| match serde_json::from_value::<T>(item.clone()) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                debug!("{what} record skipped: {err}");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_is_empty() {
        let comp = parse_competition_json("null").expect("null should parse");
        assert!(comp.teams.is_empty());
        assert!(comp.results.is_empty());
        assert!(parse_directory_json("  ").expect("blank").is_empty());
    }

    #[test]
    fn missing_lists_are_empty() {
        let comp = parse_competition_json(r#"{"id":"premier","name":"Premier League"}"#)
            .expect("should parse");
        assert_eq!(comp.id, "premier");
        assert!(comp.fixtures.is_empty());
    }

    #[test]
    fn non_array_results_fail() {
        let err = parse_competition_json(r#"{"teams":[],"results":{"a":1}}"#)
            .expect_err("object results should fail");
        assert_eq!(
            err,
            StandingsError::InvalidInput {
                field: "results",
                found: "an object"
            }
        );
        assert_eq!(
            err.to_string(),
            "invalid input: `results` must be an array, found an object"
        );
    }

    #[test]
    fn non_object_record_is_skipped() {
        let comp = parse_competition_json(
            r#"{"teams":[{"id":1,"name":"A"},"garbage",{"id":2,"name":"B"}]}"#,
        )
        .expect("should parse");
        assert_eq!(comp.teams.len(), 2);
    }

    #[test]
    fn numeric_competition_id_is_read() {
        let comp = parse_competition_json(r#"{"id":12}"#).expect("should parse");
        assert_eq!(comp.id, "12");
    }

    #[test]
    fn broken_json_is_reported() {
        let err = parse_competition_json("{").expect_err("broken json");
        assert!(matches!(err, StandingsError::Json { what: "competition", .. }));
    }

    #[test]
    fn directory_object_form() {
        let dir = parse_directory_json(
            r#"{"x":{"name":"Royal Leopards","teamId":3,"competitionId":"premier"}}"#,
        )
        .expect("should parse");
        assert_eq!(dir.resolve("royal leopards").and_then(|e| e.team_id), Some(3));
        assert!(parse_directory_json("42").is_err());
    }
}
