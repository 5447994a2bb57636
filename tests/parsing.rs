use std::fs;
use std::path::PathBuf;

use football_eswatini::directory::{Directory, crest_for, link_match};
use football_eswatini::document::{parse_competition_json, parse_directory_json};
use football_eswatini::model::MatchStatus;
use football_eswatini::standings::{StandingsOptions, recalculate};
use football_eswatini::{StandingsError, persist};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_competition_fixture() {
    let comp = parse_competition_json(&read_fixture("premier_league.json"))
        .expect("fixture should parse");
    assert_eq!(comp.id, "premier-league");
    assert_eq!(comp.teams.len(), 6);
    assert_eq!(comp.results.len(), 8);
    assert_eq!(comp.fixtures.len(), 7);

    // Blank crest is no crest.
    assert!(comp.teams[1].crest_url.is_none());

    let r3 = &comp.results[2];
    assert_eq!(r3.status, MatchStatus::Finished);
    assert_eq!(r3.scores(), Some((1, 3)));
    assert_eq!(r3.matchday.as_deref(), Some("1"));

    let live = &comp.fixtures[2];
    assert_eq!(live.status, MatchStatus::Live);
    assert_eq!(live.live_minute, Some(34));
}

#[test]
fn directory_fixture_first_entry_wins() {
    let dir = parse_directory_json(&read_fixture("directory.json")).expect("fixture should parse");
    assert_eq!(dir.len(), 3);
    let swallows = dir.resolve("MBABANE SWALLOWS").expect("swallows");
    assert_eq!(swallows.team_id, Some(1));
}

#[test]
fn fixture_cards_link_across_competitions() {
    let comp = parse_competition_json(&read_fixture("premier_league.json"))
        .expect("fixture should parse");
    let dir = parse_directory_json(&read_fixture("directory.json")).expect("fixture should parse");

    let r7 = comp
        .results
        .iter()
        .find(|m| m.id.as_deref() == Some("r7"))
        .expect("r7");
    let links = link_match(r7, &dir);
    let select = links.team_a.expect("cup side should resolve");
    assert_eq!(select.competition_id.as_deref(), Some("ingwenyama-cup"));
    assert!(links.team_b.is_none());

    let leopards = &comp.teams[1];
    assert_eq!(
        crest_for(&leopards.name, leopards.crest_url.as_deref(), &dir),
        Some("https://cdn.example/crests/leopards.png")
    );
}

#[test]
fn roster_directory_from_competition() {
    let comp = parse_competition_json(&read_fixture("premier_league.json"))
        .expect("fixture should parse");
    let dir = Directory::from_competitions(std::slice::from_ref(&comp));
    assert_eq!(dir.len(), 6);
    let mamba = dir.resolve("green mamba").expect("mamba");
    assert_eq!(mamba.team_id, Some(4));
    assert_eq!(mamba.competition_id.as_deref(), Some("premier-league"));
}

#[test]
fn structural_errors_are_typed() {
    let err = parse_competition_json(r#"{"teams":"Mbabane Swallows"}"#)
        .expect_err("string roster should fail");
    assert_eq!(
        err,
        StandingsError::InvalidInput {
            field: "teams",
            found: "a string"
        }
    );
    assert!(parse_competition_json("[1,2]").is_err());
}

#[test]
fn snapshot_round_trip_gives_position_changes() {
    let mut dir = std::env::temp_dir();
    dir.push(format!("football_eswatini_snapshot_{}", std::process::id()));
    let path = persist::snapshot_path(Some(&dir)).expect("path");
    let _ = fs::remove_file(&path);

    let mut comp = parse_competition_json(&read_fixture("premier_league.json"))
        .expect("fixture should parse");
    let opts = StandingsOptions::default();

    assert!(persist::load_previous(&path, &comp.id).is_empty());
    let first = recalculate(&comp, &[], &opts);
    persist::save_table(&path, &comp.id, &first).expect("save should work");

    let previous = persist::load_previous(&path, &comp.id);
    assert_eq!(previous.len(), first.len());
    assert!(previous.iter().all(|t| t.position_change.is_none()));
    assert!(persist::load_previous(&path, "ingwenyama-cup").is_empty());

    comp.results.retain(|m| m.id.as_deref() != Some("r6"));
    let second = recalculate(&comp, &previous, &opts);
    assert!(second.iter().all(|t| t.position_change.is_some()));

    fs::write(&path, "{ not json").expect("overwrite");
    assert!(persist::load_previous(&path, &comp.id).is_empty());
    let _ = fs::remove_dir_all(&dir);
}
