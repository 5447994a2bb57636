use std::cmp::Ordering;
use std::collections::HashMap;

use log::debug;
use serde_json::Value;

use crate::config::AppConfig;
use crate::document::{array_field, parse_items};
use crate::error::StandingsError;
use crate::fixtures::kickoff_timestamp;
use crate::model::{Competition, MatchResult, Outcome, PositionChange, Team, TeamStats};
use crate::normalize::normalize;

pub const DEFAULT_FORM_LEN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandingsOptions {
    /// How many recent outcomes the form string keeps.
    pub form_len: usize,
    /// Count live fixtures with a score as if they had finished.
    pub include_live: bool,
}

impl Default for StandingsOptions {
    fn default() -> Self {
        Self {
            form_len: DEFAULT_FORM_LEN,
            include_live: false,
        }
    }
}

impl StandingsOptions {
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self {
            form_len: cfg.form_len,
            include_live: cfg.include_live,
        }
    }
}

/// Ranked league table computed from scratch.
///
/// `previous` is the table the caller showed last time; when it is non-empty
/// every team gets a `position_change`. Live `fixtures` only count with
/// [`StandingsOptions::include_live`], see [`compute_standings_with`].
pub fn compute_standings(
    teams: &[Team],
    results: &[MatchResult],
    fixtures: &[MatchResult],
    previous: &[Team],
) -> Vec<Team> {
    compute_standings_with(teams, results, fixtures, previous, &StandingsOptions::default())
}

pub fn compute_standings_with(
    teams: &[Team],
    results: &[MatchResult],
    fixtures: &[MatchResult],
    previous: &[Team],
    options: &StandingsOptions,
) -> Vec<Team> {
    let mut table: Vec<Team> = teams
        .iter()
        .map(|t| Team {
            stats: TeamStats::default(),
            position_change: None,
            ..t.clone()
        })
        .collect();

    let index = name_index(&table);
    let mut forms: Vec<Vec<Outcome>> = vec![Vec::new(); table.len()];

    let mut counted: Vec<&MatchResult> = results
        .iter()
        .filter(|m| m.counts_for_standings())
        .collect();
    if options.include_live {
        counted.extend(fixtures.iter().filter(|m| m.is_live_with_score()));
    }
    // Oldest first, so the last outcome pushed is the most recent one.
    counted.sort_by_key(|m| kickoff_timestamp(m));

    let mut applied = 0usize;
    let mut skipped = 0usize;
    for m in counted {
        let Some((score_a, score_b)) = m.scores() else {
            debug!("result without scores skipped: {} v {}", m.team_a, m.team_b);
            skipped += 1;
            continue;
        };
        let side_a = index.get(&normalize(&m.team_a)).copied();
        let side_b = index.get(&normalize(&m.team_b)).copied();
        let (Some(a), Some(b)) = (side_a, side_b) else {
            debug!("result with unknown team skipped: {} v {}", m.team_a, m.team_b);
            skipped += 1;
            continue;
        };
        if a == b {
            debug!("result against itself skipped: {}", m.team_a);
            skipped += 1;
            continue;
        }
        record(&mut table[a].stats, &mut forms[a], score_a, score_b);
        record(&mut table[b].stats, &mut forms[b], score_b, score_a);
        applied += 1;
    }

    for (team, form) in table.iter_mut().zip(forms) {
        let stats = &mut team.stats;
        stats.gd = goal_difference(stats.gs, stats.gc);
        stats.form = form
            .iter()
            .rev()
            .take(options.form_len)
            .map(|o| o.letter().to_string())
            .collect::<Vec<_>>()
            .join(" ");
    }

    table.sort_by(compare_rows);
    apply_position_changes(&mut table, previous);

    debug!(
        "standings computed: {} teams, {applied} results applied, {skipped} skipped",
        table.len()
    );
    table
}

/// Same as [`compute_standings_with`] but straight from JSON values, which
/// is where a non-array roster or result list can show up.
pub fn compute_standings_json(
    teams: &Value,
    results: &Value,
    fixtures: &Value,
    previous: &[Team],
    options: &StandingsOptions,
) -> Result<Vec<Team>, StandingsError> {
    let teams: Vec<Team> = parse_items(array_field("teams", teams, false)?, "team");
    let results: Vec<MatchResult> = parse_items(array_field("results", results, false)?, "result");
    let fixtures: Vec<MatchResult> = parse_items(array_field("fixtures", fixtures, true)?, "fixture");
    Ok(compute_standings_with(&teams, &results, &fixtures, previous, options))
}

/// Table for a competition document after an edit, ready to be stored.
pub fn recalculate(
    competition: &Competition,
    previous: &[Team],
    options: &StandingsOptions,
) -> Vec<Team> {
    compute_standings_with(
        &competition.teams,
        &competition.results,
        &competition.fixtures,
        previous,
        options,
    )
}

fn name_index(table: &[Team]) -> HashMap<String, usize> {
    let mut index: HashMap<String, usize> = HashMap::with_capacity(table.len());
    for (i, team) in table.iter().enumerate() {
        let key = normalize(&team.name);
        if key.is_empty() {
            continue;
        }
        index.entry(key).or_insert(i);
    }
    index
}

fn record(stats: &mut TeamStats, form: &mut Vec<Outcome>, own: u32, other: u32) {
    let outcome = Outcome::from_scores(own, other);
    stats.p += 1;
    stats.gs = stats.gs.saturating_add(own);
    stats.gc = stats.gc.saturating_add(other);
    match outcome {
        Outcome::Win => stats.w += 1,
        Outcome::Draw => stats.d += 1,
        Outcome::Loss => stats.l += 1,
    }
    stats.pts = stats.pts.saturating_add(outcome.points());
    form.push(outcome);
}

fn goal_difference(gs: u32, gc: u32) -> i32 {
    let diff = i64::from(gs) - i64::from(gc);
    i32::try_from(diff).unwrap_or(if diff < 0 { i32::MIN } else { i32::MAX })
}

/// Points, then goal difference, then goals scored, then name.
pub fn compare_rows(a: &Team, b: &Team) -> Ordering {
    b.stats
        .pts
        .cmp(&a.stats.pts)
        .then_with(|| b.stats.gd.cmp(&a.stats.gd))
        .then_with(|| b.stats.gs.cmp(&a.stats.gs))
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.id.cmp(&b.id))
}

fn apply_position_changes(table: &mut [Team], previous: &[Team]) {
    if previous.is_empty() {
        return;
    }
    let mut prev_rank: HashMap<u32, usize> = HashMap::with_capacity(previous.len());
    for (rank, team) in previous.iter().enumerate() {
        prev_rank.entry(team.id).or_insert(rank);
    }
    for (rank, team) in table.iter_mut().enumerate() {
        let change = match prev_rank.get(&team.id) {
            Some(&before) if rank < before => PositionChange::Up,
            Some(&before) if rank > before => PositionChange::Down,
            _ => PositionChange::Same,
        };
        team.position_change = Some(change);
    }
}
