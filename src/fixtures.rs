use std::cmp::{Ordering, Reverse};
use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use log::debug;

use crate::model::{Competition, GroupedList, MatchResult, MatchStatus};
use crate::normalize::normalize;

pub const UNSCHEDULED_GROUP: &str = "Unscheduled / Other";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Fixtures,
    Results,
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixtures" | "upcoming" => Ok(Tab::Fixtures),
            "results" => Ok(Tab::Results),
            other => Err(format!("unknown tab: {other} (use fixtures or results)")),
        }
    }
}

impl Tab {
    pub fn includes(self, m: &MatchResult, today: NaiveDate) -> bool {
        match self {
            Tab::Fixtures => {
                m.status != MatchStatus::Finished
                    && !m.has_both_scores()
                    && !is_before(m, today)
            }
            Tab::Results => {
                m.status == MatchStatus::Finished
                    || m.has_both_scores()
                    || m.status == MatchStatus::Abandoned
            }
        }
    }
}

/// Partition a competition's matches for one tab, grouped by matchday.
///
/// Fixtures read oldest-first with the lowest matchday on top; results read
/// newest-first with the highest matchday on top. Groups without a numeric
/// matchday trail the numbered ones in title order.
pub fn classify(competition: &Competition, tab: Tab, today: NaiveDate) -> Vec<GroupedList> {
    let mut groups: Vec<GroupedList> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for m in distinct_matches(competition) {
        if !tab.includes(m, today) {
            continue;
        }
        let title = group_title(m);
        let slot = *index.entry(title.clone()).or_insert_with(|| {
            groups.push(GroupedList {
                title,
                fixtures: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].fixtures.push(m.clone());
    }

    for group in &mut groups {
        match tab {
            Tab::Fixtures => group.fixtures.sort_by_key(kickoff_timestamp),
            Tab::Results => group.fixtures.sort_by_key(|m| Reverse(kickoff_timestamp(m))),
        }
    }
    groups.sort_by(|a, b| compare_groups(a, b, tab));
    groups
}

/// Fixtures then results, one record per id. A fixture whose id also shows
/// up in the results list is the stale copy and gives way to the result.
fn distinct_matches(competition: &Competition) -> impl Iterator<Item = &MatchResult> {
    let result_ids: HashSet<&str> = competition
        .results
        .iter()
        .filter_map(|m| m.id.as_deref())
        .collect();
    let mut seen_ids: HashSet<&str> = HashSet::new();
    competition
        .fixtures
        .iter()
        .filter(move |m| m.id.as_deref().is_none_or(|id| !result_ids.contains(id)))
        .chain(competition.results.iter())
        .filter(move |m| match m.id.as_deref() {
            Some(id) => seen_ids.insert(id),
            None => true,
        })
}

pub fn group_title(m: &MatchResult) -> String {
    match m.matchday.as_deref().map(str::trim) {
        Some(md) if !md.is_empty() => format!("Matchday {md}"),
        _ => UNSCHEDULED_GROUP.to_string(),
    }
}

fn group_number(title: &str) -> Option<f64> {
    title
        .strip_prefix("Matchday ")
        .and_then(|n| n.trim().parse::<f64>().ok())
        .filter(|n| n.is_finite())
}

fn compare_groups(a: &GroupedList, b: &GroupedList, tab: Tab) -> Ordering {
    match (group_number(&a.title), group_number(&b.title)) {
        (Some(x), Some(y)) => match tab {
            Tab::Fixtures => x.total_cmp(&y),
            Tab::Results => y.total_cmp(&x),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.title.cmp(&b.title),
    }
}

/// Every match involving one team, oldest first.
pub fn team_matches(competition: &Competition, name: &str) -> Vec<MatchResult> {
    let key = normalize(name);
    if key.is_empty() {
        return Vec::new();
    }
    let mut out: Vec<MatchResult> = distinct_matches(competition)
        .filter(|m| m.involves(&key))
        .cloned()
        .collect();
    out.sort_by_key(kickoff_timestamp);
    out
}

const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M",
];

const DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d %b %Y",
    "%b %d, %Y",
];

const TIME_FORMATS: [&str; 3] = ["%H:%M", "%H:%M:%S", "%I:%M %p"];

/// Kick-off as local wall-clock time, from `fullDate` (or `date`) plus `time`.
pub fn kickoff(m: &MatchResult) -> Option<NaiveDateTime> {
    let raw = m.full_date.as_deref().or(m.date.as_deref())?;
    let parsed = parse_kickoff(raw, m.time.as_deref());
    if parsed.is_none() {
        debug!("unparseable match date {raw:?} ({} v {})", m.team_a, m.team_b);
    }
    parsed
}

/// Sort key in epoch milliseconds; unparseable dates sort as the epoch.
pub fn kickoff_timestamp(m: &MatchResult) -> i64 {
    kickoff(m)
        .map(|dt| dt.and_utc().timestamp_millis())
        .unwrap_or(0)
}

fn is_before(m: &MatchResult, today: NaiveDate) -> bool {
    // Same-day matches stay listed even after kick-off time.
    kickoff(m).is_some_and(|dt| dt.date() < today)
}

pub fn parse_kickoff(raw: &str, time: Option<&str>) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    let date = parse_date(raw)?;
    let clock = time.and_then(parse_time).unwrap_or(NaiveTime::MIN);
    Some(date.and_time(clock))
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(raw, fmt).ok())
}

/// Display-only minute counter for a live fixture card.
///
/// Advances one minute per elapsed wall-clock minute from the moment it was
/// anchored, stopping at the cap. A minute already at or past the cap (added
/// time entered by an admin) is shown as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveClock {
    base_minute: u32,
    anchored_at: DateTime<Utc>,
    cap: u32,
}

impl LiveClock {
    pub fn for_fixture(fixture: &MatchResult, anchored_at: DateTime<Utc>, cap: u32) -> Option<Self> {
        if fixture.status != MatchStatus::Live {
            return None;
        }
        let base_minute = fixture.live_minute?;
        Some(Self {
            base_minute,
            anchored_at,
            cap,
        })
    }

    pub fn minute_at(&self, now: DateTime<Utc>) -> u32 {
        if self.base_minute >= self.cap {
            return self.base_minute;
        }
        let elapsed = (now - self.anchored_at).num_minutes().max(0);
        let ticked = u64::from(self.base_minute).saturating_add(elapsed as u64);
        ticked.min(u64::from(self.cap)) as u32
    }

    pub fn label_at(&self, now: DateTime<Utc>) -> String {
        format!("{}'", self.minute_at(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn day(raw: &str) -> NaiveDate {
        parse_date(raw).expect("valid test date")
    }

    #[test]
    fn kickoff_combines_date_and_time() {
        let m = MatchResult {
            time: Some("15:30".to_string()),
            ..MatchResult::new("A", "B").with_date("2024-06-10")
        };
        let dt = kickoff(&m).expect("kickoff");
        assert_eq!(dt.to_string(), "2024-06-10 15:30:00");
    }

    #[test]
    fn kickoff_falls_back_to_date_field() {
        let m = MatchResult {
            date: Some("10/06/2024".to_string()),
            ..MatchResult::new("A", "B")
        };
        assert_eq!(kickoff(&m).map(|dt| dt.date()), Some(day("2024-06-10")));
    }

    #[test]
    fn rfc3339_keeps_local_wall_clock() {
        let dt = parse_kickoff("2024-06-10T00:30:00+02:00", None).expect("rfc3339");
        assert_eq!(dt.date(), day("2024-06-10"));
    }

    #[test]
    fn garbled_date_sorts_as_epoch() {
        let m = MatchResult::new("A", "B").with_date("next tuesday");
        assert_eq!(kickoff_timestamp(&m), 0);
    }

    #[test]
    fn tab_parses() {
        assert_eq!("Results".parse::<Tab>(), Ok(Tab::Results));
        assert!("table".parse::<Tab>().is_err());
    }

    #[test]
    fn live_clock_ticks_and_caps() {
        let anchor = Utc.with_ymd_and_hms(2024, 6, 10, 15, 0, 0).single().expect("anchor");
        let mut fixture = MatchResult::new("A", "B").with_status(MatchStatus::Live);
        fixture.live_minute = Some(85);
        let clock = LiveClock::for_fixture(&fixture, anchor, 90).expect("clock");

        assert_eq!(clock.minute_at(anchor), 85);
        assert_eq!(clock.minute_at(anchor + Duration::seconds(59)), 85);
        assert_eq!(clock.minute_at(anchor + Duration::minutes(3)), 88);
        assert_eq!(clock.minute_at(anchor + Duration::minutes(30)), 90);
        assert_eq!(clock.label_at(anchor + Duration::minutes(1)), "86'");
        assert_eq!(clock.minute_at(anchor - Duration::minutes(5)), 85);
        // the stored fixture is untouched
        assert_eq!(fixture.live_minute, Some(85));
    }

    #[test]
    fn live_clock_keeps_added_time() {
        let anchor = Utc.with_ymd_and_hms(2024, 6, 10, 15, 0, 0).single().expect("anchor");
        let mut fixture = MatchResult::new("A", "B").with_status(MatchStatus::Live);
        fixture.live_minute = Some(93);
        let clock = LiveClock::for_fixture(&fixture, anchor, 90).expect("clock");
        assert_eq!(clock.minute_at(anchor + Duration::minutes(10)), 93);
    }

    #[test]
    fn live_clock_needs_live_status_and_minute() {
        let anchor = Utc::now();
        let mut fixture = MatchResult::new("A", "B");
        fixture.live_minute = Some(10);
        assert!(LiveClock::for_fixture(&fixture, anchor, 90).is_none());
        let live = MatchResult::new("A", "B").with_status(MatchStatus::Live);
        assert!(LiveClock::for_fixture(&live, anchor, 90).is_none());
    }
}
