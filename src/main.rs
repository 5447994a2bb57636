use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate, Utc};
use log::{info, warn};

use football_eswatini::config::app_config;
use football_eswatini::directory::{Directory, crest_for, link_match};
use football_eswatini::document::{parse_competition_json, parse_directory_json};
use football_eswatini::fixtures::{LiveClock, Tab, classify};
use football_eswatini::model::{Competition, GroupedList, MatchStatus, Team};
use football_eswatini::persist;
use football_eswatini::standings::{StandingsOptions, recalculate};

const USAGE: &str = "usage: football_eswatini <competition.json> [--directory <file>] \
[--tab fixtures|results] [--today YYYY-MM-DD] [--live] [--no-snapshot]";

#[derive(Debug)]
struct CliArgs {
    competition: PathBuf,
    directory: Option<PathBuf>,
    tab: Tab,
    today: Option<NaiveDate>,
    live: bool,
    snapshot: bool,
}

fn parse_args(args: Vec<String>) -> Result<CliArgs> {
    let mut competition = None;
    let mut directory = None;
    let mut tab = Tab::Fixtures;
    let mut today = None;
    let mut live = false;
    let mut snapshot = true;

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) if flag.starts_with("--") => (flag.to_string(), Some(value.to_string())),
            _ => (arg.clone(), None),
        };
        let mut value = |name: &str| {
            inline
                .clone()
                .or_else(|| iter.next())
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("{name} needs a value"))
        };
        match flag.as_str() {
            "--directory" => directory = Some(PathBuf::from(value("--directory")?)),
            "--tab" => tab = value("--tab")?.parse::<Tab>().map_err(anyhow::Error::msg)?,
            "--today" => {
                let raw = value("--today")?;
                today = Some(
                    football_eswatini::fixtures::parse_date(&raw)
                        .with_context(|| format!("invalid --today date: {raw}"))?,
                );
            }
            "--live" => live = true,
            "--no-snapshot" => snapshot = false,
            "-h" | "--help" => bail!(USAGE),
            other if other.starts_with("--") => bail!("unknown flag {other}\n{USAGE}"),
            _ => competition = Some(PathBuf::from(arg)),
        }
    }

    let Some(competition) = competition else {
        bail!(USAGE);
    };
    Ok(CliArgs {
        competition,
        directory,
        tab,
        today,
        live,
        snapshot,
    })
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let args = parse_args(std::env::args().skip(1).collect())?;
    let cfg = app_config();

    let raw = fs::read_to_string(&args.competition)
        .with_context(|| format!("read {}", args.competition.display()))?;
    let competition = parse_competition_json(&raw)?;

    let directory = match &args.directory {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("read {}", path.display()))?;
            parse_directory_json(&raw)?
        }
        None => Directory::from_competitions(std::slice::from_ref(&competition)),
    };

    let snapshot_path = if args.snapshot {
        persist::snapshot_path(cfg.cache_dir.as_deref())
    } else {
        None
    };
    let previous = snapshot_path
        .as_deref()
        .map(|path| persist::load_previous(path, &competition.id))
        .unwrap_or_default();

    let mut options = StandingsOptions::from_config(cfg);
    options.include_live |= args.live;
    let table = recalculate(&competition, &previous, &options);
    info!(
        "{}: {} teams, {} results, {} fixtures",
        display_name(&competition),
        competition.teams.len(),
        competition.results.len(),
        competition.fixtures.len()
    );

    print_table(&table, &directory);

    let today = args
        .today
        .or(cfg.today)
        .unwrap_or_else(|| Local::now().date_naive());
    let groups = classify(&competition, args.tab, today);
    print_groups(&groups, args.tab, &directory, cfg.live_minute_cap);

    if let Some(path) = snapshot_path
        && !table.is_empty()
        && let Err(err) = persist::save_table(&path, &competition.id, &table)
    {
        warn!("standings snapshot not saved: {err:#}");
    }
    Ok(())
}

fn display_name(competition: &Competition) -> &str {
    if !competition.name.is_empty() {
        &competition.name
    } else if !competition.id.is_empty() {
        &competition.id
    } else {
        "competition"
    }
}

fn print_table(table: &[Team], directory: &Directory) {
    if table.is_empty() {
        println!("No standings available");
        return;
    }
    println!(
        "{:>3}   {:<24} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>4} {:>4}  {:<10} Crest",
        "#", "Team", "P", "W", "D", "L", "GF", "GA", "GD", "Pts", "Form"
    );
    for (idx, team) in table.iter().enumerate() {
        let s = &team.stats;
        let change = team.position_change.map(|c| c.symbol()).unwrap_or(" ");
        let crest = crest_for(&team.name, team.crest_url.as_deref(), directory).unwrap_or("-");
        println!(
            "{:>3} {} {:<24} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>+4} {:>4}  {:<10} {}",
            idx + 1,
            change,
            truncate(&team.name, 24),
            s.p,
            s.w,
            s.d,
            s.l,
            s.gs,
            s.gc,
            s.gd,
            s.pts,
            s.form,
            crest
        );
    }
}

fn print_groups(groups: &[GroupedList], tab: Tab, directory: &Directory, minute_cap: u32) {
    let heading = match tab {
        Tab::Fixtures => "Fixtures",
        Tab::Results => "Results",
    };
    println!();
    if groups.is_empty() {
        println!("{heading}: nothing to show");
        return;
    }
    let now = Utc::now();
    for group in groups {
        println!("{heading} / {}", group.title);
        for m in &group.fixtures {
            let when = m
                .full_date
                .as_deref()
                .or(m.date.as_deref())
                .unwrap_or("TBC");
            let time = m.time.as_deref().unwrap_or("");
            let centre = match (m.scores(), LiveClock::for_fixture(m, now, minute_cap)) {
                (Some((a, b)), Some(clock)) => format!("{a}-{b} {}", clock.label_at(now)),
                (Some((a, b)), None) => match (m.score_a_pen, m.score_b_pen) {
                    (Some(pa), Some(pb)) => format!("{a}-{b} ({pa}-{pb} p)"),
                    _ => format!("{a}-{b}"),
                },
                (None, _) => "v".to_string(),
            };
            let links = link_match(m, directory);
            let marker = |linked: bool| if linked { "*" } else { "" };
            let status = if m.status == MatchStatus::Scheduled {
                String::new()
            } else {
                format!(" [{}]", m.status.label())
            };
            println!(
                "  {when} {time:<5} {}{} {centre} {}{}{status}",
                m.team_a,
                marker(links.team_a.is_some()),
                m.team_b,
                marker(links.team_b.is_some()),
            );
        }
    }
}

fn truncate(raw: &str, max: usize) -> String {
    if raw.chars().count() <= max {
        raw.to_string()
    } else {
        let mut out: String = raw.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}
