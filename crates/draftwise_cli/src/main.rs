use std::error::Error;
use std::io::Write as _;

use banpick_model::analysis::AnalysisMode;
use banpick_model::draft::DRAFT_SEQUENCE;
use banpick_model::hero::{Hero, HeroDb};
use banpick_model::stats::{HeroPoolStats, MatchupTable, SynergyTable, TeamStats};
use banpick_model::suggestion::Suggestion;
use banpick_model::{ActionType, GameVersion, HeroId, Side, TeamName};
use clap::Parser;
use clio::{Input, Output};
use draftwise::{score, ScoreContext, ScoreInput};
use serde::Deserialize;

/// CLI for scoring a draft position offline
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File containing the draft scenario (YAML)
    #[clap(long, short, value_parser, default_value = "-")]
    input: Input,

    /// File containing an analysis mode profile
    #[clap(long, value_parser)]
    mode_file: Option<Input>,

    /// File to write output
    #[clap(long, short, value_parser, default_value = "-")]
    output: Output,

    /// How many suggestions to print per list
    #[clap(long, default_value_t = 8)]
    top: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Scenario {
    version: GameVersion,
    heroes: Vec<Hero>,
    #[serde(default)]
    step_index: usize,
    #[serde(default)]
    blue_picks: Vec<HeroId>,
    #[serde(default)]
    red_picks: Vec<HeroId>,
    #[serde(default)]
    blue_bans: Vec<HeroId>,
    #[serde(default)]
    red_bans: Vec<HeroId>,
    #[serde(default)]
    global_bans: Vec<HeroId>,
    #[serde(default)]
    blue_team: Option<TeamStats>,
    #[serde(default)]
    red_team: Option<TeamStats>,
    #[serde(default)]
    blue_pool: Option<HeroPoolStats>,
    #[serde(default)]
    red_pool: Option<HeroPoolStats>,
    #[serde(default)]
    matchups: MatchupTable,
    #[serde(default)]
    synergies: SynergyTable,
}

fn main() -> Result<(), Box<dyn Error>> {
    let mut args = Args::parse();
    let mode: AnalysisMode = match args.mode_file {
        Some(f) => serde_yaml::from_reader(f)?,
        None => Default::default(),
    };
    let scenario: Scenario = serde_yaml::from_reader(args.input)?;

    let step = DRAFT_SEQUENCE
        .get(scenario.step_index)
        .ok_or("step index out of range; the draft is finished")?;

    let db = HeroDb::new(scenario.heroes);
    let (ally_picks, enemy_picks) = match step.side {
        Side::Blue => (&scenario.blue_picks, &scenario.red_picks),
        Side::Red => (&scenario.red_picks, &scenario.blue_picks),
    };
    let banned: Vec<HeroId> = scenario
        .blue_bans
        .iter()
        .chain(&scenario.red_bans)
        .cloned()
        .collect();
    let order_within_side = match step.action {
        ActionType::Pick => ally_picks.len() + 1,
        ActionType::Ban => match step.side {
            Side::Blue => scenario.blue_bans.len() + 1,
            Side::Red => scenario.red_bans.len() + 1,
        },
    };
    let (ally_stats, enemy_stats, enemy_pool) = match step.side {
        Side::Blue => (&scenario.blue_team, &scenario.red_team, &scenario.red_pool),
        Side::Red => (&scenario.red_team, &scenario.blue_team, &scenario.blue_pool),
    };
    let team = ally_stats
        .as_ref()
        .map(|s| s.team.clone())
        .unwrap_or_else(|| TeamName::from(step.side.to_string()));

    let input = ScoreInput {
        version: &scenario.version,
        heroes: &db,
        ally_picks,
        enemy_picks,
        banned: &banned,
        ally_global_bans: &scenario.global_bans,
        ctx: ScoreContext {
            side: step.side,
            action: step.action,
            order_within_side,
            sequence_slot: step.index,
            team,
        },
        mode: &mode,
        ally_stats: ally_stats.as_ref(),
        enemy_stats: enemy_stats.as_ref(),
        enemy_pool: enemy_pool.as_ref(),
        matchups: &scenario.matchups,
        synergies: &scenario.synergies,
    };
    let set = score(&input);

    if let Some(warning) = &set.warning {
        writeln!(args.output, "warning: {warning}")?;
    }
    writeln!(
        args.output,
        "step {} - {} {}",
        step.index, step.side, step.action
    )?;
    let (title, list): (&str, &[Suggestion]) = match step.action {
        ActionType::Pick => ("picks", &set.hybrid),
        ActionType::Ban => ("bans", &set.smart_ban),
    };
    writeln!(args.output, "suggested {title}:")?;
    print_list(&mut args.output, list, args.top)?;
    Ok(())
}

fn print_list(output: &mut Output, list: &[Suggestion], top: usize) -> Result<(), Box<dyn Error>> {
    let shown = &list[..list.len().min(top)];
    let name_col_width = shown
        .iter()
        .map(|s| s.hero.as_str().len())
        .max()
        .unwrap_or(0);
    for s in shown {
        writeln!(
            output,
            "{:>name_col_width$} {:>7.2}  {}",
            s.hero.as_str(),
            s.score,
            s.reason_text()
        )?;
    }
    Ok(())
}
