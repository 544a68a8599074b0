//! season-runner: headless season simulation runner.
//!
//! Usage:
//!   season-runner --preset time_gated
//!   season-runner --snapshot season.json --export out.json
//!   season-runner --db seasons.db --load launch --stochastic-runs 200 --seed 7
//!   season-runner --config economy.json --json

use anyhow::{Context, Result};
use season_core::{
    config::SeasonConfig,
    engine::XpBreakdown,
    persona::MAX_PERSONAS,
    stochastic::averaged_trace,
    store::WorkspaceStore,
    summary::{PersonaReport, SeasonSummary},
    workspace::Workspace,
};
use std::env;

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct RunReport {
    config: SeasonConfig,
    personas: Vec<PersonaRun>,
    summary: Option<SeasonSummary>,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct PersonaRun {
    report: PersonaReport,
    breakdown: XpBreakdown,
    stochastic_mean_tier: Option<f64>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let stochastic_runs = parse_arg(&args, "--stochastic-runs", 0u32);
    let json_output = args.iter().any(|a| a == "--json");
    let db = string_arg(&args, "--db");

    let store = match db {
        Some(path) => {
            let store = WorkspaceStore::open(path)?;
            store.migrate()?;
            Some(store)
        }
        None => None,
    };

    let mut workspace = build_workspace(&args, store.as_ref())?;

    if let Some(key) = string_arg(&args, "--preset") {
        workspace.apply_preset(key)?;
    }
    if let Some(path) = string_arg(&args, "--config") {
        workspace.set_config(SeasonConfig::load(path)?)?;
    }

    let runs = workspace.simulate_all();
    let config = workspace.config().clone();
    let mut personas = Vec::with_capacity(runs.len());
    for run in &runs {
        let stochastic_mean_tier = if stochastic_runs > 0 {
            let averaged = averaged_trace(&run.persona, &config, seed, stochastic_runs)?;
            averaged.last().map(|e| e.mean_tier)
        } else {
            None
        };
        personas.push(PersonaRun {
            report: PersonaReport::from_run(run, &config),
            breakdown: run.breakdown,
            stochastic_mean_tier,
        });
    }
    let reports: Vec<PersonaReport> = personas.iter().map(|p| p.report.clone()).collect();
    let report = RunReport {
        summary: SeasonSummary::from_reports(&reports, &config),
        config,
        personas,
    };

    if json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, stochastic_runs, seed);
    }

    if let Some(path) = string_arg(&args, "--export") {
        std::fs::write(path, workspace.export_json()?)
            .with_context(|| format!("Cannot write {path}"))?;
        log::info!("Exported snapshot to {path}");
    }

    if let Some(name) = string_arg(&args, "--save") {
        let store = store
            .as_ref()
            .context("--save requires --db <path>")?;
        store.save_workspace(name, &workspace)?;
    }

    Ok(())
}

/// Resolve the starting workspace: a saved one, a snapshot file, or the
/// default cohort of built-in personas.
fn build_workspace(args: &[String], store: Option<&WorkspaceStore>) -> Result<Workspace> {
    if let Some(name) = string_arg(args, "--load") {
        let store = store.context("--load requires --db <path>")?;
        return Ok(store.load_workspace(name)?);
    }

    let mut workspace = Workspace::new();
    if let Some(path) = string_arg(args, "--snapshot") {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read {path}"))?;
        workspace.import_json(&text)?;
        return Ok(workspace);
    }

    while workspace.personas().len() < MAX_PERSONAS {
        workspace.add_next_template()?;
    }
    Ok(workspace)
}

fn print_report(report: &RunReport, stochastic_runs: u32, seed: u64) {
    let c = &report.config;
    println!("Season Pass: season-runner");
    println!(
        "  season:  {} days, {} tiers @ {:.0} XP, ${:.2}/tier",
        c.total_days, c.total_tiers, c.xp_per_tier, c.cost_per_tier
    );
    println!(
        "  weekly:  {:.0} XP, {}",
        c.weekly_challenge_xp,
        if c.is_weekly_stackable { "stackable" } else { "reset-day only" }
    );
    if stochastic_runs > 0 {
        println!("  stochastic: {stochastic_runs} runs, seed {seed}");
    }
    println!();

    println!("=== PERSONAS ===");
    for p in &report.personas {
        let r = &p.report;
        let o = &r.outcome;
        println!("  {}", r.name);
        println!(
            "    final tier:  {} / {} ({}%)  pressure: {:?}",
            o.final_tier, c.total_tiers, o.completion_pct, o.pressure
        );
        println!(
            "    play:        {} days, {:.0}h, {} h/tier",
            o.play_days,
            o.play_hours,
            o.hours_per_tier.map_or("-".to_string(), |h| format!("{h:.1}"))
        );
        if o.tiers_short > 0 {
            println!("    catch-up:    {} tiers short, ~${:.2}", o.tiers_short, o.catch_up_cost);
        }
        println!(
            "    pace:        50% by {}, 75% by {}",
            day_label(r.pace.day_50),
            day_label(r.pace.day_75)
        );
        println!(
            "    pace shift:  {:.1} -> {:.1} tiers/week ({}% slower)",
            r.shift.first_half_rate, r.shift.second_half_rate, r.shift.slowdown_pct
        );
        println!(
            "    miss a week: -{} tiers, surplus {}, {}",
            r.miss.tiers_lost,
            r.miss.surplus_tiers,
            if r.miss.still_completes {
                "still completes".to_string()
            } else {
                format!("~${:.2} to recover", r.miss.cost_to_recover)
            }
        );
        let b = &p.breakdown;
        println!(
            "    xp sources:  passive {:.0} | daily {:.0} | weekly {:.0} | milestone {:.0} | total {:.0}",
            b.passive, b.daily_quests, b.weekly_challenges, b.milestones, b.total
        );
        if let Some(mean) = p.stochastic_mean_tier {
            println!("    stochastic:  mean final tier {mean:.1}");
        }
    }

    println!();
    println!("=== SEASON SUMMARY ===");
    match &report.summary {
        None => println!("  (no personas)"),
        Some(s) => {
            println!("  {}", s.completion_phrase());
            println!("  avg completion:   {}%", s.avg_completion_pct);
            println!("  avg catch-up:     ${:.2} ({:?} pressure)", s.avg_catch_up_cost, s.pressure);
            if let Some(spread) = &s.midpoint_spread {
                println!(
                    "  midpoint spread:  {} reaches 50% {} days before {}",
                    spread.fastest, spread.gap_days, spread.slowest
                );
            }
        }
    }
}

fn day_label(day: Option<u32>) -> String {
    day.map_or("never".to_string(), |d| format!("day {d}"))
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn string_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
