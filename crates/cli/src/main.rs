use anyhow::Context;
use rpsjoker_core::{
    Choice, Event, PhaseReport, RoundConfig, RoundError, RoundState, RoundSummary, Rule,
    RuleLibrary, Session, Side, Toggle, TurnResult,
};
use rpsjoker_data::{load_assets, select_rules};
use serde::Serialize;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

const DEFAULT_SEED: u64 = 0xC0FFEE;

#[derive(Debug, Clone)]
struct CliOptions {
    seed: u64,
    assets: PathBuf,
    rules: Option<String>,
    all_rules: bool,
    auto: bool,
    rounds: u32,
    trace: bool,
    help: bool,
}

fn parse_cli_options(args: &[String]) -> CliOptions {
    let mut options = CliOptions {
        seed: DEFAULT_SEED,
        assets: PathBuf::from("assets"),
        rules: None,
        all_rules: false,
        auto: false,
        rounds: 1,
        trace: false,
        help: false,
    };
    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "--auto" => options.auto = true,
            "--all-rules" => options.all_rules = true,
            "--trace" => options.trace = true,
            "--help" | "-h" => options.help = true,
            "--seed" => {
                if let Some(value) = args.get(idx + 1) {
                    match value.parse::<u64>() {
                        Ok(seed) => options.seed = seed,
                        Err(_) => eprintln!("ignoring bad seed `{value}`"),
                    }
                    idx += 1;
                }
            }
            "--assets" => {
                if let Some(value) = args.get(idx + 1) {
                    options.assets = PathBuf::from(value);
                    idx += 1;
                }
            }
            "--rules" => {
                if let Some(value) = args.get(idx + 1) {
                    options.rules = Some(value.clone());
                    idx += 1;
                }
            }
            "--rounds" => {
                if let Some(value) = args.get(idx + 1) {
                    options.rounds = value.parse::<u32>().unwrap_or(1).max(1);
                    idx += 1;
                }
            }
            other => eprintln!("ignoring unknown argument `{other}`"),
        }
        idx += 1;
    }
    options
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = parse_cli_options(&args);
    if options.help {
        print_usage();
        return;
    }
    if let Err(err) = run(&options) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run(options: &CliOptions) -> anyhow::Result<()> {
    let assets = load_assets(&options.assets)
        .with_context(|| format!("load assets from {}", options.assets.display()))?;
    for warning in &assets.rules.warnings {
        eprintln!("rule warning: {warning}");
    }
    let library = assets.rules.library;
    let mut frontend = Frontend::new(assets.config, options);
    for rule in initial_rules(&library, options)? {
        frontend.session.enable_rule(rule);
    }
    if options.auto {
        frontend.run_auto(options.rounds)
    } else {
        frontend.run_interactive(&library, options.rounds)
    }
}

fn initial_rules(library: &RuleLibrary, options: &CliOptions) -> anyhow::Result<Vec<Rule>> {
    if options.all_rules {
        return Ok(library.rules.clone());
    }
    match options.rules.as_deref() {
        Some(names) => select_rules(library, names),
        None => Ok(Vec::new()),
    }
}

#[derive(Serialize)]
struct TraceLine<'a> {
    round: u32,
    event: &'a Event,
}

struct Frontend {
    session: Session,
    trace: bool,
    round: u32,
    total: i64,
}

impl Frontend {
    fn new(config: RoundConfig, options: &CliOptions) -> Self {
        Self {
            session: Session::new(config, options.seed),
            trace: options.trace,
            round: 0,
            total: 0,
        }
    }

    fn start_round(&mut self) {
        self.round += 1;
        println!(
            "== round {} | rules: {}",
            self.round,
            self.session.engine().pipeline_description()
        );
        let reports = self.session.start_round();
        self.print_reports(&reports);
        self.flush();
        print_state(&self.session);
    }

    fn run_auto(&mut self, rounds: u32) -> anyhow::Result<()> {
        for _ in 0..rounds {
            self.start_round();
            while self.session.state() == RoundState::Active {
                let Some(choice) = auto_choice(&self.session) else {
                    break;
                };
                let result = self.session.play(choice)?;
                self.print_turn(&result);
            }
        }
        println!("total over {} round(s): {}", self.round, self.total);
        Ok(())
    }

    fn run_interactive(&mut self, library: &RuleLibrary, rounds: u32) -> anyhow::Result<()> {
        print_help();
        self.start_round();
        let stdin = io::stdin();
        let mut lines = stdin.lock().lines();
        loop {
            if self.session.state() == RoundState::Finished {
                if self.round >= rounds {
                    break;
                }
                self.start_round();
            }
            print!("> ");
            io::stdout().flush().context("flush stdout")?;
            let Some(line) = lines.next() else {
                break;
            };
            let line = line.context("read stdin")?;
            let mut parts = line.split_whitespace();
            let Some(cmd) = parts.next() else {
                continue;
            };
            let rest: Vec<&str> = parts.collect();
            match cmd {
                "help" | "h" | "?" => print_help(),
                "quit" | "exit" | "q" => break,
                "state" => print_state(&self.session),
                "rules" => print_rules(library, &self.session),
                "toggle" | "t" => self.toggle(library, &rest.join(" ")),
                "reroll" => match self.session.reroll() {
                    Ok(reports) => {
                        self.print_reports(&reports);
                        self.flush();
                        print_state(&self.session);
                    }
                    Err(err) => println!("cannot reroll: {err}"),
                },
                other => match Choice::from_keyword(other) {
                    Some(choice) => self.play(choice),
                    None => println!("unknown command `{other}` (try help)"),
                },
            }
        }
        println!("total over {} round(s): {}", self.round, self.total);
        Ok(())
    }

    fn play(&mut self, choice: Choice) {
        match self.session.play(choice) {
            Ok(result) => self.print_turn(&result),
            Err(RoundError::NoCardOfChoice(choice)) => println!("no {choice} left in your hand"),
            Err(err) => println!("cannot play: {err}"),
        }
    }

    fn toggle(&mut self, library: &RuleLibrary, name: &str) {
        let Some(rule) = library.by_name(name) else {
            println!("unknown rule `{name}`");
            return;
        };
        let label = rule.name.clone();
        let (toggle, report) = self.session.toggle_rule(rule.clone());
        match toggle {
            Toggle::Enabled => println!("enabled {label}"),
            Toggle::Disabled => println!("disabled {label}"),
        }
        if let Some(report) = report {
            self.print_reports(std::slice::from_ref(&report));
        }
        self.flush();
        println!("pipeline: {}", self.session.engine().pipeline_description());
    }

    fn print_turn(&mut self, result: &TurnResult) {
        self.print_reports(&result.reports);
        println!(
            "turn {}: {} vs {} -> {} | base {} | turn {:+} | total {}",
            result.turn,
            result.player,
            result.opponent,
            result.outcome,
            result.base,
            result.start_delta + result.delta,
            result.total
        );
        self.flush();
        if let Some(summary) = &result.finished {
            self.total += summary.score;
            print_summary(summary);
        }
    }

    fn print_reports(&self, reports: &[PhaseReport]) {
        for report in reports {
            if !report.fired.is_empty() {
                println!("  {}: {}", report.phase, report.fired.join(", "));
            }
            for diagnostic in &report.diagnostics {
                eprintln!("rule warning: {diagnostic}");
            }
        }
    }

    /// Prints shown info and, with tracing on, every queued event as JSON.
    fn flush(&mut self) {
        for text in self.session.take_shown() {
            println!("  info: {text}");
        }
        let round = self.round;
        let trace = self.trace;
        for event in self.session.drain_events() {
            if !trace {
                continue;
            }
            match serde_json::to_string(&TraceLine { round, event: &event }) {
                Ok(line) => println!("{line}"),
                Err(err) => eprintln!("trace error: {err}"),
            }
        }
    }
}

/// Beats whatever the opponent holds most of; falls back to any held card.
fn auto_choice(session: &Session) -> Option<Choice> {
    let hand = session.table().hand(Side::Player);
    let opponent = session.table().counts(Side::Opponent);
    let mut targets = Choice::ALL;
    targets.sort_by_key(|choice| std::cmp::Reverse(opponent.get(*choice)));
    targets
        .iter()
        .filter_map(|target| Choice::ALL.into_iter().find(|choice| choice.beats(*target)))
        .find(|choice| hand.contains(choice))
        .or_else(|| hand.first().copied())
}

fn print_state(session: &Session) {
    let table = session.table();
    let hand: Vec<String> = table
        .hand(Side::Player)
        .iter()
        .map(|choice| choice.short().to_string())
        .collect();
    println!(
        "turn {}/{} | score {} | rerolls left {} | hand [{}] {} | opponent {} cards",
        table.current_turn().min(table.planned_turns()),
        table.planned_turns(),
        table.total(),
        table.rerolls_left(),
        hand.join(" "),
        table.counts(Side::Player),
        table.hand(Side::Opponent).len()
    );
}

fn print_summary(summary: &RoundSummary) {
    println!(
        "round over: score {} (final adjustment {:+}) | W{} D{} L{} | turns {}/{} | rerolls {}",
        summary.score,
        summary.final_adjustment,
        summary.wins,
        summary.draws,
        summary.losses,
        summary.turns_played,
        summary.turns_planned,
        summary.rerolls_used
    );
}

fn print_rules(library: &RuleLibrary, session: &Session) {
    for rule in &library.rules {
        let mark = if session.engine().is_enabled(&rule.name) {
            '*'
        } else {
            ' '
        };
        println!("{mark} {:<26} {}", rule.name, rule.description);
    }
    println!("pipeline: {}", session.engine().pipeline_description());
}

fn print_help() {
    println!("Commands:");
    println!("  rock|r  paper|p  scissors|s   play a card");
    println!("  reroll                         redraw your hand before the first play");
    println!("  state                          show the table");
    println!("  rules                          list rules (* = enabled)");
    println!("  toggle|t <name>                enable or disable a rule");
    println!("  help|h|?                       show help");
    println!("  quit|exit|q                    exit");
}

fn print_usage() {
    println!(
        "rpsjoker [--seed N] [--assets DIR] [--rules a,b,c | --all-rules] [--auto] [--rounds N] [--trace]"
    );
}
