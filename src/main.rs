use airfreight::cargo::{Cargo, CargoId};
use airfreight::scenario::Scenario;
use airfreight::{Flight, FlightStatus, Schedule, Time};
use clap::Parser;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::{Context, Editor, Helper, Highlighter, Hinter, Validator};
use std::collections::HashMap;
use std::fmt::Display;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tabled::settings::Style;
use tabled::Tabled;

#[derive(Parser)]
struct Args {
    /// Path to the JSON scenario file
    #[arg(short, long, value_name = "FILE", default_value = "data/default.json")]
    scenario: PathBuf,

    /// Minutes between arrival and return departure, overrides the scenario
    #[arg(short, long, value_name = "MIN")]
    turnaround: Option<u64>,

    /// Log filter, e.g. `info` or `airfreight=debug`
    #[arg(long, value_name = "FILTER", default_value = "warn")]
    log_level: String,
}

#[derive(Helper, Hinter, Highlighter, Validator)]
pub struct CompleteHelper {
    pub commands: Vec<String>,
}

impl Completer for CompleteHelper {
    type Candidate = Pair;

    fn complete(&self, line: &str, _pos: usize, _ctx: &Context<'_>) -> rustyline::Result<(usize, Vec<Pair>)> {
        let candidates = self
            .commands
            .iter()
            .filter(|cmd| cmd.starts_with(line))
            .map(|cmd| Pair {
                display: cmd.clone(),
                replacement: format!("{} ", cmd),
            })
            .collect();
        Ok((0, candidates))
    }
}

#[derive(Tabled)]
struct CargoRow {
    number: CargoId,
    mass: f64,
    route: String,
    location: String,
    deadline: String,
}

impl From<&Cargo> for CargoRow {
    fn from(cargo: &Cargo) -> Self {
        CargoRow {
            number: cargo.number().clone(),
            mass: cargo.mass(),
            route: format!("{} -> {}", cargo.departure_id(), cargo.destination_id()),
            location: cargo.current_id().to_string(),
            deadline: cargo.deadline().map(|t| t.to_string()).unwrap_or_default(),
        }
    }
}

fn paginate(content: String) {
    let pager = Command::new("less")
        .arg("-R")
        .stdin(Stdio::piped())
        .spawn()
        // Fallback to 'more' if 'less' isn't available
        .or_else(|_| Command::new("more").stdin(Stdio::piped()).spawn());

    let Ok(mut pager) = pager else {
        println!("{}", content);
        return;
    };
    if let Some(mut stdin) = pager.stdin.take() {
        if let Err(e) = stdin.write_all(content.as_bytes()) {
            // Broken pipe is common if the user quits the pager early
            if e.kind() != std::io::ErrorKind::BrokenPipe {
                eprintln!("Error writing to pager: {}", e);
            }
        }
    }
    // Wait for the user to close the pager before returning to the ">> " prompt
    let _ = pager.wait();
}

fn print_table<T: Tabled>(rows: &[T]) {
    if rows.is_empty() {
        println!("Nothing to show.");
        return;
    }
    let mut table = tabled::Table::new(rows);
    table.with(Style::rounded());
    table.with(tabled::settings::Alignment::left());
    if rows.len() > 20 {
        paginate(table.to_string());
    } else {
        println!("{}", table);
    }
}

fn report<T>(result: airfreight::Result<T>, success: impl Display) {
    match result {
        Ok(_) => println!("{}", success.to_string().green()),
        Err(e) => println!("{} {}", format!("[{:?}]", e.code()).red(), e),
    }
}

fn minutes(arg: Option<&&str>) -> Option<Time> {
    arg.and_then(|s| s.parse::<u64>().ok()).map(Time)
}

fn load(schedule: &mut Schedule, pool: &HashMap<CargoId, Cargo>, flight_id: &str, cargo_id: &str) -> airfreight::Result<()> {
    let cargo = pool
        .get(cargo_id)
        .cloned()
        .ok_or_else(|| airfreight::Error::NotFound(format!("cargo {}", cargo_id)))?;
    schedule.add_cargo(flight_id, cargo)
}

fn add_flight(schedule: &mut Schedule, parts: &[&str]) -> airfreight::Result<()> {
    let (Some(dep), Some(arr)) = (minutes(parts.get(4)), minutes(parts.get(5))) else {
        return Err(airfreight::Error::InvalidArgument(
            "departure and arrival are minutes".to_string(),
        ));
    };
    let flight = Flight::new(parts[1], parts[2], parts[3], dep, arr, parts[6])?;
    schedule.add_flight(flight)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level)),
        )
        .init();

    let Scenario {
        mut schedule,
        cargo: mut pool,
    } = Scenario::load_from_file(&args.scenario)?;
    if let Some(turnaround) = args.turnaround {
        schedule.set_turnaround(turnaround);
    }
    println!(
        "Dispatch online. Loaded {} flights and {} aircraft from {}",
        schedule.len(),
        schedule.fleet().len(),
        args.scenario.display()
    );

    let config = rustyline::Config::builder()
        .history_ignore_space(true)
        .completion_type(rustyline::CompletionType::List)
        .build();

    let helper = CompleteHelper {
        commands: [
            "ls", "fleet", "cargo", "aircraft", "flight", "load", "unload", "complete", "return",
            "returns", "check", "dump", "help", "exit",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect(),
    };

    let mut rl = Editor::with_config(config)?;
    rl.set_helper(Some(helper));

    loop {
        let readline = rl.readline(">> ");
        match readline {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() { continue; }

                rl.add_history_entry(trimmed)?;

                let parts: Vec<&str> = trimmed.split_whitespace().collect();
                match parts[0] {
                    "ls" => {
                        let sub = parts.get(1).copied().unwrap_or("a");
                        let flights: Vec<&Flight> = schedule
                            .flights()
                            .iter()
                            .filter(|f| match sub {
                                "s" | "scheduled" => f.status() == FlightStatus::Scheduled,
                                "c" | "completed" => f.status() == FlightStatus::Completed,
                                _ => true, // 'ls' or 'ls a'
                            })
                            .collect();
                        print_table(&flights);
                    },
                    "fleet" => print_table(&schedule.fleet().snapshot()),
                    "cargo" => {
                        let mut rows: Vec<CargoRow> = pool.values().map(CargoRow::from).collect();
                        rows.sort_by(|a, b| a.number.cmp(&b.number));
                        print_table(&rows);
                    },
                    "aircraft" => {
                        match (parts.get(1), parts.get(2).and_then(|c| c.parse::<f64>().ok())) {
                            (Some(id), Some(capacity)) => report(
                                airfreight::Aircraft::new(id, capacity)
                                    .and_then(|a| schedule.register_aircraft(a)),
                                format!("Registered aircraft {}", id),
                            ),
                            _ => println!("Usage: aircraft <id> <capacity>"),
                        }
                    },
                    "flight" => {
                        if parts.len() == 7 {
                            report(add_flight(&mut schedule, &parts), format!("Scheduled flight {}", parts[1]));
                        } else {
                            println!("Usage: flight <id> <origin> <destination> <departure> <arrival> <aircraft>");
                        }
                    },
                    "load" => {
                        if let (Some(flight_id), Some(cargo_id)) = (parts.get(1), parts.get(2)) {
                            report(
                                load(&mut schedule, &pool, flight_id, cargo_id),
                                format!("Loaded {} onto {}", cargo_id, flight_id),
                            );
                        } else {
                            println!("Usage: load <flight> <cargo>");
                        }
                    },
                    "unload" => {
                        if let (Some(flight_id), Some(cargo_id)) = (parts.get(1), parts.get(2)) {
                            report(
                                schedule.remove_cargo(flight_id, cargo_id),
                                format!("Unloaded {} from {}", cargo_id, flight_id),
                            );
                        } else {
                            println!("Usage: unload <flight> <cargo>");
                        }
                    },
                    "complete" => {
                        if let Some(flight_id) = parts.get(1) {
                            let result = schedule.complete_flight(flight_id);
                            if result.is_ok() {
                                // Delivered cargo now sits at the destination.
                                if let Some(flight) = schedule.find_flight(flight_id) {
                                    for c in flight.manifest() {
                                        pool.insert(c.number().clone(), c.clone());
                                    }
                                }
                            }
                            report(result, format!("Completed flight {}", flight_id));
                        } else {
                            println!("Usage: complete <flight>");
                        }
                    },
                    "return" => {
                        if let Some(flight_id) = parts.get(1) {
                            match schedule.add_return_flight(flight_id) {
                                Ok(id) => println!("{}", format!("Added return flight {}", id).green()),
                                Err(e) => report::<()>(Err(e), ""),
                            }
                        } else {
                            println!("Usage: return <flight>");
                        }
                    },
                    "returns" => {
                        let outcome = schedule.add_return_flights();
                        println!("{}", format!("Added {} return flights.", outcome.added.len()).green());
                        for (id, e) in outcome.rejected {
                            println!("{} {}: {}", "rejected".yellow(), id, e);
                        }
                    },
                    "check" => {
                        let errors = schedule.validation_errors();
                        if errors.is_empty() {
                            println!("{}", "Schedule is consistent.".green());
                        }
                        for e in errors {
                            println!("{}", e.red());
                        }
                        for id in schedule.overworked_aircraft() {
                            println!("{} aircraft {} exceeds {} flight minutes on a day", "overworked".yellow(), id, schedule.config().max_daily_flight_time);
                        }
                        if let Some(now) = minutes(parts.get(1)) {
                            for (flight_id, c) in schedule.overdue_cargo(now) {
                                println!("{} {} on flight {}", "overdue".yellow(), c, flight_id);
                            }
                        }
                    },
                    "dump" => paginate(schedule.to_json()?),
                    "help" | "?" => {
                        println!("\nAvailable Commands:");
                        println!("  ls [status]                    - List flights, filter by status: s - scheduled, c - completed");
                        println!("  fleet                          - List aircraft with their current load");
                        println!("  cargo                          - List the cargo pool");
                        println!("  aircraft <id> <kg>             - Register an aircraft");
                        println!("  flight <id> <o> <d> <m> <m> <ac> - Schedule a flight departing and arriving at minutes <m>");
                        println!("  load <flight> <cargo>          - Load cargo from the pool onto a flight");
                        println!("  unload <flight> <cargo>        - Take cargo off a flight");
                        println!("  complete <flight>              - Complete a flight and offload its aircraft");
                        println!("  return <flight>                - Schedule the return leg of a flight");
                        println!("  returns                        - Schedule return legs for every active flight");
                        println!("  check [minute]                 - Validate the schedule, report overdue cargo at <minute>");
                        println!("  dump                           - Show the schedule as JSON");
                        println!("  help / ?                       - Show this help menu");
                        println!("  exit / quit                    - Exit\n");
                    },
                    "exit" | "quit" => break,
                    _ => println!("Unknown command: {}", parts[0]),
                }
            },
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            },
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            },
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }
    Ok(())
}
