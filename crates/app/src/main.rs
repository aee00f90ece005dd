mod config;
mod input;
mod render;

use reading_core::Clock;
use reading_core::model::DiagnosticReport;
use services::session::{TICK_PERIOD, spawn_ticker};
use services::{
    AppServices, DiagnosticService, SessionError, SessionEvent, SessionLoopService, SessionView,
    ViewSignal,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use config::{Command, Settings, prepare_sqlite_file, print_usage};
use input::{HELP, Input, is_yes, parse_line};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

type Lines = tokio::io::Lines<BufReader<tokio::io::Stdin>>;

async fn read_line(lines: &mut Lines) -> Result<Option<String>, std::io::Error> {
    lines.next_line().await
}

fn draw(view: &SessionView, passage: &[String]) {
    println!("{}", render::render_passage(view, passage));
    println!("{}", render::render_question(view));
}

/// Drive one attempt until it terminates or the learner quits.
///
/// Returns the frozen result, or `None` if the learner left early.
async fn run_quiz(
    session_loop: &SessionLoopService,
    lines: &mut Lines,
) -> Result<Option<reading_core::model::QuizResult>, Box<dyn std::error::Error>> {
    let mut session = session_loop.start_session().await?;
    let passage = session.passage().to_vec();
    println!(
        "{} questions, {} on the clock. Type ? for help.",
        session.len(),
        render::format_duration(session_loop.budget_secs())
    );
    draw(&session.view(), &passage);

    let (mut ticker, mut ticks) = spawn_ticker(TICK_PERIOD);
    let mut confirming = false;

    loop {
        tokio::select! {
            tick = ticks.recv() => {
                if tick.is_none() {
                    break;
                }
                let view = session_loop.apply(&mut session, SessionEvent::Tick).await;
                match view {
                    Ok(view) if view.signal == Some(ViewSignal::TimedOut) => {
                        println!("\nTime is up. Your answers have been submitted.");
                        break;
                    }
                    Ok(view) => {
                        let remaining = view.remaining_secs;
                        if remaining % 60 == 0 || (view.warning && remaining % 15 == 0) {
                            println!("{}", render::render_status(&view));
                        }
                    }
                    Err(SessionError::Storage(e)) => {
                        eprintln!("Result could not be saved: {e}");
                        break;
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            line = read_line(lines) => {
                let Some(line) = line? else {
                    println!("\nInput closed; leaving without submitting.");
                    ticker.stop();
                    return Ok(None);
                };
                let input = if std::mem::take(&mut confirming) {
                    if is_yes(&line) {
                        Some(Input::Event(SessionEvent::Submit))
                    } else {
                        println!("Submission cancelled.");
                        continue;
                    }
                } else {
                    parse_line(&line)
                };
                let event = match input {
                    Some(Input::Event(event)) => event,
                    Some(Input::Redraw) => {
                        draw(&session.view(), &passage);
                        continue;
                    }
                    Some(Input::Help) => {
                        println!("{HELP}");
                        continue;
                    }
                    Some(Input::Quit) => {
                        ticker.stop();
                        println!("Leaving without submitting.");
                        return Ok(None);
                    }
                    None => {
                        println!("Unrecognized command. Type ? for help.");
                        continue;
                    }
                };
                match session_loop.apply(&mut session, event).await {
                    Ok(view) => match view.signal {
                        Some(ViewSignal::ConfirmSubmit(prompt)) => {
                            confirming = true;
                            println!("{}", render::render_submit_prompt(&prompt));
                        }
                        Some(ViewSignal::Submitted) => {
                            println!("\nSubmitted.");
                            break;
                        }
                        Some(ViewSignal::SelectionCapped) => {
                            println!("At most 3 options can be selected. Deselect one first.");
                        }
                        Some(ViewSignal::TimedOut) => break,
                        None => draw(&view, &passage),
                    },
                    Err(SessionError::Storage(e)) => {
                        eprintln!("Result could not be saved: {e}");
                        break;
                    }
                    Err(e @ (SessionError::InvalidOption { .. }
                    | SessionError::IndexOutOfRange { .. })) => println!("{e}"),
                    Err(e) => return Err(e.into()),
                }
            }
        }
    }

    ticker.stop();
    Ok(session.result().cloned())
}

async fn offer_save(
    diagnostics: &DiagnosticService,
    report: &DiagnosticReport,
    lines: &mut Lines,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Save this report? [y/N]");
    let answer = read_line(lines).await?.unwrap_or_default();
    if is_yes(&answer) {
        save(diagnostics, report).await;
    }
    Ok(())
}

async fn save(diagnostics: &DiagnosticService, report: &DiagnosticReport) {
    match diagnostics.save_report(report).await {
        Ok(()) => println!("Report saved."),
        Err(e) => eprintln!("{e}"),
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from_env().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    if settings.command == Command::Help {
        print_usage();
        return Ok(());
    }

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&settings.db_url)?;
    let services = AppServices::new_sqlite(
        &settings.db_url,
        &settings.questions_path,
        Clock::system(),
        settings.budget_secs,
    )
    .await?;
    let diagnostics = services.diagnostics();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    match settings.command {
        Command::Quiz => {
            let Some(result) = run_quiz(&services.session_loop(), &mut lines).await? else {
                return Ok(());
            };
            let report = diagnostics.report_for(&result);
            println!("{}", render::render_report(&report));
            offer_save(&diagnostics, &report, &mut lines).await?;
        }
        Command::Report { save: save_it } => {
            let report = diagnostics.load_report().await?;
            println!("{}", render::render_report(&report));
            if save_it {
                save(&diagnostics, &report).await;
            }
        }
        Command::Help => {}
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    init_logging();
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
