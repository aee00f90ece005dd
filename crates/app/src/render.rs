//! Plain-text rendering of session views and diagnostic reports.

use std::fmt::Write as _;

use reading_core::model::{DiagnosticReport, OptionLetter, SelectionMode};
use reading_core::passage;
use services::{SessionPhase, SessionView, SubmitPrompt};

/// `MM:SS` countdown display.
#[must_use]
pub fn format_clock(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// `Xm Ys` duration display.
#[must_use]
pub fn format_duration(secs: u32) -> String {
    format!("{}m {}s", secs / 60, secs % 60)
}

fn highlight(paragraph: &str, term: Option<&str>) -> String {
    match term {
        Some(term) => passage::mark_term(paragraph, term, "[", "]"),
        _ => paragraph.to_owned(),
    }
}

/// Passage paragraphs relevant to the current question.
#[must_use]
pub fn render_passage(view: &SessionView, passage: &[String]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {} ==", view.title);
    for (i, paragraph) in passage.iter().enumerate() {
        if view.focus.shows(i) {
            let _ = writeln!(
                out,
                "\n[{}] {}",
                i + 1,
                highlight(paragraph, view.focus.highlight.as_deref())
            );
        }
    }
    out
}

/// Question header, options with selection state, and the navigator strip.
#[must_use]
pub fn render_question(view: &SessionView) -> String {
    let mut out = String::new();
    let question = &view.question;
    let clock = format_clock(view.remaining_secs);
    let clock = if view.warning {
        format!("!! {clock} !!")
    } else {
        clock
    };
    let _ = writeln!(
        out,
        "\nQuestion {} of {}  ({})  {}{}",
        view.index + 1,
        view.total,
        question.kind().label(),
        clock,
        if view.record.is_marked() { "  [marked]" } else { "" }
    );
    let _ = writeln!(out, "{}", question.text());
    if question.selection_mode() == SelectionMode::Multi {
        let _ = writeln!(out, "(select up to 3)");
    }
    for (i, option) in question.options().iter().enumerate() {
        let chosen =
            OptionLetter::from_index(i).is_ok_and(|letter| view.record.answer().contains(letter));
        let _ = writeln!(out, "  {} {option}", if chosen { "(*)" } else { "( )" });
    }
    let strip: Vec<String> = view
        .navigator
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            let mut label = (i + 1).to_string();
            if cell.answered {
                label.push('+');
            }
            if cell.marked {
                label.push('?');
            }
            if cell.current {
                label = format!("<{label}>");
            }
            label
        })
        .collect();
    let _ = writeln!(out, "\n{}", strip.join(" "));
    out
}

#[must_use]
pub fn render_submit_prompt(prompt: &SubmitPrompt) -> String {
    format!(
        "Submit now? {} answered, {} unanswered, {} marked. [y/N]",
        prompt.answered, prompt.unanswered, prompt.marked
    )
}

#[must_use]
pub fn render_status(view: &SessionView) -> String {
    match view.phase {
        SessionPhase::Terminated => "Session finished.".to_owned(),
        SessionPhase::Active | SessionPhase::Loading => {
            format!("Time remaining: {}", format_clock(view.remaining_secs))
        }
    }
}

/// Full diagnostic report: summary, per-type accuracy, plan, and review.
#[must_use]
pub fn render_report(report: &DiagnosticReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n===== Diagnostic Report: {} =====", report.title);
    let _ = writeln!(
        out,
        "Correct: {}/{}    Time used: {} of {} ({:.0}%)",
        report.correct_count,
        report.total_count,
        format_duration(report.elapsed_secs),
        format_duration(report.time_budget_secs),
        report.time_used_percent()
    );
    let _ = writeln!(
        out,
        "Estimated score: {} (range {})",
        report.estimate.score,
        report.score_range()
    );

    let _ = writeln!(out, "\nAccuracy by question type:");
    for row in &report.type_accuracy {
        let _ = writeln!(
            out,
            "  {:<42} {}/{}  {:.0}%",
            row.label, row.correct, row.total, row.accuracy
        );
    }

    let _ = writeln!(out, "\nWeak points:   {}", report.weak_points.join(", "));
    let _ = writeln!(out, "Strong points: {}", report.strong_points.join(", "));

    let _ = writeln!(out, "\nStudy plan:");
    let _ = writeln!(out, "  Focus:    {}", report.plan.focus);
    let _ = writeln!(out, "  Material: {}", report.plan.material);
    let _ = writeln!(out, "  Pacing:   {}", report.plan.pacing);

    let _ = writeln!(out, "\nReview:");
    for review in &report.questions {
        let _ = writeln!(
            out,
            "\n  {}. [{}] {} ({})",
            review.number,
            if review.correct { "correct" } else { "incorrect" },
            review.text,
            review.kind_label
        );
        let _ = writeln!(
            out,
            "     Your answer: {}   Correct answer: {}",
            review.user_answer, review.correct_answer
        );
        if let Some(explanation) = &review.explanation {
            let _ = writeln!(out, "     {explanation}");
        }
    }
    out
}
