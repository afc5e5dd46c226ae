//! Terminal rendering for the interview and debrief views.

use crate::api::types::DebriefReport;
use crate::interview::controller::{EventSink, InterviewEvent};
use crate::interview::status::Status;
use crate::session::{Role, Turn};
use std::io::{self, Write};

const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const BLUE: &str = "\x1b[34m";
const BOLD: &str = "\x1b[1m";
const ITALIC: &str = "\x1b[3m";
const RESET: &str = "\x1b[0m";

/// Clear the current terminal line (replaces level bar etc.)
pub fn clear_line() {
    eprint!("\r\x1b[2K");
}

/// Render remaining seconds as `MM:SS`.
pub fn format_countdown(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Render a 20-char amplitude bar with a threshold marker.
///
/// Levels are on the 0–255 detector scale; the bar saturates at 64, which
/// keeps normal speech visually distinct from the threshold region.
pub fn format_level_bar(level: f32, threshold: f32) -> String {
    const BAR_WIDTH: usize = 20;
    const FULL_SCALE: f32 = 64.0;

    let filled = ((level / FULL_SCALE).min(1.0) * BAR_WIDTH as f32) as usize;
    let threshold_pos = ((threshold / FULL_SCALE).min(1.0) * BAR_WIDTH as f32) as usize;

    let mut bar = String::with_capacity(BAR_WIDTH * 3);
    for i in 0..BAR_WIDTH {
        if i < filled {
            if i >= threshold_pos {
                bar.push('█'); // Above threshold
            } else {
                bar.push('▒'); // Below threshold
            }
        } else if i == threshold_pos {
            bar.push('│'); // Threshold marker
        } else {
            bar.push('░'); // Empty
        }
    }
    bar
}

/// User-facing status line text.
pub fn status_label(status: Status) -> &'static str {
    match status {
        Status::Idle => "Press Enter to begin",
        Status::Recording => "Recording — pause to submit",
        Status::Processing => "Processing your answer...",
        Status::Speaking => "Interviewer speaking",
        Status::Complete => "Interview complete — generating your debrief...",
    }
}

/// Print one transcript turn.
pub fn render_turn(turn: &Turn) {
    match turn.role {
        Role::Interviewer => {
            eprintln!("{DIM}INTERVIEWER{RESET}");
            eprintln!("  {}", turn.text);
            if let Some(translation) = &turn.translation {
                eprintln!("  {BLUE}{translation}{RESET}");
            }
        }
        Role::Candidate => {
            eprintln!("{DIM}YOU{RESET}");
            eprintln!("  {DIM}{ITALIC}{}{RESET}", turn.text);
        }
    }
    eprintln!();
}

/// Renders interview events as they happen.
///
/// The meter line is refreshed in place; everything else is appended.
pub struct TerminalSink {
    quiet: bool,
    verbose: u8,
    meter_active: bool,
}

impl TerminalSink {
    pub fn new(quiet: bool, verbose: u8) -> Self {
        Self {
            quiet,
            verbose,
            meter_active: false,
        }
    }

    fn end_meter(&mut self) {
        if self.meter_active {
            clear_line();
            self.meter_active = false;
        }
    }
}

impl EventSink for TerminalSink {
    fn emit(&mut self, event: InterviewEvent) {
        if self.quiet {
            return;
        }

        match event {
            InterviewEvent::Meter {
                level,
                threshold,
                silence_ms,
                remaining_secs,
            } => {
                let bar = format_level_bar(level, threshold);
                let silence = if silence_ms > 0 {
                    format!("  silence {:.1}s", silence_ms as f32 / 1000.0)
                } else {
                    String::new()
                };
                eprint!(
                    "\r\x1b[2K[{bar}] {DIM}{}{RESET}{silence} ",
                    format_countdown(remaining_secs)
                );
                io::stderr().flush().ok();
                self.meter_active = true;
            }
            InterviewEvent::StatusChanged(status) => {
                self.end_meter();
                eprintln!("{DIM}· {}{RESET}", status_label(status));
            }
            InterviewEvent::InterviewerLine { text, translation } => {
                self.end_meter();
                eprintln!();
                eprintln!("{BOLD}{text}{RESET}");
                if let Some(translation) = translation {
                    eprintln!("{BLUE}{translation}{RESET}");
                }
                eprintln!();
            }
            InterviewEvent::TurnAppended(turn) => {
                // The live line was already shown; only candidate turns add
                // something new at this point
                if turn.role == Role::Candidate {
                    self.end_meter();
                    eprintln!("{DIM}{ITALIC}{}{RESET}", turn.text);
                }
            }
            InterviewEvent::QuestionChanged(number) => {
                self.end_meter();
                eprintln!("{DIM}— Question {number} —{RESET}");
            }
            InterviewEvent::TimerSynced { remaining_secs } => {
                if self.verbose >= 1 {
                    self.end_meter();
                    eprintln!(
                        "{DIM}timer synced: {} remaining{RESET}",
                        format_countdown(remaining_secs)
                    );
                }
            }
            InterviewEvent::FellBack { reason } => {
                if self.verbose >= 1 {
                    self.end_meter();
                    eprintln!("{DIM}offline — scripted interviewer ({reason}){RESET}");
                }
            }
            InterviewEvent::Note(message) => {
                if self.verbose >= 2 {
                    self.end_meter();
                    eprintln!("{DIM}[note] {message}{RESET}");
                }
            }
        }
    }
}

/// Color for a 0–5 score.
fn score_color(score: f32) -> &'static str {
    if score >= 4.0 {
        GREEN
    } else if score >= 3.0 {
        YELLOW
    } else {
        RED
    }
}

/// Render a 0–5 score as a 10-char bar.
pub fn format_score_bar(score: f32) -> String {
    const BAR_WIDTH: usize = 10;
    let filled = ((score / 5.0).clamp(0.0, 1.0) * BAR_WIDTH as f32).round() as usize;
    let mut bar = String::with_capacity(BAR_WIDTH * 3);
    for i in 0..BAR_WIDTH {
        bar.push(if i < filled { '█' } else { '░' });
    }
    bar
}

/// Print the full debrief report.
pub fn render_debrief(report: &DebriefReport, company: &str) {
    eprintln!();
    eprintln!("{BOLD}Interview debrief — {company}{RESET}");
    eprintln!();

    let overall_color = score_color(report.overall_score);
    eprintln!(
        "  Overall  {overall_color}{:.1}{RESET} / 5.0",
        report.overall_score
    );
    eprintln!();

    for dim in &report.scores {
        let color = score_color(dim.score);
        eprintln!(
            "  {color}{}{RESET} {:.1}  {} {DIM}({}){RESET}",
            format_score_bar(dim.score),
            dim.score,
            dim.dimension,
            dim.dimension_en,
        );
    }

    if !report.questions.is_empty() {
        eprintln!();
        eprintln!("{BOLD}Question by question{RESET}");
        for (i, q) in report.questions.iter().enumerate() {
            eprintln!();
            eprintln!("  {}. {}", i + 1, q.question);
            eprintln!("     {DIM}Your answer:{RESET} {}", q.answer_summary);
            eprintln!("     {DIM}Interviewer's notes:{RESET} {ITALIC}{}{RESET}", q.hr_monologue);
            if let Some(penalty) = &q.score_penalty {
                eprintln!("     {RED}{penalty}{RESET}");
            }
        }
    }

    if !report.rewrites.is_empty() {
        eprintln!();
        eprintln!("{BOLD}Suggested rewrites{RESET}");
        for rewrite in &report.rewrites {
            eprintln!();
            eprintln!("  {DIM}\x1b[9m{}{RESET}", rewrite.original);
            eprintln!("  {GREEN}{}{RESET}", rewrite.replacement);
            eprintln!("  {DIM}{}{RESET}", rewrite.reason);
        }
    }

    if !report.company_notes.is_empty() {
        eprintln!();
        eprintln!("{BOLD}Company notes{RESET}");
        eprintln!("  {}", report.company_notes);
    }
    eprintln!();
}
