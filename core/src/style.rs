use colored::{Color, ColoredString, Colorize};
use crossterm::terminal;

use crate::action::{CheckKind, CheckSummary};
use crate::output::Hunk;
use crate::question::Question;

#[macro_export]
macro_rules! print_success {
    ($fmt:literal, $($e:tt)*) => {
        use ::colored::Colorize as _;
        println!("{}", format!($fmt, $($e)*).green())
    }
}

const BOLD_LINE: &str = "━";
const THIN_LINE: &str = "─";

pub fn is_truecolor_supported() -> bool {
    let Ok(v) = std::env::var("COLORTERM") else {
        return false
    };
    matches!(v.as_str(), "truecolor" | "24bit")
}

pub trait ColorTheme {
    fn color(&self) -> Color;
}

impl ColorTheme for log::Level {
    fn color(&self) -> Color {
        use log::Level::*;
        match self {
            Error => Color::BrightRed,
            Warn => Color::BrightYellow,
            Info => Color::Cyan,
            Debug => Color::Magenta,
            Trace => Color::Blue,
        }
    }
}

/// Outcome of checking one question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum Verdict {
    #[strum(serialize = "OK")]
    Pass,
    #[strum(serialize = "BAD")]
    Mismatch,
    #[strum(serialize = "ERR")]
    Broken,
}

impl ColorTheme for Verdict {
    fn color(&self) -> Color {
        use Verdict::*;
        if !self::is_truecolor_supported() {
            return match self {
                Pass => Color::Green,
                Mismatch => Color::Yellow,
                Broken => Color::Red,
            };
        }

        match self {
            Pass => Color::TrueColor {
                r: 30,
                g: 180,
                b: 40,
            },
            Mismatch => Color::TrueColor {
                r: 210,
                g: 138,
                b: 4,
            },
            Broken => Color::TrueColor {
                r: 220,
                g: 42,
                b: 42,
            },
        }
    }
}

pub fn verdict_icon(verdict: Verdict) -> ColoredString {
    let fg = if is_truecolor_supported() {
        Color::TrueColor {
            r: 255,
            g: 255,
            b: 255,
        }
    } else {
        Color::BrightBlack
    };
    format!(" {:<3} ", verdict)
        .on_color(verdict.color())
        .bold()
        .color(fg)
}

fn term_cols() -> usize {
    let (cols, _) = terminal::size().unwrap_or((40, 40));
    cols as usize
}

fn print_title(question: &Question, verdict: Verdict, what: &str) {
    println!(
        "\n{} {} {}\n{}",
        verdict_icon(verdict),
        what.bold(),
        question.id.to_string().bright_yellow().bold(),
        BOLD_LINE.repeat(term_cols()).blue().bold(),
    );
}

fn print_sub_title(s: &str) {
    let cols = term_cols();
    println!(
        "{}{}",
        s.cyan().bold(),
        THIN_LINE
            .repeat(cols.saturating_sub(s.chars().count() + 1))
            .bright_black(),
    )
}

/// Prints `text` in `color`, marking trailing whitespace and a missing final newline.
fn print_text(text: &str, color: Color) {
    if text.is_empty() {
        println!("{}", "<EMPTY>".magenta().dimmed());
        return;
    }
    let lines: Vec<_> = text.lines().collect();
    for (i, line) in lines.iter().enumerate() {
        let trimmed = line.trim_end();
        print!("{}", trimmed.color(color));

        let num_trailing_whitespace = line.len() - trimmed.len();
        if num_trailing_whitespace > 0 {
            print!(
                "{}{}",
                " ".repeat(num_trailing_whitespace).on_red(),
                "(Trailing whitespace)".bright_red().bold()
            );
        }

        let is_last_line = i + 1 == lines.len();
        if is_last_line && !text.ends_with('\n') {
            print!("{}", " Missing new line ".on_yellow().black().bold());
        }
        println!();
    }
}

pub fn print_diff(hunks: &[Hunk]) {
    for line in crate::output::compare::unified(hunks).lines() {
        let line = match line.chars().next() {
            Some('@') => line.cyan(),
            Some('-') => line.red(),
            Some('+') => line.green(),
            Some('\\') => line.bright_black(),
            _ => line.normal(),
        };
        println!("{}", line);
    }
}

pub fn print_output_mismatch(question: &Question, normalised: &str) {
    print_title(question, Verdict::Mismatch, "Bad output for");

    print_sub_title("[code]");
    print_text(&question.snippet.code, Color::Cyan);

    print_sub_title("[output (normalised)]");
    print_text(normalised, Color::Green);

    print_sub_title("[given]");
    print_text(&question.expected_output, Color::Red);

    print_sub_title("[diff given -> output]");
    let hunks = crate::output::diff(normalised, &question.expected_output, crate::output::compare::DEFAULT_CONTEXT);
    print_diff(&hunks);
}

pub fn print_formatting_mismatch(question: &Question, formatted: &str) {
    print_title(question, Verdict::Mismatch, "Bad formatting for");

    print_sub_title("[formatted]");
    print_text(formatted, Color::Green);

    print_sub_title("[given]");
    print_text(&question.snippet.code, Color::Red);

    print_sub_title("[diff given -> formatted]");
    let hunks = crate::output::diff(formatted, &question.snippet.code, crate::output::compare::DEFAULT_CONTEXT);
    print_diff(&hunks);
}

pub fn print_build_failure(question: &Question, output: &str) {
    print_title(question, Verdict::Broken, "Build failed for");

    print_sub_title("[code]");
    print_text(&question.snippet.code, Color::Cyan);

    print_sub_title("[build output]");
    print_text(output, Color::Red);
}

pub fn print_format_failure(question: &Question) {
    print_title(question, Verdict::Broken, "Error when formatting");

    print_sub_title("[given]");
    print_text(&question.snippet.code, Color::Red);
}

pub fn print_check_summary(kind: CheckKind, summary: &CheckSummary) {
    let bar = "-".repeat(5);
    print!("{} ", bar);

    if summary.failed == 0 {
        let msg = format!("All {} checked questions passed ✨", summary.checked);
        print!("{}", msg.green());
    } else {
        let headline = format!("{} questions had bad {}", summary.failed, kind);
        print!(
            "{} ({} fixed, {} will be ignored in future, {} remaining)",
            headline.bright_red(),
            summary.fixed.to_string().green().bold(),
            summary.ignored.to_string().yellow().bold(),
            summary.remaining().to_string().bright_white().bold(),
        );
    }

    println!(" {}", bar);
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn verdict_labels_fit_the_badge() {
        for v in [Verdict::Pass, Verdict::Mismatch, Verdict::Broken] {
            assert!(v.to_string().len() <= 3);
        }
        assert_eq!(Verdict::Mismatch.to_string(), "BAD");
    }
}
