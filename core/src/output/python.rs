use lazy_regex::{lazy_regex, Lazy, Regex};

use super::{address, Verbosity};

/// The intro line plus every indented line after it.
/// The summary line of a traceback is not indented, so it is never part of a match.
static RE_TRACEBACK_EXCEPT_LAST_LINE: Lazy<Regex> =
    lazy_regex!(r"Traceback \(most recent call last\):\n(?:[ \t].*\n)+");

static RE_LOCATION_INFO: Lazy<Regex> = lazy_regex!(r#"(?m)^  File ".*", line \d+.*\n"#);

const ELIDED_TRACEBACK: &str = "Traceback (most recent call last):\n  ...\n";

/// Addresses are renumbered again at the end, so ones that only appeared in
/// removed lines leave no gap.
pub fn normalise(output: &str, verbosity: Verbosity) -> String {
    let normalised = address::normalise_memory_addresses(output);
    let normalised = normalise_traceback(&normalised, verbosity);
    let normalised = normalise_location_info(&normalised);
    address::normalise_memory_addresses(&normalised)
}

pub fn normalise_traceback(output: &str, verbosity: Verbosity) -> String {
    use Verbosity::*;
    match verbosity {
        Minimal => RE_TRACEBACK_EXCEPT_LAST_LINE
            .replace_all(output, "")
            .into_owned(),
        Elided => RE_TRACEBACK_EXCEPT_LAST_LINE
            .replace_all(output, ELIDED_TRACEBACK)
            .into_owned(),
        Verbatim => output.to_owned(),
    }
}

/// Drops `  File "...", line N` lines; they point into the scratch file the snippet ran from.
pub fn normalise_location_info(output: &str) -> String {
    RE_LOCATION_INFO.replace_all(output, "").into_owned()
}

#[cfg(test)]
mod test {
    use super::*;

    const ZERO_DIVISION: &str = concat!(
        "Traceback (most recent call last):\n",
        "  File \"<string>\", line 1, in <module>\n",
        "    1 / 0\n",
        "    ~~^~~\n",
        "ZeroDivisionError: division by zero\n",
    );

    #[test]
    fn traceback_minimal_keeps_only_summary() {
        assert_eq!(
            normalise_traceback(ZERO_DIVISION, Verbosity::Minimal),
            "ZeroDivisionError: division by zero\n"
        );
    }

    #[test]
    fn traceback_elided_keeps_placeholder() {
        assert_eq!(
            normalise_traceback(ZERO_DIVISION, Verbosity::Elided),
            "Traceback (most recent call last):\n  ...\nZeroDivisionError: division by zero\n"
        );
    }

    #[test]
    fn traceback_verbatim_is_untouched() {
        assert_eq!(
            normalise_traceback(ZERO_DIVISION, Verbosity::Verbatim),
            ZERO_DIVISION
        );
        assert_eq!(normalise(ZERO_DIVISION, Verbosity::Minimal), "ZeroDivisionError: division by zero\n");
    }

    #[test]
    fn location_lines_go_at_every_verbosity() {
        assert_eq!(
            normalise(ZERO_DIVISION, Verbosity::Verbatim),
            concat!(
                "Traceback (most recent call last):\n",
                "    1 / 0\n",
                "    ~~^~~\n",
                "ZeroDivisionError: division by zero\n",
            )
        );
    }

    #[test]
    fn output_around_traceback_survives() {
        let raw = concat!(
            "hello\n",
            "Traceback (most recent call last):\n",
            "  File \"/tmp/main.py\", line 2, in <module>\n",
            "    raise Exception\n",
            "Exception\n",
        );
        assert_eq!(normalise(raw, Verbosity::Minimal), "hello\nException\n");
        assert_eq!(
            normalise(raw, Verbosity::Elided),
            "hello\nTraceback (most recent call last):\n  ...\nException\n"
        );
    }

    #[test]
    fn chained_tracebacks_are_each_rewritten() {
        let raw = concat!(
            "Traceback (most recent call last):\n",
            "  File \"/tmp/main.py\", line 2, in <module>\n",
            "    1 / 0\n",
            "ZeroDivisionError: division by zero\n",
            "\n",
            "During handling of the above exception, another exception occurred:\n",
            "\n",
            "Traceback (most recent call last):\n",
            "  File \"/tmp/main.py\", line 4, in <module>\n",
            "    raise ValueError(\"bad\")\n",
            "ValueError: bad\n",
        );
        assert_eq!(
            normalise(raw, Verbosity::Elided),
            concat!(
                "Traceback (most recent call last):\n",
                "  ...\n",
                "ZeroDivisionError: division by zero\n",
                "\n",
                "During handling of the above exception, another exception occurred:\n",
                "\n",
                "Traceback (most recent call last):\n",
                "  ...\n",
                "ValueError: bad\n",
            )
        );
    }

    #[test]
    fn addresses_only_in_removed_lines_leave_no_gap() {
        let raw = concat!(
            "Traceback (most recent call last):\n",
            "  File \"/tmp/main.py\", line 9, in <module>\n",
            "    check(0x7f1)\n",
            "AssertionError: <Node at 0x7f2>\n",
        );
        assert_eq!(
            normalise(raw, Verbosity::Minimal),
            "AssertionError: <Node at 0x100>\n"
        );
        assert_eq!(
            normalise(raw, Verbosity::Elided),
            "Traceback (most recent call last):\n  ...\nAssertionError: <Node at 0x100>\n"
        );
        assert_eq!(
            normalise(raw, Verbosity::Verbatim),
            concat!(
                "Traceback (most recent call last):\n",
                "    check(0x100)\n",
                "AssertionError: <Node at 0x200>\n",
            )
        );
        for v in [Verbosity::Minimal, Verbosity::Elided, Verbosity::Verbatim] {
            let once = normalise(raw, v);
            assert_eq!(normalise(&once, v), once, "verbosity={}", v);
        }
    }

    #[test]
    fn idempotent_on_each_level() {
        for v in [Verbosity::Minimal, Verbosity::Elided, Verbosity::Verbatim] {
            let once = normalise_traceback(ZERO_DIVISION, v);
            assert_eq!(normalise_traceback(&once, v), once);
        }
    }
}
