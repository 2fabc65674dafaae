use std::fmt;

pub const DEFAULT_CONTEXT: usize = 3;

/// Pass/fail is plain equality; normalisation already removed the noise.
pub fn matches(actual: &str, expected: &str) -> bool {
    actual == expected
}

/// One line of an edit script. Lines keep their `\n`, so a missing final newline is a difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffLine<'a> {
    Equal(&'a str),
    Delete(&'a str),
    Insert(&'a str),
}

impl<'a> DiffLine<'a> {
    pub fn text(&self) -> &'a str {
        use DiffLine::*;
        match *self {
            Equal(s) | Delete(s) | Insert(s) => s,
        }
    }

    pub fn prefix(&self) -> char {
        use DiffLine::*;
        match self {
            Equal(_) => ' ',
            Delete(_) => '-',
            Insert(_) => '+',
        }
    }

    fn is_change(&self) -> bool {
        !matches!(self, DiffLine::Equal(_))
    }
}

/// A unified-diff hunk. Starts are 1-based; an empty side starts at the line before it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk<'a> {
    pub old_start: usize,
    pub old_len: usize,
    pub new_start: usize,
    pub new_len: usize,
    pub lines: Vec<DiffLine<'a>>,
}

impl fmt::Display for Hunk<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.header())?;
        for line in &self.lines {
            write!(f, "{}{}", line.prefix(), line.text())?;
            if !line.text().ends_with('\n') {
                write!(f, "\n\\ No newline at end of file\n")?;
            }
        }
        Ok(())
    }
}

impl Hunk<'_> {
    pub fn header(&self) -> String {
        format!(
            "@@ -{},{} +{},{} @@",
            self.old_start, self.old_len, self.new_start, self.new_len
        )
    }
}

fn split_lines(s: &str) -> Vec<&str> {
    s.split_inclusive('\n').collect()
}

/// Longest-common-subsequence edit script turning `old` into `new`.
fn edit_script<'a>(old: &[&'a str], new: &[&'a str]) -> Vec<DiffLine<'a>> {
    let (n, m) = (old.len(), new.len());

    // lcs[i][j] = LCS length of old[i..] and new[j..]
    let mut lcs = vec![vec![0usize; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lcs[i][j] = if old[i] == new[j] {
                lcs[i + 1][j + 1] + 1
            } else {
                lcs[i + 1][j].max(lcs[i][j + 1])
            };
        }
    }

    let mut script = Vec::with_capacity(n + m);
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if old[i] == new[j] {
            script.push(DiffLine::Equal(old[i]));
            i += 1;
            j += 1;
        } else if lcs[i + 1][j] >= lcs[i][j + 1] {
            script.push(DiffLine::Delete(old[i]));
            i += 1;
        } else {
            script.push(DiffLine::Insert(new[j]));
            j += 1;
        }
    }
    script.extend(old[i..].iter().map(|&s| DiffLine::Delete(s)));
    script.extend(new[j..].iter().map(|&s| DiffLine::Insert(s)));
    script
}

/// Line diff from `expected` (old side) to `actual` (new side), grouped into hunks
/// with `context` unchanged lines around each change.
pub fn diff<'a>(actual: &'a str, expected: &'a str, context: usize) -> Vec<Hunk<'a>> {
    let old = split_lines(expected);
    let new = split_lines(actual);
    let script = edit_script(&old, &new);

    // (old_pos, new_pos) before each script entry, 0-based
    let mut positions = Vec::with_capacity(script.len());
    let (mut o, mut n) = (0, 0);
    for line in &script {
        positions.push((o, n));
        match line {
            DiffLine::Equal(_) => {
                o += 1;
                n += 1;
            }
            DiffLine::Delete(_) => o += 1,
            DiffLine::Insert(_) => n += 1,
        }
    }

    let changes: Vec<usize> = script
        .iter()
        .enumerate()
        .filter(|(_, line)| line.is_change())
        .map(|(i, _)| i)
        .collect();

    let mut hunks = Vec::new();
    let mut k = 0;
    while k < changes.len() {
        let start = changes[k].saturating_sub(context);
        let mut end = changes[k] + context;
        k += 1;
        while k < changes.len() && changes[k] <= end + context + 1 {
            end = changes[k] + context;
            k += 1;
        }
        let end = end.min(script.len() - 1);

        let lines = script[start..=end].to_vec();
        let old_len = lines
            .iter()
            .filter(|l| !matches!(l, DiffLine::Insert(_)))
            .count();
        let new_len = lines
            .iter()
            .filter(|l| !matches!(l, DiffLine::Delete(_)))
            .count();
        let (old_pos, new_pos) = positions[start];

        hunks.push(Hunk {
            old_start: if old_len == 0 { old_pos } else { old_pos + 1 },
            old_len,
            new_start: if new_len == 0 { new_pos } else { new_pos + 1 },
            new_len,
            lines,
        });
    }
    hunks
}

/// Renders hunks as the body of a unified diff (no file headers).
pub fn unified(hunks: &[Hunk]) -> String {
    hunks.iter().map(|h| h.to_string()).collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use DiffLine::*;

    #[test]
    fn equal_strings_match_and_have_no_hunks() {
        let s = "hello\n<~1s>\nworld\n";
        assert!(matches(s, s));
        assert!(diff(s, s, DEFAULT_CONTEXT).is_empty());
    }

    #[test]
    fn trailing_newline_matters() {
        assert!(!matches("hello", "hello\n"));

        let hunks = diff("hello", "hello\n", DEFAULT_CONTEXT);
        assert_eq!(hunks.len(), 1);
        assert_eq!(hunks[0].lines, vec![Delete("hello\n"), Insert("hello")]);
        assert_eq!(
            hunks[0].to_string(),
            "@@ -1,1 +1,1 @@\n-hello\n+hello\n\\ No newline at end of file\n"
        );
    }

    #[test]
    fn change_in_the_middle_has_context() {
        let expected = "a\nb\nc\nd\ne\nf\ng\nh\ni\n";
        let actual = "a\nb\nc\nd\nE\nf\ng\nh\ni\n";
        let hunks = diff(actual, expected, DEFAULT_CONTEXT);

        assert_eq!(hunks.len(), 1);
        let h = &hunks[0];
        assert_eq!(h.header(), "@@ -2,7 +2,7 @@");
        assert_eq!(
            h.lines,
            vec![
                Equal("b\n"),
                Equal("c\n"),
                Equal("d\n"),
                Delete("e\n"),
                Insert("E\n"),
                Equal("f\n"),
                Equal("g\n"),
                Equal("h\n"),
            ]
        );
    }

    #[test]
    fn distant_changes_make_separate_hunks() {
        let expected: String = (1..=20).map(|i| format!("{}\n", i)).collect();
        let actual = expected.replace("2\n3\n", "two\n3\n").replace("19\n", "nineteen\n");
        let hunks = diff(&actual, &expected, 1);

        assert_eq!(hunks.len(), 2);
        assert_eq!(hunks[0].header(), "@@ -1,3 +1,3 @@");
        assert_eq!(hunks[1].header(), "@@ -18,3 +18,3 @@");
    }

    #[test]
    fn close_changes_are_merged() {
        let expected = "a\nb\nc\nd\n";
        let actual = "A\nb\nc\nD\n";
        let hunks = diff(actual, expected, 1);
        assert_eq!(hunks.len(), 1);
        assert_eq!(hunks[0].header(), "@@ -1,4 +1,4 @@");
    }

    #[test]
    fn everything_new() {
        let hunks = diff("x\ny\n", "", DEFAULT_CONTEXT);
        assert_eq!(hunks.len(), 1);
        assert_eq!(hunks[0].header(), "@@ -0,0 +1,2 @@");
        assert_eq!(unified(&hunks), "@@ -0,0 +1,2 @@\n+x\n+y\n");
    }

    #[test]
    fn every_rendered_line_starts_with_its_marker() {
        let hunks = diff("a\nB\nc", "a\nb\nc\n", DEFAULT_CONTEXT);
        let rendered = unified(&hunks);
        let markers: Vec<char> = rendered.lines().filter_map(|l| l.chars().next()).collect();
        assert_eq!(markers, vec!['@', ' ', '-', '-', '+', '+', '\\']);
        assert_eq!(rendered.lines().count(), markers.len());
    }

    #[test]
    fn lcs_keeps_common_lines() {
        let hunks = diff("a\nx\nb\nc\n", "a\nb\ny\nc\n", 0);
        let changes: Vec<_> = hunks.iter().flat_map(|h| h.lines.clone()).collect();
        assert_eq!(changes, vec![Insert("x\n"), Delete("y\n")]);
    }
}
