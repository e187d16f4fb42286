//! Snippet marker extraction from one source file

use docgen_common::MetadataErrorKind;
use regex::Regex;
use std::sync::LazyLock;

static MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"snippet-(start|end):\[([^\]]+)\]").expect("valid snippet marker regex")
});

/// A tagged excerpt found in a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Marked {
    pub tag: String,
    pub line_start: usize,
    pub line_end: usize,
    pub code: String,
}

struct Open {
    tag: String,
    line_start: usize,
    lines: Vec<String>,
}

/// Find every `snippet-start:[tag]` / `snippet-end:[tag]` pair in `content`
///
/// Snippets may nest or overlap. Marker lines are never part of any
/// snippet's code. Line numbers are 1-based and point at the markers.
pub(crate) fn extract(content: &str) -> (Vec<Marked>, Vec<MetadataErrorKind>) {
    let mut found = Vec::new();
    let mut problems = Vec::new();
    let mut open: Vec<Open> = Vec::new();

    for (index, line) in content.lines().enumerate() {
        let number = index + 1;
        let markers: Vec<(&str, &str)> = MARKER
            .captures_iter(line)
            .filter_map(|caps| {
                Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
            })
            .collect();

        if markers.is_empty() {
            for snippet in &mut open {
                snippet.lines.push(line.to_string());
            }
            continue;
        }

        for (kind, tag) in markers {
            let tag = tag.trim();
            if kind == "start" {
                open.push(Open {
                    tag: tag.to_string(),
                    line_start: number,
                    lines: Vec::new(),
                });
                continue;
            }

            match open.iter().rposition(|o| o.tag == tag) {
                Some(position) => {
                    let snippet = open.remove(position);
                    found.push(Marked {
                        tag: snippet.tag,
                        line_start: snippet.line_start,
                        line_end: number,
                        code: dedent(&snippet.lines),
                    });
                }
                None => problems.push(MetadataErrorKind::SnippetEndWithoutStart {
                    tag: tag.to_string(),
                }),
            }
        }
    }

    for snippet in open {
        problems.push(MetadataErrorKind::UnclosedSnippet { tag: snippet.tag });
    }

    found.sort_by_key(|m| m.line_start);
    (found, problems)
}

/// Join lines, removing the indentation they all share
fn dedent(lines: &[String]) -> String {
    let indent = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| &l[..l.len() - l.trim_start().len()])
        .reduce(common_prefix)
        .unwrap_or("");

    lines
        .iter()
        .map(|l| l.strip_prefix(indent).unwrap_or_else(|| l.trim_start()).trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

fn common_prefix<'s>(a: &'s str, b: &'s str) -> &'s str {
    let len: usize = a
        .chars()
        .zip(b.chars())
        .take_while(|(x, y)| x == y)
        .map(|(x, _)| x.len_utf8())
        .sum();
    &a[..len]
}
