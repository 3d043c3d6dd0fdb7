// Review file renderer: interleaves comments into the source text.
//
// Each comment is anchored at its `end_line` and emitted as a quoted block
// right after that source line. Comments sharing an anchor are ordered by
// `start_line`, ties keep insertion order. Anchors past the last line are
// emitted after the final line.

use crate::types::Comment;

/// Render the annotated review document for `content`.
///
/// Pure and deterministic: identical inputs always yield identical bytes.
pub fn render(content: &str, comments: &[Comment]) -> String {
    let (lines, trailing_newline) = split_lines(content);

    let mut ordered: Vec<&Comment> = comments.iter().collect();
    // Stable sort keeps insertion order for identical (end, start) pairs.
    ordered.sort_by_key(|c| (c.end_line, c.start_line));

    let mut out: Vec<String> = Vec::with_capacity(lines.len() + comments.len() * 3);
    let mut pending = ordered.into_iter().peekable();

    for (idx, line) in lines.iter().enumerate() {
        let line_no = u32::try_from(idx + 1).unwrap_or(u32::MAX);
        out.push((*line).to_string());
        while let Some(comment) = pending.next_if(|c| c.end_line <= line_no) {
            push_block(&mut out, comment);
        }
    }

    // Anything left is anchored beyond the end of the document.
    for comment in pending {
        push_block(&mut out, comment);
    }

    let mut rendered = out.join("\n");
    if trailing_newline {
        rendered.push('\n');
    }
    rendered
}

/// Format the quoted block for one comment (without surrounding blank lines).
pub fn format_comment(comment: &Comment) -> String {
    let label = if comment.is_single_line() {
        format!("Line {}", comment.start_line)
    } else {
        format!("Lines {}-{}", comment.start_line, comment.end_line)
    };

    let mut quoted = Vec::new();
    for (i, body_line) in comment.body.split('\n').enumerate() {
        if i == 0 {
            quoted.push(format!("> **[REVIEW COMMENT - {label}]**: {body_line}"));
        } else if body_line.is_empty() {
            quoted.push(">".to_string());
        } else {
            quoted.push(format!("> {body_line}"));
        }
    }
    quoted.join("\n")
}

fn push_block(out: &mut Vec<String>, comment: &Comment) {
    out.push(String::new());
    out.push(format_comment(comment));
    out.push(String::new());
}

/// Split into source lines. A trailing `\n` terminates the last line rather
/// than opening an empty one.
fn split_lines(content: &str) -> (Vec<&str>, bool) {
    if content.is_empty() {
        return (Vec::new(), false);
    }
    let trailing_newline = content.ends_with('\n');
    let body = if trailing_newline { &content[..content.len() - 1] } else { content };
    (body.split('\n').collect(), trailing_newline)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn comment(id: &str, start_line: u32, end_line: u32, body: &str) -> Comment {
        let at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        Comment {
            id: id.to_string(),
            start_line,
            end_line,
            body: body.to_string(),
            created_at: at,
            updated_at: at,
        }
    }

    const FIVE_LINES: &str = "one\ntwo\nthree\nfour\nfive\n";

    #[test]
    fn no_comments_reproduces_content() {
        assert_eq!(render(FIVE_LINES, &[]), FIVE_LINES);
        assert_eq!(render("no newline", &[]), "no newline");
    }

    #[test]
    fn single_line_label() {
        assert_eq!(format_comment(&comment("c1", 4, 4, "typo")), "> **[REVIEW COMMENT - Line 4]**: typo");
    }

    #[test]
    fn range_label() {
        assert_eq!(
            format_comment(&comment("c1", 2, 5, "split this")),
            "> **[REVIEW COMMENT - Lines 2-5]**: split this"
        );
    }

    #[test]
    fn multiline_body_stays_in_one_quote() {
        let block = format_comment(&comment("c1", 1, 1, "first\n\nthird"));
        assert_eq!(block, "> **[REVIEW COMMENT - Line 1]**: first\n>\n> third");
    }

    #[test]
    fn typo_and_reword_scenario() {
        let comments = vec![comment("c1", 2, 2, "typo"), comment("c2", 1, 3, "reword")];
        let expected = "one\ntwo\n\n> **[REVIEW COMMENT - Line 2]**: typo\n\nthree\n\n\
                        > **[REVIEW COMMENT - Lines 1-3]**: reword\n\nfour\nfive\n";
        assert_eq!(render(FIVE_LINES, &comments), expected);
    }

    #[test]
    fn shared_anchor_keeps_insertion_order_then_later_anchor() {
        let content = (1..=8).map(|n| format!("l{n}")).collect::<Vec<_>>().join("\n");
        let comments =
            vec![comment("A", 3, 3, "a"), comment("B", 3, 3, "b"), comment("C", 7, 7, "c")];
        let out = render(&content, &comments);

        let a = out.find("]**: a").unwrap();
        let b = out.find("]**: b").unwrap();
        let c = out.find("]**: c").unwrap();
        let l3 = out.find("l3").unwrap();
        let l4 = out.find("l4").unwrap();
        let l7 = out.find("l7").unwrap();
        let l8 = out.find("l8").unwrap();
        assert!(l3 < a && a < b && b < l4);
        assert!(l7 < c && c < l8);
    }

    #[test]
    fn shared_anchor_sorted_by_start_line() {
        let comments = vec![comment("c1", 3, 3, "narrow"), comment("c2", 1, 3, "wide")];
        let out = render(FIVE_LINES, &comments);
        assert!(out.find("wide").unwrap() < out.find("narrow").unwrap());
    }

    #[test]
    fn identical_ranges_follow_insertion_order() {
        let comments = vec![
            comment("c9", 2, 4, "first added"),
            comment("c2", 2, 4, "second added"),
            comment("c5", 2, 4, "third added"),
        ];
        let out = render(FIVE_LINES, &comments);
        let first = out.find("first added").unwrap();
        let second = out.find("second added").unwrap();
        let third = out.find("third added").unwrap();
        assert!(first < second && second < third);
    }

    #[test]
    fn anchors_past_end_follow_last_line() {
        let comments = vec![comment("c1", 9, 12, "later"), comment("c2", 6, 6, "sooner")];
        let out = render("a\nb", &comments);
        assert_eq!(
            out,
            "a\nb\n\n> **[REVIEW COMMENT - Line 6]**: sooner\n\n\n\
             > **[REVIEW COMMENT - Lines 9-12]**: later\n"
        );
    }

    #[test]
    fn empty_content_emits_only_comments() {
        let out = render("", &[comment("c1", 1, 1, "empty file?")]);
        assert_eq!(out, "\n> **[REVIEW COMMENT - Line 1]**: empty file?\n");
    }

    #[test]
    fn crlf_lines_are_kept_verbatim() {
        let out = render("a\r\nb\r\n", &[comment("c1", 1, 1, "x")]);
        assert!(out.starts_with("a\r\n\n> **[REVIEW COMMENT - Line 1]**: x\n\nb\r\n"));
    }

    #[test]
    fn render_is_idempotent() {
        let comments = vec![comment("c1", 2, 2, "typo"), comment("c2", 1, 3, "reword\nplease")];
        assert_eq!(render(FIVE_LINES, &comments), render(FIVE_LINES, &comments));
    }
}
