//! Line-based code statistics.

use super::CodeStats;

const DOCSTRING_DELIMITERS: &[&str] = &["\"\"\"", "'''"];

/// Compute statistics over the lines of `code`.
///
/// Lines are split on `\n`, so a trailing newline yields a final empty line.
/// A line is a docstring line when an odd number of triple-quote delimiters
/// has been seen up to and including it; a one-line docstring or a closing
/// `text"""` line therefore counts as code. A line holding only a delimiter
/// is not counted in any bucket.
pub fn code_stats(code: &str) -> CodeStats {
    let mut stats = CodeStats::default();
    let mut total_length = 0usize;
    let mut non_blank = 0usize;
    let mut delimiters = 0usize;
    let mut in_docstring = false;

    for line in code.split('\n') {
        stats.total_lines += 1;
        let stripped = line.trim();

        if !stripped.is_empty() {
            let length = line.chars().count();
            total_length += length;
            non_blank += 1;
            stats.max_line_length = stats.max_line_length.max(length);
        }

        let found: usize = DOCSTRING_DELIMITERS.iter().map(|d| line.matches(d).count()).sum();
        if found > 0 {
            delimiters += found;
            in_docstring = delimiters % 2 == 1;
            if DOCSTRING_DELIMITERS.contains(&stripped) {
                continue;
            }
        }

        if stripped.is_empty() {
            stats.empty_lines += 1;
        } else if in_docstring {
            stats.docstring_lines += 1;
        } else if stripped.starts_with('#') {
            stats.comment_lines += 1;
        } else {
            stats.code_lines += 1;
            if stripped.starts_with("import ") || stripped.starts_with("from ") {
                stats.imports_count += 1;
            } else if stripped.starts_with("class ") {
                stats.classes_count += 1;
            } else if stripped.starts_with("def ") || stripped.starts_with("async def ") {
                stats.functions_count += 1;
            }
        }
    }

    if non_blank > 0 {
        stats.avg_line_length = total_length as f64 / non_blank as f64;
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_counts() {
        let code = "import os\nfrom x import y\n\n# note\nclass A:\n    def f(self):\n        return 1\n";
        let stats = code_stats(code);
        assert_eq!(stats.total_lines, 8);
        assert_eq!(stats.empty_lines, 2);
        assert_eq!(stats.comment_lines, 1);
        assert_eq!(stats.code_lines, 5);
        assert_eq!(stats.imports_count, 2);
        assert_eq!(stats.classes_count, 1);
        assert_eq!(stats.functions_count, 1);
        assert_eq!(stats.max_line_length, 16);
    }

    #[test]
    fn test_docstring_lines() {
        let code = "def f():\n    \"\"\"Summary.\n\n    More text.\n    \"\"\"\n    return 1\n";
        let stats = code_stats(code);
        // "Summary." opener and "More text."; the closing delimiter is skipped
        assert_eq!(stats.docstring_lines, 2);
        assert_eq!(stats.empty_lines, 2);
        assert_eq!(stats.code_lines, 2);
    }

    #[test]
    fn test_single_line_docstring_is_code() {
        let stats = code_stats("def f():\n    \"\"\"Doc.\"\"\"\n    return 1\n");
        assert_eq!(stats.docstring_lines, 0);
        assert_eq!(stats.code_lines, 3);
    }

    #[test]
    fn test_closing_line_with_text_is_code() {
        let stats = code_stats("x = 1\n\"\"\"Start\nend\"\"\"\n");
        // "Start" opens; the closing "end" line leaves parity even
        assert_eq!(stats.docstring_lines, 1);
        assert_eq!(stats.code_lines, 2);
    }

    #[test]
    fn test_trailing_newline_counts_final_line() {
        let stats = code_stats("a = 1\nb = 2\n");
        assert_eq!(stats.total_lines, 3);
        assert_eq!(stats.empty_lines, 1);
        assert_eq!(stats.code_lines, 2);
    }

    #[test]
    fn test_average_over_non_blank_lines() {
        let stats = code_stats("ab\n\nabcd");
        assert_eq!(stats.avg_line_length, 3.0);
    }

    #[test]
    fn test_empty_input() {
        let stats = code_stats("");
        assert_eq!(stats.total_lines, 1);
        assert_eq!(stats.empty_lines, 1);
        assert_eq!(stats.code_lines, 0);
    }
}
