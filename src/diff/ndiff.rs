//! Line diff in the `ndiff` format.
//!
//! Output lines carry a two-character prefix: `"  "` for unchanged lines,
//! `"- "` and `"+ "` for removed and added lines, and `"? "` for intraline
//! guides under a pair of similar lines.

use std::collections::HashMap;
use std::hash::Hash;

/// Replaced lines whose similarity ratio reaches this are paired with guides.
pub const SIMILARITY_CUTOFF: f64 = 0.75;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Equal,
    Delete,
    Insert,
    Replace,
}

#[derive(Debug, Clone, Copy)]
struct Opcode {
    tag: Tag,
    a: (usize, usize),
    b: (usize, usize),
}

/// Longest-matching-block sequence matcher, without junk heuristics.
struct SequenceMatcher<'s, T> {
    a: &'s [T],
    b: &'s [T],
    b2j: HashMap<&'s T, Vec<usize>>,
}

impl<'s, T: Eq + Hash> SequenceMatcher<'s, T> {
    fn new(a: &'s [T], b: &'s [T]) -> Self {
        let mut b2j: HashMap<&T, Vec<usize>> = HashMap::new();
        for (j, item) in b.iter().enumerate() {
            b2j.entry(item).or_default().push(j);
        }
        Self { a, b, b2j }
    }

    /// Longest common run in `a[alo..ahi]` and `b[blo..bhi]`, earliest on ties.
    fn find_longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> (usize, usize, usize) {
        let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);
        let mut j2len: HashMap<usize, usize> = HashMap::new();

        for i in alo..ahi {
            let mut next: HashMap<usize, usize> = HashMap::new();
            if let Some(positions) = self.b2j.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j.checked_sub(1).and_then(|p| j2len.get(&p)).copied().unwrap_or(0) + 1;
                    next.insert(j, k);
                    if k > best_size {
                        best_i = i + 1 - k;
                        best_j = j + 1 - k;
                        best_size = k;
                    }
                }
            }
            j2len = next;
        }

        (best_i, best_j, best_size)
    }

    /// Matching blocks in order, ending with the `(len_a, len_b, 0)` sentinel.
    fn matching_blocks(&self) -> Vec<(usize, usize, usize)> {
        let mut queue = vec![(0, self.a.len(), 0, self.b.len())];
        let mut blocks = Vec::new();

        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let (i, j, k) = self.find_longest_match(alo, ahi, blo, bhi);
            if k == 0 {
                continue;
            }
            blocks.push((i, j, k));
            if alo < i && blo < j {
                queue.push((alo, i, blo, j));
            }
            if i + k < ahi && j + k < bhi {
                queue.push((i + k, ahi, j + k, bhi));
            }
        }
        blocks.sort_unstable();

        // merge adjacent blocks
        let mut merged: Vec<(usize, usize, usize)> = Vec::with_capacity(blocks.len() + 1);
        for (i, j, k) in blocks {
            match merged.last_mut() {
                Some(last) if last.0 + last.2 == i && last.1 + last.2 == j => last.2 += k,
                _ => merged.push((i, j, k)),
            }
        }
        merged.push((self.a.len(), self.b.len(), 0));
        merged
    }

    fn opcodes(&self) -> Vec<Opcode> {
        let (mut i, mut j) = (0, 0);
        let mut codes = Vec::new();

        for (ai, bj, size) in self.matching_blocks() {
            let tag = match (i < ai, j < bj) {
                (true, true) => Some(Tag::Replace),
                (true, false) => Some(Tag::Delete),
                (false, true) => Some(Tag::Insert),
                (false, false) => None,
            };
            if let Some(tag) = tag {
                codes.push(Opcode { tag, a: (i, ai), b: (j, bj) });
            }
            i = ai + size;
            j = bj + size;
            if size > 0 {
                codes.push(Opcode { tag: Tag::Equal, a: (ai, i), b: (bj, j) });
            }
        }
        codes
    }

    /// `2 * matches / total`, 1.0 for two empty sequences.
    fn ratio(&self) -> f64 {
        let total = self.a.len() + self.b.len();
        if total == 0 {
            return 1.0;
        }
        let matches: usize = self.matching_blocks().iter().map(|(_, _, k)| k).sum();
        2.0 * matches as f64 / total as f64
    }
}

/// Compare two texts line by line.
pub fn ndiff(previous: &str, current: &str) -> Vec<String> {
    let a: Vec<&str> = previous.lines().collect();
    let b: Vec<&str> = current.lines().collect();
    ndiff_lines(&a, &b)
}

/// Compare two line slices.
pub fn ndiff_lines(a: &[&str], b: &[&str]) -> Vec<String> {
    let mut out = Vec::new();
    for op in SequenceMatcher::new(a, b).opcodes() {
        let (alo, ahi) = op.a;
        let (blo, bhi) = op.b;
        match op.tag {
            Tag::Equal => dump(&mut out, ' ', a, alo, ahi),
            Tag::Delete => dump(&mut out, '-', a, alo, ahi),
            Tag::Insert => dump(&mut out, '+', b, blo, bhi),
            Tag::Replace => fancy_replace(&mut out, a, alo, ahi, b, blo, bhi),
        }
    }
    out
}

fn dump(out: &mut Vec<String>, tag: char, lines: &[&str], lo: usize, hi: usize) {
    out.extend(lines[lo..hi].iter().map(|line| format!("{tag} {line}")));
}

fn plain_replace(out: &mut Vec<String>, a: &[&str], alo: usize, ahi: usize, b: &[&str], blo: usize, bhi: usize) {
    if bhi - blo < ahi - alo {
        dump(out, '+', b, blo, bhi);
        dump(out, '-', a, alo, ahi);
    } else {
        dump(out, '-', a, alo, ahi);
        dump(out, '+', b, blo, bhi);
    }
}

/// Pair the most similar lines of a replaced range and recurse on both sides.
fn fancy_replace(out: &mut Vec<String>, a: &[&str], alo: usize, ahi: usize, b: &[&str], blo: usize, bhi: usize) {
    let mut best: Option<(f64, usize, usize)> = None;

    for (j, bline) in b.iter().enumerate().take(bhi).skip(blo) {
        let bchars: Vec<char> = bline.chars().collect();
        for (i, aline) in a.iter().enumerate().take(ahi).skip(alo) {
            let achars: Vec<char> = aline.chars().collect();
            let ratio = SequenceMatcher::new(&achars, &bchars).ratio();
            if ratio >= SIMILARITY_CUTOFF && best.map_or(true, |(r, _, _)| ratio > r) {
                best = Some((ratio, i, j));
            }
        }
    }

    let Some((_, best_i, best_j)) = best else {
        plain_replace(out, a, alo, ahi, b, blo, bhi);
        return;
    };

    fancy_helper(out, a, alo, best_i, b, blo, best_j);
    intraline(out, a[best_i], b[best_j]);
    fancy_helper(out, a, best_i + 1, ahi, b, best_j + 1, bhi);
}

fn fancy_helper(out: &mut Vec<String>, a: &[&str], alo: usize, ahi: usize, b: &[&str], blo: usize, bhi: usize) {
    if alo < ahi {
        if blo < bhi {
            fancy_replace(out, a, alo, ahi, b, blo, bhi);
        } else {
            dump(out, '-', a, alo, ahi);
        }
    } else if blo < bhi {
        dump(out, '+', b, blo, bhi);
    }
}

/// Emit a similar pair with `?` guide lines marking changed characters.
fn intraline(out: &mut Vec<String>, aline: &str, bline: &str) {
    let achars: Vec<char> = aline.chars().collect();
    let bchars: Vec<char> = bline.chars().collect();
    let mut atags = String::new();
    let mut btags = String::new();

    for op in SequenceMatcher::new(&achars, &bchars).opcodes() {
        let la = op.a.1 - op.a.0;
        let lb = op.b.1 - op.b.0;
        match op.tag {
            Tag::Replace => {
                atags.extend(std::iter::repeat('^').take(la));
                btags.extend(std::iter::repeat('^').take(lb));
            }
            Tag::Delete => atags.extend(std::iter::repeat('-').take(la)),
            Tag::Insert => btags.extend(std::iter::repeat('+').take(lb)),
            Tag::Equal => {
                atags.extend(std::iter::repeat(' ').take(la));
                btags.extend(std::iter::repeat(' ').take(lb));
            }
        }
    }

    out.push(format!("- {aline}"));
    let atags = keep_tabs(&achars, &atags);
    if !atags.is_empty() {
        out.push(format!("? {atags}"));
    }
    out.push(format!("+ {bline}"));
    let btags = keep_tabs(&bchars, &btags);
    if !btags.is_empty() {
        out.push(format!("? {btags}"));
    }
}

/// Tabs under unchanged positions stay tabs so guides line up.
fn keep_tabs(line: &[char], tags: &str) -> String {
    let guide: String = tags
        .chars()
        .zip(line.iter())
        .map(|(tag, &c)| if tag == ' ' && c == '\t' { '\t' } else { tag })
        .collect();
    guide.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_texts() {
        let diff = ndiff("a\nb\n", "a\nb\n");
        assert_eq!(diff, vec!["  a", "  b"]);
    }

    #[test]
    fn test_insert_and_delete() {
        let diff = ndiff("one\ntwo\nthree", "one\nthree\nfour");
        assert_eq!(diff, vec!["  one", "- two", "  three", "+ four"]);
    }

    #[test]
    fn test_similar_lines_get_guides() {
        let diff = ndiff("total = a + b\n", "total = a - b\n");
        assert_eq!(
            diff,
            vec![
                "- total = a + b",
                "?           ^",
                "+ total = a - b",
                "?           ^",
            ]
        );
    }

    #[test]
    fn test_dissimilar_replacement_is_plain() {
        let diff = ndiff("import os\n", "class Repo:\n");
        assert_eq!(diff, vec!["- import os", "+ class Repo:"]);
    }

    #[test]
    fn test_insertion_guide() {
        let diff = ndiff("def load(path):\n", "def load(path, mode):\n");
        assert_eq!(
            diff,
            vec![
                "- def load(path):",
                "+ def load(path, mode):",
                "?              ++++++",
            ]
        );
    }

    #[test]
    fn test_ratio() {
        let a: Vec<char> = "abcd".chars().collect();
        let b: Vec<char> = "bcde".chars().collect();
        let ratio = SequenceMatcher::new(&a, &b).ratio();
        assert!((ratio - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_ratio_at_cutoff_gets_guides() {
        let diff = ndiff("abcd", "bcde");
        assert_eq!(diff, vec!["- abcd", "? -", "+ bcde", "?    +"]);
    }
}
