//! Line diff of canonical text
//!
//! Myers' O(ND) shortest edit script in its linear-space form: trim the
//! common leading and trailing lines, find the middle snake of what is left,
//! then recurse on both halves. Memory stays proportional to the number of
//! lines however far apart the two texts are.
//!
//! Inside each run of changes, removed base lines come before added target
//! lines, which keeps the output stable.

use std::ops::{Index, IndexMut, Range};
use verso_core::{ChangeKind, LineChange};

/// Added/removed lines turning `base` into `target`, plus the number of
/// lines both share
pub fn diff_lines(base: &str, target: &str) -> (Vec<LineChange>, usize) {
    let a: Vec<&str> = base.lines().collect();
    let b: Vec<&str> = target.lines().collect();

    let mut script = EditScript::default();
    Aligner::new(&a, &b).conquer(0..a.len(), 0..b.len(), &mut script);
    script.into_changes(&a, &b)
}

// ============================================================================
// Edit script
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    /// Lines shared by both sides
    Keep(usize),
    /// Base line index
    Remove(usize),
    /// Target line index
    Add(usize),
}

#[derive(Debug, Default)]
struct EditScript {
    ops: Vec<Op>,
}

impl EditScript {
    fn keep(&mut self, count: usize) {
        if count > 0 {
            self.ops.push(Op::Keep(count));
        }
    }

    fn remove_all(&mut self, range: Range<usize>) {
        self.ops.extend(range.map(Op::Remove));
    }

    fn add_all(&mut self, range: Range<usize>) {
        self.ops.extend(range.map(Op::Add));
    }

    /// Render the script, holding back additions until the end of their run
    fn into_changes(self, a: &[&str], b: &[&str]) -> (Vec<LineChange>, usize) {
        let mut changes = Vec::new();
        let mut pending_adds = Vec::new();
        let mut unchanged = 0;
        for op in self.ops {
            match op {
                Op::Keep(count) => {
                    changes.append(&mut pending_adds);
                    unchanged += count;
                }
                Op::Remove(i) => changes.push(removed(a[i], i)),
                Op::Add(j) => pending_adds.push(added(b[j], j)),
            }
        }
        changes.append(&mut pending_adds);
        (changes, unchanged)
    }
}

// ============================================================================
// Middle snake
// ============================================================================

/// Furthest-reaching x per diagonal `k`, for `k` in `-max_d..=max_d`
struct Diagonals {
    offset: isize,
    x: Vec<usize>,
}

impl Diagonals {
    fn new(max_d: usize) -> Self {
        Diagonals {
            offset: max_d as isize,
            x: vec![0; 2 * max_d + 1],
        }
    }
}

impl Index<isize> for Diagonals {
    type Output = usize;

    fn index(&self, k: isize) -> &usize {
        &self.x[(k + self.offset) as usize]
    }
}

impl IndexMut<isize> for Diagonals {
    fn index_mut(&mut self, k: isize) -> &mut usize {
        &mut self.x[(k + self.offset) as usize]
    }
}

/// Half the edit distance bound for ranges of `n` and `m` lines
fn max_d(n: usize, m: usize) -> usize {
    (n + m + 1) / 2 + 1
}

struct Aligner<'a> {
    a: &'a [&'a str],
    b: &'a [&'a str],
    forward: Diagonals,
    backward: Diagonals,
}

impl<'a> Aligner<'a> {
    fn new(a: &'a [&'a str], b: &'a [&'a str]) -> Self {
        let bound = max_d(a.len(), b.len());
        Aligner {
            a,
            b,
            forward: Diagonals::new(bound),
            backward: Diagonals::new(bound),
        }
    }

    fn conquer(&mut self, mut a: Range<usize>, mut b: Range<usize>, script: &mut EditScript) {
        let prefix = common_prefix(&self.a[a.clone()], &self.b[b.clone()]);
        script.keep(prefix);
        a.start += prefix;
        b.start += prefix;

        let suffix = common_suffix(&self.a[a.clone()], &self.b[b.clone()]);
        a.end -= suffix;
        b.end -= suffix;

        if a.is_empty() {
            script.add_all(b);
        } else if b.is_empty() {
            script.remove_all(a);
        } else {
            match self.middle_snake(a.clone(), b.clone()) {
                Some((x, y)) => {
                    self.conquer(a.start..x, b.start..y, script);
                    self.conquer(x..a.end, y..b.end, script);
                }
                None => {
                    script.remove_all(a);
                    script.add_all(b);
                }
            }
        }

        script.keep(suffix);
    }

    /// A point on a shortest edit path strictly between the two corners of
    /// the `a` x `b` grid, in absolute line indices
    fn middle_snake(&mut self, a: Range<usize>, b: Range<usize>) -> Option<(usize, usize)> {
        let (n, m) = (a.len(), b.len());
        let delta = n as isize - m as isize;
        let odd = delta & 1 == 1;
        self.forward[1] = 0;
        self.backward[1] = 0;

        for d in 0..max_d(n, m) as isize {
            for k in (-d..=d).rev().step_by(2) {
                let fw = &self.forward;
                let mut x = if k == -d || (k != d && fw[k - 1] < fw[k + 1]) {
                    fw[k + 1]
                } else {
                    fw[k - 1] + 1
                };
                let y = (x as isize - k) as usize;
                let (x0, y0) = (x, y);
                if x < n && y < m {
                    x += common_prefix(
                        &self.a[a.start + x..a.end],
                        &self.b[b.start + y..b.end],
                    );
                }
                self.forward[k] = x;

                if odd
                    && (k - delta).abs() < d
                    && self.forward[k] + self.backward[-(k - delta)] >= n
                {
                    return split(&a, &b, x0, y0);
                }
            }

            for k in (-d..=d).rev().step_by(2) {
                let bw = &self.backward;
                let mut x = if k == -d || (k != d && bw[k - 1] < bw[k + 1]) {
                    bw[k + 1]
                } else {
                    bw[k - 1] + 1
                };
                let mut y = (x as isize - k) as usize;
                if x < n && y < m {
                    let run = common_suffix(
                        &self.a[a.start..a.start + n - x],
                        &self.b[b.start..b.start + m - y],
                    );
                    x += run;
                    y += run;
                }
                self.backward[k] = x;

                if !odd
                    && (k - delta).abs() <= d
                    && self.backward[k] + self.forward[-(k - delta)] >= n
                {
                    return split(&a, &b, n.checked_sub(x)?, m.checked_sub(y)?);
                }
            }
        }
        None
    }
}

/// Absolute split point from range-relative `x`, `y`; `None` unless it
/// leaves work on both sides
fn split(a: &Range<usize>, b: &Range<usize>, x: usize, y: usize) -> Option<(usize, usize)> {
    let (n, m) = (a.len(), b.len());
    let at_start = x == 0 && y == 0;
    let at_end = x == n && y == m;
    if x > n || y > m || at_start || at_end {
        return None;
    }
    Some((a.start + x, b.start + y))
}

fn common_prefix(a: &[&str], b: &[&str]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

fn common_suffix(a: &[&str], b: &[&str]) -> usize {
    a.iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count()
}

fn removed(text: &str, index: usize) -> LineChange {
    LineChange {
        kind: ChangeKind::Removed,
        base_line: Some(index + 1),
        target_line: None,
        text: text.to_string(),
    }
}

fn added(text: &str, index: usize) -> LineChange {
    LineChange {
        kind: ChangeKind::Added,
        base_line: None,
        target_line: Some(index + 1),
        text: text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verso_core::Value;

    fn summary(changes: &[LineChange]) -> Vec<String> {
        changes
            .iter()
            .map(|c| match c.kind {
                ChangeKind::Removed => format!("-{}:{}", c.base_line.unwrap(), c.text),
                _ => format!("+{}:{}", c.target_line.unwrap(), c.text),
            })
            .collect()
    }

    fn lcs_len(a: &[&str], b: &[&str]) -> usize {
        let mut row = vec![0usize; b.len() + 1];
        for x in a {
            let mut diag = 0;
            for (j, y) in b.iter().enumerate() {
                let above = row[j + 1];
                row[j + 1] = if x == y { diag + 1 } else { above.max(row[j]) };
                diag = above;
            }
        }
        row[b.len()]
    }

    #[test]
    fn test_identical_text() {
        let (changes, unchanged) = diff_lines("a\nb\nc", "a\nb\nc");
        assert!(changes.is_empty());
        assert_eq!(unchanged, 3);
    }

    #[test]
    fn test_single_line_replaced() {
        let (changes, unchanged) = diff_lines("a\nx\nc", "a\ny\nc");
        assert_eq!(summary(&changes), vec!["-2:x", "+2:y"]);
        assert_eq!(unchanged, 2);
    }

    #[test]
    fn test_insert_and_delete_in_middle() {
        let (changes, unchanged) = diff_lines("a\nb\nc\nd\ne", "a\nc\nd\nX\ne");
        assert_eq!(summary(&changes), vec!["-2:b", "+4:X"]);
        assert_eq!(unchanged, 4);
    }

    #[test]
    fn test_removals_lead_each_run() {
        let (changes, unchanged) = diff_lines("a\nb\nc", "x\ny\nz");
        assert_eq!(
            summary(&changes),
            vec!["-1:a", "-2:b", "-3:c", "+1:x", "+2:y", "+3:z"]
        );
        assert_eq!(unchanged, 0);
    }

    #[test]
    fn test_from_and_to_empty() {
        let (changes, unchanged) = diff_lines("", "a\nb");
        assert_eq!(summary(&changes), vec!["+1:a", "+2:b"]);
        assert_eq!(unchanged, 0);

        let (changes, _) = diff_lines("a\nb", "");
        assert_eq!(summary(&changes), vec!["-1:a", "-2:b"]);
    }

    #[test]
    fn test_line_counts_add_up() {
        let base = "{\n  \"a\": 1,\n  \"b\": [\n    1,\n    2\n  ]\n}";
        let target = "{\n  \"a\": 2,\n  \"b\": [\n    2\n  ],\n  \"c\": null\n}";
        let (changes, unchanged) = diff_lines(base, target);
        let removed = changes.iter().filter(|c| c.kind == ChangeKind::Removed).count();
        let added = changes.iter().filter(|c| c.kind == ChangeKind::Added).count();
        assert_eq!(removed + unchanged, base.lines().count());
        assert_eq!(added + unchanged, target.lines().count());
    }

    #[test]
    fn test_script_is_shortest() {
        let cases = [
            ("a\nb\nc\na\nb\nb\na", "c\nb\na\nb\na\nc"),
            ("1\n2\n3\n4\n5\n6", "6\n5\n4\n3\n2\n1"),
            ("x\na\ny\nb\nz", "a\nq\nb\nr"),
            ("a\na\na\nb", "b\na\na\na"),
        ];
        for (base, target) in cases {
            let a: Vec<&str> = base.lines().collect();
            let b: Vec<&str> = target.lines().collect();
            let (changes, unchanged) = diff_lines(base, target);
            assert_eq!(unchanged, lcs_len(&a, &b), "{:?} -> {:?}", base, target);
            assert_eq!(changes.len(), a.len() + b.len() - 2 * unchanged);
        }
    }

    #[test]
    fn test_large_snapshot_with_edits_at_both_ends() {
        let n = 20_000;
        let mut base: Vec<Value> = (0..n).map(Value::Int).collect();
        let mut target = base.clone();
        base[0] = Value::Int(-1);
        target[n as usize - 1] = Value::Int(-2);

        let base_text = Value::Array(base).canonical_text();
        let target_text = Value::Array(target).canonical_text();
        let (changes, unchanged) = diff_lines(&base_text, &target_text);

        let last = format!("{}", n + 1);
        assert_eq!(
            summary(&changes),
            vec![
                "-2:  -1,".to_string(),
                "+2:  0,".to_string(),
                format!("-{}:  {}", last, n - 1),
                format!("+{}:  -2", last),
            ]
        );
        assert_eq!(unchanged, n as usize);
    }
}
