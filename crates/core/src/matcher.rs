//! Match detection - pure scans over board state
//!
//! A match is a maximal straight run of at least `min_run` equal kinds.
//! Rows are scanned first (top to bottom, left to right), then columns.
//! Runs of the same kind that share a tile (L, T and + shapes) are merged into
//! one [`Match`] unless `merge_intersections` is off, in which case every
//! straight run is reported on its own. The set of cells to remove is the same
//! either way; only scoring sees the difference.

use std::collections::BTreeSet;

use arrayvec::ArrayVec;

use crate::board::Board;
use crate::types::{JewelKind, Pos, DEFAULT_MIN_RUN, MAX_BOARD_DIM};

/// Detection rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatchRules {
    /// Shortest run that counts.
    pub min_run: u8,
    /// Union same-kind runs that cross or touch at a shared tile.
    pub merge_intersections: bool,
}

impl Default for MatchRules {
    fn default() -> Self {
        Self {
            min_run: DEFAULT_MIN_RUN,
            merge_intersections: true,
        }
    }
}

/// Geometry of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchShape {
    /// All cells in one row or one column.
    Line,
    /// Crossing runs merged together (L, T, +).
    Intersection,
}

/// A group of same-kind cells removed together.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Match {
    kind: JewelKind,
    cells: BTreeSet<Pos>,
}

impl Match {
    pub fn kind(&self) -> JewelKind {
        self.kind
    }

    /// Cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Pos> + '_ {
        self.cells.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, pos: Pos) -> bool {
        self.cells.contains(&pos)
    }

    pub fn shape(&self) -> MatchShape {
        let mut iter = self.cells.iter();
        let Some(first) = iter.next() else {
            return MatchShape::Line;
        };
        let same_row = self.cells.iter().all(|p| p.row == first.row);
        let same_col = self.cells.iter().all(|p| p.col == first.col);
        if same_row || same_col {
            MatchShape::Line
        } else {
            MatchShape::Intersection
        }
    }
}

/// All matches on a board at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct MatchSet {
    matches: Vec<Match>,
}

impl MatchSet {
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Match> {
        self.matches.iter()
    }

    /// Union of every matched cell.
    pub fn positions(&self) -> BTreeSet<Pos> {
        self.matches.iter().flat_map(|m| m.cells()).collect()
    }

    pub fn contains(&self, pos: Pos) -> bool {
        self.matches.iter().any(|m| m.contains(pos))
    }
}

impl<'a> IntoIterator for &'a MatchSet {
    type Item = &'a Match;
    type IntoIter = std::slice::Iter<'a, Match>;

    fn into_iter(self) -> Self::IntoIter {
        self.matches.iter()
    }
}

/// A maximal straight run found during scanning.
#[derive(Debug, Clone)]
struct Run {
    kind: JewelKind,
    cells: ArrayVec<Pos, { MAX_BOARD_DIM as usize }>,
}

/// Find every match on the board.
pub fn find_matches(board: &Board, rules: &MatchRules) -> MatchSet {
    let runs = scan_runs(board, rules.min_run);
    if runs.is_empty() {
        return MatchSet::default();
    }

    let mut matches: Vec<Match> = if rules.merge_intersections {
        merge_runs(board, &runs)
    } else {
        runs.into_iter()
            .map(|run| Match {
                kind: run.kind,
                cells: run.cells.into_iter().collect(),
            })
            .collect()
    };

    // Row-major by first cell, then by the remaining cells, so fixtures are stable.
    matches.sort_by(|a, b| a.cells.iter().cmp(b.cells.iter()));
    MatchSet { matches }
}

/// True when a run of at least `min_run` passes through `pos`.
pub fn has_match_at(board: &Board, pos: Pos, min_run: u8) -> bool {
    let Some(kind) = board.kind_at(pos) else {
        return false;
    };
    let horizontal = 1 + count_dir(board, pos, kind, 0, -1) + count_dir(board, pos, kind, 0, 1);
    if horizontal >= min_run as u32 {
        return true;
    }
    let vertical = 1 + count_dir(board, pos, kind, -1, 0) + count_dir(board, pos, kind, 1, 0);
    vertical >= min_run as u32
}

fn count_dir(board: &Board, from: Pos, kind: JewelKind, dr: i16, dc: i16) -> u32 {
    let mut n = 0;
    let mut r = from.row as i16 + dr;
    let mut c = from.col as i16 + dc;
    while r >= 0 && c >= 0 && r < board.rows() as i16 && c < board.cols() as i16 {
        if board.kind_at(Pos::new(r as u8, c as u8)) != Some(kind) {
            break;
        }
        n += 1;
        r += dr;
        c += dc;
    }
    n
}

fn scan_runs(board: &Board, min_run: u8) -> Vec<Run> {
    let mut runs = Vec::new();
    for row in 0..board.rows() {
        scan_line(
            board,
            (0..board.cols()).map(|col| Pos::new(row, col)),
            min_run,
            &mut runs,
        );
    }
    for col in 0..board.cols() {
        scan_line(
            board,
            (0..board.rows()).map(|row| Pos::new(row, col)),
            min_run,
            &mut runs,
        );
    }
    runs
}

fn scan_line(
    board: &Board,
    line: impl Iterator<Item = Pos>,
    min_run: u8,
    out: &mut Vec<Run>,
) {
    let mut current: Option<Run> = None;

    for pos in line {
        let kind = board.kind_at(pos);
        if let (Some(run), Some(k)) = (current.as_mut(), kind) {
            if run.kind == k {
                run.cells.push(pos);
                continue;
            }
        }
        if let Some(done) = current.take() {
            push_if_long(done, min_run, out);
        }
        current = kind.map(|k| {
            let mut cells = ArrayVec::new();
            cells.push(pos);
            Run { kind: k, cells }
        });
    }
    if let Some(done) = current {
        push_if_long(done, min_run, out);
    }
}

fn push_if_long(run: Run, min_run: u8, out: &mut Vec<Run>) {
    if run.cells.len() >= min_run as usize {
        out.push(run);
    }
}

/// Union runs that share a cell. Shared cells always have one kind, so only
/// same-kind runs can ever be joined.
fn merge_runs(board: &Board, runs: &[Run]) -> Vec<Match> {
    let mut parent: Vec<usize> = (0..runs.len()).collect();
    let mut owner: Vec<Option<usize>> = vec![None; board.rows() as usize * board.cols() as usize];
    let cols = board.cols() as usize;

    for (i, run) in runs.iter().enumerate() {
        for pos in &run.cells {
            let idx = pos.row as usize * cols + pos.col as usize;
            match owner[idx] {
                Some(j) => union(&mut parent, i, j),
                None => owner[idx] = Some(i),
            }
        }
    }

    let mut groups: Vec<(usize, Match)> = Vec::new();
    for (i, run) in runs.iter().enumerate() {
        let root = find(&mut parent, i);
        match groups.iter_mut().find(|(r, _)| *r == root) {
            Some((_, m)) => m.cells.extend(run.cells.iter().copied()),
            None => groups.push((
                root,
                Match {
                    kind: run.kind,
                    cells: run.cells.iter().copied().collect(),
                },
            )),
        }
    }
    groups.into_iter().map(|(_, m)| m).collect()
}

fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

fn union(parent: &mut [usize], a: usize, b: usize) {
    let ra = find(parent, a);
    let rb = find(parent, b);
    if ra != rb {
        // Lower index wins so roots follow scan order.
        let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
        parent[hi] = lo;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions(list: &[(u8, u8)]) -> BTreeSet<Pos> {
        list.iter().map(|&(r, c)| Pos::new(r, c)).collect()
    }

    #[test]
    fn test_no_matches_on_stable_board() {
        let board = Board::parse(&["RGB", "YPW", "ORG"]).unwrap();
        assert!(find_matches(&board, &MatchRules::default()).is_empty());
    }

    #[test]
    fn test_horizontal_run_of_three() {
        let board = Board::parse(&["RRR", "OYG", "BPW"]).unwrap();
        let found = find_matches(&board, &MatchRules::default());
        assert_eq!(found.len(), 1);
        assert_eq!(found.positions(), positions(&[(0, 0), (0, 1), (0, 2)]));
        let m = found.iter().next().unwrap();
        assert_eq!(m.kind(), JewelKind::Red);
        assert_eq!(m.shape(), MatchShape::Line);
    }

    #[test]
    fn test_vertical_run_is_maximal() {
        let board = Board::parse(&["GRB", "GYB", "GOW", "GPR"]).unwrap();
        let found = find_matches(&board, &MatchRules::default());
        assert_eq!(found.len(), 1);
        assert_eq!(found.iter().next().unwrap().len(), 4);
    }

    #[test]
    fn test_pairs_are_not_reported() {
        let board = Board::parse(&["RRG", "GBB", "YOY"]).unwrap();
        assert!(find_matches(&board, &MatchRules::default()).is_empty());
    }

    #[test]
    fn test_l_shape_is_merged() {
        let board = Board::parse(&["RRR", "RGB", "RBG"]).unwrap();
        let found = find_matches(&board, &MatchRules::default());
        assert_eq!(found.len(), 1);
        let m = found.iter().next().unwrap();
        assert_eq!(m.len(), 5);
        assert_eq!(m.shape(), MatchShape::Intersection);
    }

    #[test]
    fn test_l_shape_unmerged_reports_both_runs() {
        let board = Board::parse(&["RRR", "RGB", "RBG"]).unwrap();
        let rules = MatchRules {
            merge_intersections: false,
            ..MatchRules::default()
        };
        let found = find_matches(&board, &rules);
        assert_eq!(found.len(), 2);
        // Same removal set either way.
        assert_eq!(found.positions().len(), 5);
        assert!(found.iter().all(|m| m.shape() == MatchShape::Line));
    }

    #[test]
    fn test_separate_runs_stay_separate() {
        let board = Board::parse(&["RRRG", "BGYO", "BBBY"]).unwrap();
        let found = find_matches(&board, &MatchRules::default());
        assert_eq!(found.len(), 2);
        let kinds: Vec<JewelKind> = found.iter().map(|m| m.kind()).collect();
        assert_eq!(kinds, vec![JewelKind::Red, JewelKind::Blue]);
    }

    #[test]
    fn test_empty_slots_break_runs() {
        let board = Board::parse(&["RR.R", "GBYO", "BGOY"]).unwrap();
        assert!(find_matches(&board, &MatchRules::default()).is_empty());
    }

    #[test]
    fn test_min_run_four() {
        let board = Board::parse(&["RRRG", "BGYO", "GBOY"]).unwrap();
        let rules = MatchRules {
            min_run: 4,
            ..MatchRules::default()
        };
        assert!(find_matches(&board, &rules).is_empty());
    }

    #[test]
    fn test_has_match_at() {
        let board = Board::parse(&["RRR", "OYG", "BPW"]).unwrap();
        assert!(has_match_at(&board, Pos::new(0, 1), 3));
        assert!(!has_match_at(&board, Pos::new(1, 1), 3));
        assert!(!has_match_at(&board, Pos::new(5, 5), 3));
    }
}
