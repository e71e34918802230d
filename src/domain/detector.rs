// マッチ検出 - 全盤面フラッドフィル走査と局所ライン判定

use std::collections::VecDeque;

use crate::domain::grid::{Grid, Pos};

/// 同時に消えるタイル座標の集合
pub type MatchGroup = Vec<Pos>;

const DIRS: [(isize, isize); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// 起点と同色の4方向連結成分を返す（BFS、再帰なし）
///
/// 起点が空スロットまたは範囲外の場合は空を返す。
pub fn connected_cells(grid: &Grid, sx: usize, sy: usize) -> Vec<Pos> {
    let base = match grid.get(sx, sy) {
        Some(t) => t.kind.color,
        None => return vec![],
    };
    let mut vis = vec![false; grid.width() * grid.height()];
    let mut q = VecDeque::new();
    let mut out = Vec::new();
    vis[sy * grid.width() + sx] = true;
    q.push_back((sx, sy));
    out.push((sx, sy));
    while let Some((x, y)) = q.pop_front() {
        for (dx, dy) in DIRS {
            let nx = x as isize + dx;
            let ny = y as isize + dy;
            if nx < 0 || ny < 0 {
                continue;
            }
            let nxu = nx as usize;
            let nyu = ny as usize;
            if !grid.in_bounds(nxu, nyu) || vis[nyu * grid.width() + nxu] {
                continue;
            }
            if let Some(t) = grid.get(nxu, nyu) {
                if t.kind.color == base {
                    vis[nyu * grid.width() + nxu] = true;
                    q.push_back((nxu, nyu));
                    out.push((nxu, nyu));
                }
            }
        }
    }
    out
}

/// 全盤面走査: match_min 個以上の連結グループをすべて検出
///
/// 各セルを種として高々1回だけ調べる。成分はサイズに関わらず訪問済みに
/// するため、同一走査内で座標が二重報告されることはない。盤面を変更しない
/// 純関数であり、繰り返し呼んでも同じ結果を返す。
pub fn find_all_matches(grid: &Grid, match_min: usize) -> Vec<MatchGroup> {
    let mut vis = vec![false; grid.width() * grid.height()];
    let mut found = Vec::new();
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            if grid.get(x, y).is_none() || vis[y * grid.width() + x] {
                continue;
            }
            let g = connected_cells(grid, x, y);
            for &(gx, gy) in &g {
                vis[gy * grid.width() + gx] = true;
            }
            if g.len() >= match_min {
                found.push(g);
            }
        }
    }
    found
}

/// 局所ライン判定: 指定座標から左右・上下に同色の並びを伸ばす
///
/// 水平 match_min 個以上、垂直 match_min 個以上をそれぞれ独立に判定し、
/// 両方成立すれば起点を重複させずに合算して返す。スワップ後の2座標だけを
/// 検査する用途であり、全盤面は走査しない。
pub fn find_line_match_at(grid: &Grid, x: usize, y: usize, match_min: usize) -> MatchGroup {
    let center = match grid.get(x, y) {
        Some(t) => t.kind.color,
        None => return vec![],
    };

    let mut horizontal: Vec<Pos> = vec![(x, y)];
    let mut cx = x;
    while cx > 0 {
        cx -= 1;
        match grid.get(cx, y) {
            Some(t) if t.kind.color == center => horizontal.push((cx, y)),
            _ => break,
        }
    }
    cx = x;
    while cx + 1 < grid.width() {
        cx += 1;
        match grid.get(cx, y) {
            Some(t) if t.kind.color == center => horizontal.push((cx, y)),
            _ => break,
        }
    }

    let mut vertical: Vec<Pos> = vec![(x, y)];
    let mut cy = y;
    while cy > 0 {
        cy -= 1;
        match grid.get(x, cy) {
            Some(t) if t.kind.color == center => vertical.push((x, cy)),
            _ => break,
        }
    }
    cy = y;
    while cy + 1 < grid.height() {
        cy += 1;
        match grid.get(x, cy) {
            Some(t) if t.kind.color == center => vertical.push((x, cy)),
            _ => break,
        }
    }

    let mut matched = Vec::new();
    if horizontal.len() >= match_min {
        matched.extend_from_slice(&horizontal);
    }
    if vertical.len() >= match_min {
        for p in vertical {
            if !matched.contains(&p) {
                matched.push(p);
            }
        }
    }
    matched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tile::{Tile, TileId, TileKind};

    /// 文字の行列から盤面を構築（行の先頭が盤面の上段、'.'は空）
    fn grid_from_rows(rows: &[&str]) -> Grid {
        let h = rows.len();
        let w = rows[0].len();
        let mut grid = Grid::new(w, h).unwrap();
        let mut next_id = 1u64;
        for (ri, row) in rows.iter().enumerate() {
            let y = h - 1 - ri;
            for (x, ch) in row.chars().enumerate() {
                if ch == '.' {
                    continue;
                }
                let color = ch.to_digit(10).unwrap() as u8;
                grid.set(
                    x,
                    y,
                    Some(Tile {
                        id: TileId(next_id),
                        kind: TileKind::normal(color),
                        pos: (x, y),
                    }),
                )
                .unwrap();
                next_id += 1;
            }
        }
        grid
    }

    #[test]
    fn connected_cells_on_empty_seed_is_empty() {
        let grid = grid_from_rows(&["012", "120", "..."]);
        assert!(connected_cells(&grid, 0, 0).is_empty());
    }

    #[test]
    fn flood_finds_l_shaped_blob() {
        // 左下のL字3連結（色1）がフラッドフィルでのみマッチになる
        let grid = grid_from_rows(&[
            "0202", //
            "1023", //
            "1120", //
        ]);
        let matches = find_all_matches(&grid, 3);
        assert_eq!(matches.len(), 1);
        let mut cells = matches[0].clone();
        cells.sort_unstable();
        assert_eq!(cells, vec![(0, 0), (0, 1), (1, 0)]);
    }

    #[test]
    fn undersized_components_are_ignored() {
        let grid = grid_from_rows(&[
            "0101", //
            "1010", //
        ]);
        assert!(find_all_matches(&grid, 3).is_empty());
    }

    #[test]
    fn full_scan_is_idempotent() {
        let grid = grid_from_rows(&[
            "0001", //
            "1223", //
            "1223", //
            "1330", //
        ]);
        let first = find_all_matches(&grid, 3);
        let second = find_all_matches(&grid, 3);
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[test]
    fn no_coordinate_reported_twice_in_one_scan() {
        let grid = grid_from_rows(&[
            "1110", //
            "1230", //
            "1320", //
        ]);
        let matches = find_all_matches(&grid, 3);
        let mut all: Vec<(usize, usize)> = matches.into_iter().flatten().collect();
        let total = all.len();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), total);
    }

    #[test]
    fn line_match_horizontal_run() {
        let grid = grid_from_rows(&[
            "2220", //
            "0123", //
        ]);
        let mut m = find_line_match_at(&grid, 1, 1, 3);
        m.sort_unstable();
        assert_eq!(m, vec![(0, 1), (1, 1), (2, 1)]);
    }

    #[test]
    fn line_match_reports_both_axes_without_duplicating_seed() {
        // (1,1) を交点に水平3連・垂直3連が同時成立する十字
        let grid = grid_from_rows(&[
            ".5..", //
            "555.", //
            ".5..", //
        ]);
        let m = find_line_match_at(&grid, 1, 1, 3);
        assert_eq!(m.len(), 5);
        let dedup: std::collections::HashSet<_> = m.iter().collect();
        assert_eq!(dedup.len(), 5);
    }

    #[test]
    fn line_match_stops_at_empty_slot() {
        let grid = grid_from_rows(&[
            "33.3", //
        ]);
        assert!(find_line_match_at(&grid, 0, 0, 3).is_empty());
    }

    #[test]
    fn line_match_below_threshold_is_empty() {
        let grid = grid_from_rows(&[
            "1100", //
            "0110", //
        ]);
        assert!(find_line_match_at(&grid, 0, 1, 3).is_empty());
    }

    #[test]
    fn line_match_ignores_diagonal_blob() {
        // フラッドフィルなら届く階段状の並びもライン判定では不成立
        let grid = grid_from_rows(&[
            "10..", //
            "110.", //
            "011.", //
        ]);
        assert!(find_line_match_at(&grid, 1, 1, 3).is_empty());
    }
}
