use tracing::{info, warn};

use super::{TileGrid, Vec2};

/// Walkable tile nearest the top-right corner, searched in square rings.
///
/// Each ring checks its top edge, bottom edge, left edge and then right edge,
/// so ties resolve in that order.
pub fn find_start_tile(grid: &TileGrid) -> Option<(i64, i64)> {
    let origin_x = grid.columns() as i64 - 1;
    let origin_y = 0i64;
    if grid.is_walkable(origin_x, origin_y) {
        return Some((origin_x, origin_y));
    }

    let max_radius = grid.columns().max(grid.rows()) as i64;
    (1..max_radius).find_map(|radius| {
        let horizontal = (-radius..=radius).map(|dx| origin_x + dx);
        let vertical = (-radius + 1..radius).map(|dy| origin_y + dy);

        let top = horizontal.clone().map(|x| (x, origin_y - radius));
        let bottom = horizontal.map(|x| (x, origin_y + radius));
        let left = vertical.clone().map(|y| (origin_x - radius, y));
        let right = vertical.map(|y| (origin_x + radius, y));

        top.chain(bottom)
            .chain(left)
            .chain(right)
            .find(|&(x, y)| grid.is_walkable(x, y))
    })
}

/// World position the player starts at: the centre of the start tile, or the
/// map centre when no tile is walkable.
pub fn start_position(grid: &TileGrid) -> Vec2 {
    match find_start_tile(grid).and_then(|(x, y)| grid.tile_center_world(x, y)) {
        Some((world_x, world_y)) => {
            info!(world_x, world_y, "player_start_tile_found");
            Vec2::new(world_x, world_y)
        }
        None => {
            let center = Vec2::new(grid.world_width() / 2.0, grid.world_height() / 2.0);
            warn!(
                world_x = center.x,
                world_y = center.y,
                "player_start_tile_missing_using_map_center"
            );
            center
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_with_walkable(columns: u32, rows: u32, walkable: &[(u32, u32)]) -> TileGrid {
        let mut cells = vec![false; (columns * rows) as usize];
        for &(x, y) in walkable {
            cells[(y * columns + x) as usize] = true;
        }
        TileGrid::new(
            32,
            32,
            columns,
            rows,
            vec![None; (columns * rows) as usize],
            cells,
        )
        .expect("grid")
    }

    #[test]
    fn top_right_corner_is_preferred() {
        let grid = grid_with_walkable(4, 3, &[(3, 0), (0, 0)]);
        assert_eq!(find_start_tile(&grid), Some((3, 0)));
        assert_eq!(start_position(&grid), Vec2::new(112.0, 16.0));
    }

    #[test]
    fn nearest_ring_wins() {
        let grid = grid_with_walkable(6, 6, &[(0, 5), (4, 2), (1, 1)]);
        // (4, 2) sits on ring 2 around (5, 0); (1, 1) is on ring 4.
        assert_eq!(find_start_tile(&grid), Some((4, 2)));
    }

    #[test]
    fn bottom_edge_is_checked_before_left_edge() {
        // Both on ring 1: (4, 1) on the bottom edge, (3, 0) on the left edge.
        let grid = grid_with_walkable(5, 5, &[(3, 0), (4, 1)]);
        assert_eq!(find_start_tile(&grid), Some((4, 1)));
    }

    #[test]
    fn far_corner_is_reachable() {
        let grid = grid_with_walkable(7, 3, &[(0, 2)]);
        assert_eq!(find_start_tile(&grid), Some((0, 2)));
    }

    #[test]
    fn fully_blocked_map_falls_back_to_center() {
        let grid = grid_with_walkable(4, 2, &[]);
        assert_eq!(find_start_tile(&grid), None);
        assert_eq!(start_position(&grid), Vec2::new(64.0, 32.0));
    }
}
