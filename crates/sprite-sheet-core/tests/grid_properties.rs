use rand::Rng;
use sprite_sheet_core::{Rect, TileSize, plan_grid};

#[test]
fn grid_dimensions_follow_frame_count_and_columns() {
    let mut rng = rand::thread_rng();
    for _ in 0..500 {
        let n: usize = rng.gen_range(1..=200);
        let max_cols: u32 = rng.gen_range(1..=32);
        let tile = TileSize::new(rng.gen_range(1..=128), rng.gen_range(1..=128));
        let g = plan_grid(tile, n, max_cols).expect("plan");

        assert_eq!(g.columns as usize, n.min(max_cols as usize));
        let expected_rows = if n > max_cols as usize {
            n.div_ceil(g.columns as usize)
        } else {
            1
        };
        assert_eq!(g.rows as usize, expected_rows);
        assert!(g.columns >= 1 && g.rows >= 1);
        assert_eq!(g.canvas_width, tile.width * g.columns);
        assert_eq!(g.canvas_height, tile.height * g.rows);
        // enough cells, and never a whole spare row
        assert!(g.slots() >= n);
        assert!(g.slots() - n < g.columns as usize);
    }
}

#[test]
fn placements_are_disjoint_and_inside_canvas() {
    let mut rng = rand::thread_rng();
    for _ in 0..50 {
        let n: usize = rng.gen_range(1..=40);
        let max_cols: u32 = rng.gen_range(1..=12);
        let tile = TileSize::new(rng.gen_range(1..=16), rng.gen_range(1..=16));
        let g = plan_grid(tile, n, max_cols).expect("plan");
        let canvas = g.canvas_rect();
        let slots: Vec<Rect> = (0..n).map(|i| g.slot(i)).collect();
        for (i, a) in slots.iter().enumerate() {
            assert!(canvas.contains(a), "slot {i} outside canvas: {a:?}");
            for (j, b) in slots.iter().enumerate().skip(i + 1) {
                assert!(!a.intersects(b), "slots {i} and {j} overlap: {a:?} {b:?}");
            }
        }
    }
}

#[test]
fn placement_is_row_major() {
    let g = plan_grid(TileSize::new(10, 20), 7, 3).expect("plan");
    let expected = [(0, 0), (10, 0), (20, 0), (0, 20), (10, 20), (20, 20), (0, 40)];
    for (i, pos) in expected.iter().enumerate() {
        assert_eq!(g.placement(i), *pos, "index {i}");
    }
}
