use crate::grid::Grid;

/// Turn the given grid into a rendered string, one line per row. Cells whose letter is settled
/// show it, other cells in some slot show `.`, and cells outside every slot show `#`.
pub fn render_grid(grid: &Grid) -> String {
    (0..grid.height())
        .map(|y| {
            (0..grid.width())
                .map(|x| {
                    if !grid.is_covered((x, y)) {
                        '#'
                    } else {
                        grid.letter_at((x, y)).unwrap_or('.')
                    }
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
