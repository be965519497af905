//! Test data generators for synthetic field contents.
//!
//! These generators create predictable, verifiable patterns so a strided
//! read can be checked element by element against the source position.

/// Creates a test grid with predictable values.
///
/// Each cell value is calculated as: `col * 1000 + row`
///
/// This makes it easy to verify that data is being read correctly
/// by checking that grid[row][col] == col * 1000 + row.
///
/// # Returns
///
/// A `Vec<f32>` in row-major order (row 0 first, then row 1, etc.)
///
/// # Example
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!(grid.len(), 50); // 10 * 5
/// assert_eq!(grid[0], 0.0);   // col=0, row=0 -> 0*1000 + 0
/// assert_eq!(grid[1], 1000.0); // col=1, row=0 -> 1*1000 + 0
/// assert_eq!(grid[10], 1.0);  // col=0, row=1 -> 0*1000 + 1
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f32);
        }
    }
    data
}

/// Same pattern as [`create_test_grid`] with `i32` cells.
pub fn create_test_grid_i32(width: usize, height: usize) -> Vec<i32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as i32);
        }
    }
    data
}

/// Expected value of [`create_test_grid`] at (`row`, `col`).
pub fn test_grid_value(row: usize, col: usize) -> f32 {
    (col * 1000 + row) as f32
}

/// Creates a 3-D cube where each value encodes its position as
/// `band * 10000 + row * 100 + col`.
pub fn create_test_cube(bands: usize, height: usize, width: usize) -> Vec<f64> {
    let mut data = Vec::with_capacity(bands * height * width);
    for band in 0..bands {
        for row in 0..height {
            for col in 0..width {
                data.push((band * 10000 + row * 100 + col) as f64);
            }
        }
    }
    data
}

/// Creates a monotonically increasing sequence, e.g. scan times.
pub fn create_sequence(len: usize, start: f64, step: f64) -> Vec<f64> {
    (0..len).map(|i| start + i as f64 * step).collect()
}

/// Creates ASCII text of exactly `len` bytes cycling through `A..Z`.
pub fn create_long_text(len: usize) -> String {
    (0..len).map(|i| (b'A' + (i % 26) as u8) as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_grid() {
        let grid = create_test_grid(10, 5);
        assert_eq!(grid.len(), 50);
        assert_eq!(grid[0], 0.0);
        assert_eq!(grid[1], 1000.0);
        assert_eq!(grid[10], 1.0);
        assert_eq!(grid[3 * 10 + 7], test_grid_value(3, 7));
    }

    #[test]
    fn test_create_test_cube() {
        let cube = create_test_cube(2, 3, 4);
        assert_eq!(cube.len(), 24);
        assert_eq!(cube[12 + 4 + 3], 10103.0);
    }

    #[test]
    fn test_create_long_text() {
        let text = create_long_text(30);
        assert_eq!(text.len(), 30);
        assert!(text.starts_with("ABC"));
        assert_eq!(&text[26..28], "AB");
    }
}
