//! QWERTY keyboard geometry.
//!
//! Static description of the physical layout consumed by the corruption
//! operators: key coordinates, 3×3 adjacency (diagonals included), and
//! whole-row column shifts. Characters that are not on the grid (punctuation,
//! whitespace) have no neighbors, which makes every operator a no-op on them.

/// Letter rows, top to bottom, in physical column order.
pub const LETTER_ROWS: [&str; 3] = ["qwertyuiop", "asdfghjkl", "zxcvbnm"];

/// Neighbor table for the digit row.
///
/// Digits sit above the letter grid; their neighborhood mixes digits and the
/// top letter row. Kept as a literal table because the digit row does not
/// share the letter grid's coordinates.
const DIGIT_NEIGHBORS: &[(char, &str)] = &[
    ('1', "q2"),
    ('2', "w13"),
    ('3', "e24"),
    ('4', "r35"),
    ('5', "t46"),
    ('6', "y57"),
    ('7', "u68"),
    ('8', "i79"),
    ('9', "o80"),
    ('0', "p9"),
];

/// Grid coordinates `(row, col)` for a lowercase letter, if it is on the grid.
pub fn key_position(c: char) -> Option<(usize, usize)> {
    for (row, keys) in LETTER_ROWS.iter().enumerate() {
        if let Some(col) = keys.find(c) {
            return Some((row, col));
        }
    }
    None
}

/// All keys within the 3×3 neighborhood of `c` (lowercased), excluding `c`
/// itself. Off-grid characters yield an empty set.
///
/// Iteration order is row-major and therefore stable, which keeps seeded
/// random draws reproducible.
pub fn adjacent_keys(c: char) -> Vec<char> {
    let c = c.to_ascii_lowercase();

    if let Some((row, col)) = key_position(c) {
        let mut out = Vec::new();
        for (r, keys) in LETTER_ROWS.iter().enumerate() {
            if r + 1 < row || r > row + 1 {
                continue;
            }
            for (k_col, k) in keys.chars().enumerate() {
                let col_near = k_col + 1 >= col && k_col <= col + 1;
                if col_near && k != c {
                    out.push(k);
                }
            }
        }
        return out;
    }

    if let Some((_, neighbors)) = DIGIT_NEIGHBORS.iter().find(|(d, _)| *d == c) {
        return neighbors.chars().collect();
    }

    Vec::new()
}

/// The key one column over on the same row (`shift` of ±1), simulating a hand
/// resting off-position. Edge keys and off-grid characters map to themselves.
pub fn shifted_key(c: char, shift: i32) -> char {
    let lower = c.to_ascii_lowercase();
    let Some((row, col)) = key_position(lower) else {
        return c;
    };

    let keys = LETTER_ROWS[row].as_bytes();
    let new_col = col as i32 + shift;
    if new_col < 0 || new_col as usize >= keys.len() {
        return c;
    }

    let shifted = keys[new_col as usize] as char;
    if c.is_ascii_uppercase() {
        shifted.to_ascii_uppercase()
    } else {
        shifted
    }
}
