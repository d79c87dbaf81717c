//! Butcher tableau of the 13-stage Runge-Kutta-Fehlberg 7(8) pair.
//!
//! Fehlberg, E. (1968). NASA TR R-287, Table X. The 8th-order weights
//! advance the solution; the difference to the 7th-order weights is the
//! local error estimate.

/// Number of stages.
pub const STAGES: usize = 13;

/// Order of the propagated solution.
pub const ORDER: u8 = 8;

/// Order of the embedded solution used for the error estimate.
pub const EMBEDDED_ORDER: u8 = 7;

/// Nodes: stage `i` is evaluated at `t + C[i] * h`.
pub const C: [f64; STAGES] = [
    0.0,
    2.0 / 27.0,
    1.0 / 9.0,
    1.0 / 6.0,
    5.0 / 12.0,
    1.0 / 2.0,
    5.0 / 6.0,
    1.0 / 6.0,
    2.0 / 3.0,
    1.0 / 3.0,
    1.0,
    0.0,
    1.0,
];

/// Stage coupling, stored sparsely as `(row, column, value)` triples.
///
/// Missing entries are zero. Rows only reference earlier stages.
const A_ENTRIES: &[(usize, usize, f64)] = &[
    (1, 0, 2.0 / 27.0),
    (2, 0, 1.0 / 36.0),
    (2, 1, 1.0 / 12.0),
    (3, 0, 1.0 / 24.0),
    (3, 2, 1.0 / 8.0),
    (4, 0, 5.0 / 12.0),
    (4, 2, -25.0 / 16.0),
    (4, 3, 25.0 / 16.0),
    (5, 0, 1.0 / 20.0),
    (5, 3, 1.0 / 4.0),
    (5, 4, 1.0 / 5.0),
    (6, 0, -25.0 / 108.0),
    (6, 3, 125.0 / 108.0),
    (6, 4, -65.0 / 27.0),
    (6, 5, 125.0 / 54.0),
    (7, 0, 31.0 / 300.0),
    (7, 4, 61.0 / 225.0),
    (7, 5, -2.0 / 9.0),
    (7, 6, 13.0 / 900.0),
    (8, 0, 2.0),
    (8, 3, -53.0 / 6.0),
    (8, 4, 704.0 / 45.0),
    (8, 5, -107.0 / 9.0),
    (8, 6, 67.0 / 90.0),
    (8, 7, 3.0),
    (9, 0, -91.0 / 108.0),
    (9, 3, 23.0 / 108.0),
    (9, 4, -976.0 / 135.0),
    (9, 5, 311.0 / 54.0),
    (9, 6, -19.0 / 60.0),
    (9, 7, 17.0 / 6.0),
    (9, 8, -1.0 / 12.0),
    (10, 0, 2383.0 / 4100.0),
    (10, 3, -341.0 / 164.0),
    (10, 4, 4496.0 / 1025.0),
    (10, 5, -301.0 / 82.0),
    (10, 6, 2133.0 / 4100.0),
    (10, 7, 45.0 / 82.0),
    (10, 8, 45.0 / 164.0),
    (10, 9, 18.0 / 41.0),
    (11, 0, 3.0 / 205.0),
    (11, 5, -6.0 / 41.0),
    (11, 6, -3.0 / 205.0),
    (11, 7, -3.0 / 41.0),
    (11, 8, 3.0 / 41.0),
    (11, 9, 6.0 / 41.0),
    (12, 0, -1777.0 / 4100.0),
    (12, 3, -341.0 / 164.0),
    (12, 4, 4496.0 / 1025.0),
    (12, 5, -289.0 / 82.0),
    (12, 6, 2193.0 / 4100.0),
    (12, 7, 51.0 / 82.0),
    (12, 8, 33.0 / 164.0),
    (12, 9, 12.0 / 41.0),
    (12, 11, 1.0),
];

/// Dense lower-triangular coupling matrix, `A[i][j]` for `j < i`.
pub const A: [[f64; STAGES - 1]; STAGES] = expand(A_ENTRIES);

const fn expand(entries: &[(usize, usize, f64)]) -> [[f64; STAGES - 1]; STAGES] {
    let mut a = [[0.0; STAGES - 1]; STAGES];
    let mut n = 0;
    while n < entries.len() {
        let (i, j, value) = entries[n];
        a[i][j] = value;
        n += 1;
    }
    a
}

/// 8th-order weights. Stages 0 and 10 only enter the 7th-order solution.
pub const B: [f64; STAGES] = [
    0.0,
    0.0,
    0.0,
    0.0,
    0.0,
    34.0 / 105.0,
    9.0 / 35.0,
    9.0 / 35.0,
    9.0 / 280.0,
    9.0 / 280.0,
    0.0,
    41.0 / 840.0,
    41.0 / 840.0,
];

/// Error weights `b - b_hat`: the truncation error is
/// `(41/840) * (k11 + k12 - k0 - k10) * h`.
pub const B_ERR: [f64; STAGES] = [
    -41.0 / 840.0,
    0.0,
    0.0,
    0.0,
    0.0,
    0.0,
    0.0,
    0.0,
    0.0,
    0.0,
    -41.0 / 840.0,
    41.0 / 840.0,
    41.0 / 840.0,
];
