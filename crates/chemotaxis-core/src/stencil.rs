//! Periodic finite-difference stencils on square fields.
//!
//! Both stencils wrap indices modulo N, so row 0 reads row N-1 as its previous neighbour and
//! row N-1 reads row 0 as its next one (same for columns).

use crate::field::{Field, Wrap};

/// Central-difference gradient, one component per lattice axis.
#[derive(Clone, Debug, PartialEq)]
pub struct Gradient {
    /// ∂/∂row
    pub row: Field,
    /// ∂/∂col
    pub col: Field,
}

impl Gradient {
    /// Pointwise `self.row * other.row + self.col * other.col`.
    pub fn dot(&self, other: &Gradient) -> Field {
        let n = self.row.size();
        let mut out = Field::zeros(n);
        for (((o, &ar), &ac), (&br, &bc)) in out
            .as_mut_slice()
            .iter_mut()
            .zip(self.row.as_slice())
            .zip(self.col.as_slice())
            .zip(other.row.as_slice().iter().zip(other.col.as_slice()))
        {
            *o = ar * br + ac * bc;
        }
        out
    }
}

/// 5-point Laplacian normalised by `dx * dy`:
///
/// `L[i,j] = (F[i-1,j] + F[i+1,j] + F[i,j-1] + F[i,j+1] - 4 F[i,j]) / (dx*dy)`
pub fn laplacian(field: &Field, dx: f64, dy: f64) -> Field {
    laplacian_with(field, &Wrap::new(field.size()), dx, dy)
}

/// Central difference, backward minus forward:
///
/// `G_row[i,j] = (F[i-1,j] - F[i+1,j]) / (2 dx)`, `G_col[i,j] = (F[i,j-1] - F[i,j+1]) / (2 dy)`
pub fn gradient(field: &Field, dx: f64, dy: f64) -> Gradient {
    gradient_with(field, &Wrap::new(field.size()), dx, dy)
}

pub(crate) fn laplacian_with(field: &Field, wrap: &Wrap, dx: f64, dy: f64) -> Field {
    let n = field.size();
    let area = dx * dy;
    let src = field.as_slice();
    let mut out = Field::zeros(n);
    let dst = out.as_mut_slice();
    for i in 0..n {
        let up = wrap.prev[i] * n;
        let down = wrap.next[i] * n;
        let here = i * n;
        for j in 0..n {
            let left = wrap.prev[j];
            let right = wrap.next[j];
            // Summed strictly left to right: up, down, left, right.
            dst[here + j] = (src[up + j] + src[down + j] + src[here + left] + src[here + right]
                - 4.0 * src[here + j])
                / area;
        }
    }
    out
}

pub(crate) fn gradient_with(field: &Field, wrap: &Wrap, dx: f64, dy: f64) -> Gradient {
    let n = field.size();
    let row_span = 2.0 * dx;
    let col_span = 2.0 * dy;
    let src = field.as_slice();
    let mut row = Field::zeros(n);
    let mut col = Field::zeros(n);
    {
        let row_out = row.as_mut_slice();
        let col_out = col.as_mut_slice();
        for i in 0..n {
            let up = wrap.prev[i] * n;
            let down = wrap.next[i] * n;
            let here = i * n;
            for j in 0..n {
                row_out[here + j] = (src[up + j] - src[down + j]) / row_span;
                col_out[here + j] =
                    (src[here + wrap.prev[j]] - src[here + wrap.next[j]]) / col_span;
            }
        }
    }
    Gradient { row, col }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha12Rng;

    fn impulse(n: usize, row: usize, col: usize, value: f64) -> Field {
        let mut f = Field::zeros(n);
        f.set(row, col, value);
        f
    }

    #[test]
    fn laplacian_of_constant_field_is_exactly_zero() {
        let mut rng = ChaCha12Rng::seed_from_u64(7);
        for n in 1..=6 {
            for _ in 0..20 {
                let c = rng.random_range(-1.0e6..1.0e6);
                let lap = laplacian(&Field::constant(n, c), 0.3, 1.7);
                assert!(lap.as_slice().iter().all(|&v| v == 0.0), "n={n} c={c}");
            }
        }
    }

    #[test]
    fn gradient_of_constant_field_is_exactly_zero() {
        for n in 1..=5 {
            let g = gradient(&Field::constant(n, 0.1), 0.5, 2.0);
            assert!(g.row.as_slice().iter().all(|&v| v == 0.0));
            assert!(g.col.as_slice().iter().all(|&v| v == 0.0));
        }
    }

    #[test]
    fn laplacian_wraps_at_boundary_rows_and_columns() {
        let n = 5;
        let lap = laplacian(&impulse(n, 0, 0, 1.0), 1.0, 1.0);
        assert_eq!(lap.get(0, 0), -4.0);
        assert_eq!(lap.get(n - 1, 0), 1.0);
        assert_eq!(lap.get(1, 0), 1.0);
        assert_eq!(lap.get(0, n - 1), 1.0);
        assert_eq!(lap.get(0, 1), 1.0);
        assert_eq!(lap.get(n - 1, n - 1), 0.0);
        assert_eq!(lap.sum(), 0.0);
    }

    #[test]
    fn laplacian_sums_neighbours_in_reference_order() {
        let f = Field::from_rows(&[
            vec![0.1, 0.7, 0.3],
            vec![0.9, 0.2, 0.6],
            vec![0.4, 0.8, 0.5],
        ])
        .unwrap();
        let lap = laplacian(&f, 1.0, 1.0);
        // ((up + down) + left) + right - 4 * centre, evaluated cell by cell.
        let expected = [
            [1.9, -1.3999999999999997, 0.7000000000000002],
            [-2.3, 2.2, -0.5],
            [0.6999999999999997, -1.4000000000000004, 0.10000000000000009],
        ];
        for (i, row) in expected.iter().enumerate() {
            for (j, &value) in row.iter().enumerate() {
                assert_eq!(lap.get(i, j), value, "laplacian at ({i}, {j})");
            }
        }
        // Pairing (up + down) + (left + right) rounds differently here.
        assert_eq!(lap.get(0, 1), 0.8 + 0.2 + 0.1 + 0.3 - 4.0 * 0.7);
        assert_ne!(lap.get(0, 1), (0.8 + 0.2) + (0.1 + 0.3) - 4.0 * 0.7);
    }

    #[test]
    fn laplacian_normalises_by_cell_area() {
        let lap = laplacian(&impulse(4, 2, 2, 1.0), 0.5, 4.0);
        assert_eq!(lap.get(2, 2), -2.0);
        assert_eq!(lap.get(1, 2), 0.5);
        assert_eq!(lap.get(2, 3), 0.5);
    }

    #[test]
    fn gradient_wraps_and_uses_backward_minus_forward() {
        let n = 4;
        let g = gradient(&impulse(n, 0, 0, 1.0), 0.5, 2.0);
        // Row N-1 sees the impulse as its forward neighbour.
        assert_eq!(g.row.get(n - 1, 0), -1.0);
        // Row 1 sees it as its backward neighbour.
        assert_eq!(g.row.get(1, 0), 1.0);
        assert_eq!(g.row.get(0, 0), 0.0);
        assert_eq!(g.col.get(0, n - 1), -0.25);
        assert_eq!(g.col.get(0, 1), 0.25);
        assert_eq!(g.col.get(1, 0), 0.0);
    }

    #[test]
    fn single_cell_grid_is_its_own_neighbour() {
        let f = Field::constant(1, 3.0);
        assert_eq!(laplacian(&f, 1.0, 1.0).get(0, 0), 0.0);
        assert_eq!(gradient(&f, 1.0, 1.0).row.get(0, 0), 0.0);
    }

    #[test]
    fn dot_combines_both_axes() {
        let a = Gradient {
            row: Field::constant(2, 2.0),
            col: Field::constant(2, 3.0),
        };
        let b = Gradient {
            row: Field::constant(2, -1.0),
            col: Field::constant(2, 4.0),
        };
        assert!(a.dot(&b).as_slice().iter().all(|&v| v == 10.0));
    }
}
