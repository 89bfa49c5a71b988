//! Gated linear sum assignment.
//!
//! Hungarian (Kuhn-Munkres) algorithm with row/column potentials, extended
//! with one "stay unmatched" column per row so that rows and columns may be
//! left unassigned when every pairing is at or beyond the gate.
#![allow(clippy::needless_range_loop)]

use nalgebra::DMatrix;

/// Represents a match between a row index and column index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub row_idx: usize,
    pub col_idx: usize,
}

/// Solve the gated assignment problem.
///
/// Minimizes the total cost of the kept pairs plus `gate` for every row left
/// unmatched, so a pair is only worth taking when its cost is below the gate.
/// Pairs with cost `>= gate` (or non-finite cost) are never returned.
///
/// # Arguments
/// * `cost_matrix` - Cost matrix where cost[(i, j)] is the cost of assigning row i to column j
/// * `gate` - Exclusive upper bound on accepted pair cost
///
/// # Returns
/// Accepted (row, col) pairs sorted by row. Rows and columns absent from the
/// result stay unmatched.
pub fn linear_sum_assignment(cost_matrix: &DMatrix<f64>, gate: f64) -> Vec<Assignment> {
    let num_rows = cost_matrix.nrows();
    let num_cols = cost_matrix.ncols();

    if num_rows == 0 || num_cols == 0 {
        return Vec::new();
    }

    let feasible = |c: f64| c.is_finite() && c < gate;

    // Cost of leaving a row unmatched. With no finite gate, make it dominate
    // every feasible pair so the solver maximizes the number of matches first.
    let unmatched_cost = if gate.is_finite() {
        gate
    } else {
        cost_matrix.iter().filter(|&&c| feasible(c)).map(|c| c.abs()).sum::<f64>() + 1.0
    };
    // Strictly worse than leaving every row unmatched.
    let forbidden = unmatched_cost * (num_rows as f64 + 1.0) + 1.0;

    // Augmented matrix: real columns followed by one private dummy column per row
    let width = num_cols + num_rows;
    let mut cost = vec![vec![forbidden; width]; num_rows];
    for i in 0..num_rows {
        for j in 0..num_cols {
            let c = cost_matrix[(i, j)];
            if feasible(c) {
                cost[i][j] = c;
            }
        }
        cost[i][num_cols + i] = unmatched_cost;
    }

    hungarian(&cost)
        .into_iter()
        .enumerate()
        .filter(|&(row_idx, col_idx)| col_idx < num_cols && feasible(cost_matrix[(row_idx, col_idx)]))
        .map(|(row_idx, col_idx)| Assignment { row_idx, col_idx })
        .collect()
}

/// Minimum cost assignment of every row for an n x m matrix with n <= m.
///
/// Returns `result[i] = j`, the column assigned to row i.
fn hungarian(cost: &[Vec<f64>]) -> Vec<usize> {
    let n = cost.len();
    let m = cost[0].len();
    debug_assert!(n <= m);

    // 1-indexed potentials; column 0 is the virtual root of each augmenting search
    let mut u = vec![0.0; n + 1];
    let mut v = vec![0.0; m + 1];
    let mut col_owner = vec![0usize; m + 1];
    let mut way = vec![0usize; m + 1];

    for row in 1..=n {
        col_owner[0] = row;
        let mut j0 = 0;
        let mut min_slack = vec![f64::INFINITY; m + 1];
        let mut used = vec![false; m + 1];

        loop {
            used[j0] = true;
            let i0 = col_owner[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0;

            for j in 1..=m {
                if used[j] {
                    continue;
                }
                let slack = cost[i0 - 1][j - 1] - u[i0] - v[j];
                if slack < min_slack[j] {
                    min_slack[j] = slack;
                    way[j] = j0;
                }
                if min_slack[j] < delta {
                    delta = min_slack[j];
                    j1 = j;
                }
            }

            for j in 0..=m {
                if used[j] {
                    u[col_owner[j]] += delta;
                    v[j] -= delta;
                } else {
                    min_slack[j] -= delta;
                }
            }

            j0 = j1;
            if col_owner[j0] == 0 {
                break;
            }
        }

        // Flip the augmenting path
        loop {
            let j1 = way[j0];
            col_owner[j0] = col_owner[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut row_to_col = vec![0usize; n];
    for j in 1..=m {
        if col_owner[j] != 0 {
            row_to_col[col_owner[j] - 1] = j - 1;
        }
    }
    row_to_col
}

#[cfg(test)]
mod tests {
    use super::*;

    fn total_cost(cost: &DMatrix<f64>, assignments: &[Assignment]) -> f64 {
        assignments.iter().map(|a| cost[(a.row_idx, a.col_idx)]).sum()
    }

    fn unmatched_rows(num_rows: usize, assignments: &[Assignment]) -> Vec<usize> {
        (0..num_rows)
            .filter(|&i| assignments.iter().all(|a| a.row_idx != i))
            .collect()
    }

    fn unmatched_cols(num_cols: usize, assignments: &[Assignment]) -> Vec<usize> {
        (0..num_cols)
            .filter(|&j| assignments.iter().all(|a| a.col_idx != j))
            .collect()
    }

    #[test]
    fn test_linear_sum_assignment_basic_square() {
        let cost = DMatrix::from_row_slice(3, 3, &[
            4.0, 1.0, 3.0,
            2.0, 0.0, 5.0,
            3.0, 2.0, 2.0,
        ]);
        let result = linear_sum_assignment(&cost, f64::INFINITY);

        assert_eq!(result.len(), 3);
        assert!(unmatched_rows(cost.nrows(), &result).is_empty());
        assert!(unmatched_cols(cost.ncols(), &result).is_empty());

        // Optimal: (0,1)=1 + (1,0)=2 + (2,2)=2 = 5
        assert!((total_cost(&cost, &result) - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_linear_sum_assignment_gate() {
        let cost = DMatrix::from_row_slice(2, 2, &[1.0, 5.0, 5.0, 1.0]);
        let result = linear_sum_assignment(&cost, 2.0);

        assert_eq!(result.len(), 2);
        for a in &result {
            assert!(cost[(a.row_idx, a.col_idx)] < 2.0);
        }
    }

    #[test]
    fn test_linear_sum_assignment_gate_is_exclusive() {
        let cost = DMatrix::from_row_slice(1, 1, &[2.0]);
        let result = linear_sum_assignment(&cost, 2.0);

        assert!(result.is_empty());
        assert_eq!(unmatched_rows(cost.nrows(), &result), vec![0]);
        assert_eq!(unmatched_cols(cost.ncols(), &result), vec![0]);
    }

    #[test]
    fn test_linear_sum_assignment_rectangular_more_rows() {
        let cost = DMatrix::from_row_slice(3, 2, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let result = linear_sum_assignment(&cost, f64::INFINITY);

        // Can only match 2 rows to 2 columns
        assert_eq!(result.len(), 2);
        assert_eq!(unmatched_rows(cost.nrows(), &result).len(), 1);
        assert!(unmatched_cols(cost.ncols(), &result).is_empty());
    }

    #[test]
    fn test_linear_sum_assignment_rectangular_more_cols() {
        let cost = DMatrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let result = linear_sum_assignment(&cost, f64::INFINITY);

        assert_eq!(result.len(), 2);
        assert!(unmatched_rows(cost.nrows(), &result).is_empty());
        assert_eq!(unmatched_cols(cost.ncols(), &result).len(), 1);
    }

    #[test]
    fn test_linear_sum_assignment_empty_matrix() {
        let result = linear_sum_assignment(&DMatrix::zeros(0, 0), 10.0);
        assert!(result.is_empty());
        assert!(unmatched_rows(0, &result).is_empty());
        assert!(unmatched_cols(0, &result).is_empty());

        let result = linear_sum_assignment(&DMatrix::zeros(2, 0), 10.0);
        assert_eq!(unmatched_rows(2, &result), vec![0, 1]);
    }

    #[test]
    fn test_linear_sum_assignment_all_rejected_by_gate() {
        let cost = DMatrix::from_row_slice(2, 2, &[10.0, 20.0, 30.0, 40.0]);
        let result = linear_sum_assignment(&cost, 5.0);

        assert!(result.is_empty());
        assert_eq!(unmatched_rows(cost.nrows(), &result), vec![0, 1]);
        assert_eq!(unmatched_cols(cost.ncols(), &result), vec![0, 1]);
    }

    #[test]
    fn test_linear_sum_assignment_prefers_more_matches_under_gate() {
        // Greedy would take (0,0)=10 and strand row 1; two matches cost 35 < 10 + 50
        let cost = DMatrix::from_row_slice(2, 2, &[
            10.0, 15.0,
            20.0, 100.0,
        ]);
        let result = linear_sum_assignment(&cost, 50.0);

        assert_eq!(
            result,
            vec![Assignment { row_idx: 0, col_idx: 1 }, Assignment { row_idx: 1, col_idx: 0 }]
        );
    }

    #[test]
    fn test_linear_sum_assignment_skips_pair_not_worth_it() {
        // Matching both costs 45 + 45 = 90; matching one and leaving the other costs 1 + 50 = 51
        let cost = DMatrix::from_row_slice(2, 2, &[
            1.0, 45.0,
            45.0, f64::INFINITY,
        ]);
        let result = linear_sum_assignment(&cost, 50.0);

        assert_eq!(result, vec![Assignment { row_idx: 0, col_idx: 0 }]);
    }

    #[test]
    fn test_linear_sum_assignment_optimal_matching() {
        // Optimal: (0,2)=3, (1,1)=4, (2,0)=3 = 10
        let cost = DMatrix::from_row_slice(3, 3, &[
            1.0, 2.0, 3.0,
            2.0, 4.0, 6.0,
            3.0, 6.0, 9.0,
        ]);
        let result = linear_sum_assignment(&cost, f64::INFINITY);

        assert_eq!(result.len(), 3);
        assert!((total_cost(&cost, &result) - 10.0).abs() < 1e-10);
    }
}
