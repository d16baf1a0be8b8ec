use serde::{Serialize, Deserialize};
use std::ops::{Add, Mul};

/// Dense row-major matrix of `f64`, the storage format for layer weights and
/// biases in model files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix{
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<f64>>
}

impl Matrix{
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix{
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows]
        }
    }

    /// Builds a 1×n row vector.
    pub fn row(values: &[f64]) -> Matrix {
        Matrix::from_data(vec![values.to_vec()])
    }

    pub fn from_data(data: Vec<Vec<f64>>) -> Matrix {
        Matrix {
            rows: data.len(),
            cols: data.first().map_or(0, |r| r.len()),
            data
        }
    }

    /// True when `data` actually holds `rows` rows of `cols` values each.
    /// Deserialized matrices are not guaranteed to agree with their header.
    pub fn is_consistent(&self) -> bool {
        self.data.len() == self.rows && self.data.iter().all(|r| r.len() == self.cols)
    }
}

impl Add for &Matrix {
    type Output = Matrix;

    fn add(self, rhs: Self) -> Self::Output {
        if self.rows != rhs.rows || self.cols != rhs.cols {
            panic!("Matrices are of incorrect sizes")
        }

        let mut res = Matrix::zeros(self.rows, self.cols);

        for i in 0..self.rows {
            for j in 0..self.cols {
                res.data[i][j] = self.data[i][j] + rhs.data[i][j];
            }
        }

        res
    }
}

impl Mul for &Matrix {
    type Output = Matrix;

    fn mul(self, rhs: Self) -> Self::Output {
        if self.cols != rhs.rows {
            panic!("Matrices are of incorrect sizes")
        }

        let mut res =  Matrix::zeros(self.rows, rhs.cols);

        for i in 0..res.rows {
            for j in 0..res.cols {
                let mut sum = 0.0;

                for k in 0..self.cols {
                    sum += self.data[i][k] * rhs.data[k][j];
                }

                res.data[i][j] = sum;
            }
        }

        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_times_matrix_plus_bias() {
        let x = Matrix::row(&[1.0, 2.0]);
        let w = Matrix::from_data(vec![vec![1.0, 0.0, -1.0], vec![0.5, 2.0, 1.0]]);
        let b = Matrix::row(&[0.0, 1.0, 0.5]);
        let z = &(&x * &w) + &b;
        assert_eq!(z.data, vec![vec![2.0, 5.0, 1.5]]);
    }

    #[test]
    fn inconsistent_header_is_detected() {
        let mut m = Matrix::zeros(2, 3);
        assert!(m.is_consistent());
        m.data[1].pop();
        assert!(!m.is_consistent());
    }

    #[test]
    #[should_panic(expected = "incorrect sizes")]
    fn mismatched_product_panics() {
        let _ = &Matrix::zeros(1, 2) * &Matrix::zeros(3, 1);
    }
}
