//! Ridge-regularised linear least squares
//!
//! Solves `(XᵀX + diag(λ)) β = Xᵀy` with a Cholesky factorisation. A zero penalty
//! is allowed for columns that are always identified (such as an intercept), as long
//! as the penalised system stays positive definite.

use crate::{MathError, Result};

/// Linear regression with a per-coefficient ridge penalty
#[derive(Debug, Clone)]
pub struct RidgeRegression {
    penalties: Vec<f64>,
    coefficients: Option<Vec<f64>>,
}

impl RidgeRegression {
    /// Create a new ridge regression with one penalty per design-matrix column
    pub fn new(penalties: Vec<f64>) -> Result<Self> {
        if penalties.is_empty() {
            return Err(MathError::InvalidInput(
                "At least one coefficient is required".to_string(),
            ));
        }
        if penalties.iter().any(|p| !p.is_finite() || *p < 0.0) {
            return Err(MathError::InvalidInput(
                "Penalties must be finite and non-negative".to_string(),
            ));
        }

        Ok(Self {
            penalties,
            coefficients: None,
        })
    }

    /// Number of coefficients in the model
    pub fn width(&self) -> usize {
        self.penalties.len()
    }

    /// Fit the coefficients to the design matrix `rows` and targets `y`
    pub fn fit(&mut self, rows: &[Vec<f64>], y: &[f64]) -> Result<()> {
        if rows.is_empty() {
            return Err(MathError::InsufficientData(
                "Cannot fit a regression without observations".to_string(),
            ));
        }
        if rows.len() != y.len() {
            return Err(MathError::InvalidInput(format!(
                "Design matrix has {} rows but {} targets were given",
                rows.len(),
                y.len()
            )));
        }

        let p = self.width();
        if let Some(bad) = rows.iter().find(|row| row.len() != p) {
            return Err(MathError::InvalidInput(format!(
                "Design row has {} columns, expected {}",
                bad.len(),
                p
            )));
        }

        // Normal equations, lower triangle only
        let mut gram = vec![vec![0.0; p]; p];
        let mut rhs = vec![0.0; p];
        for (row, &target) in rows.iter().zip(y.iter()) {
            for i in 0..p {
                let xi = row[i];
                if xi == 0.0 {
                    continue;
                }
                rhs[i] += xi * target;
                for j in 0..=i {
                    gram[i][j] += xi * row[j];
                }
            }
        }
        for (i, penalty) in self.penalties.iter().enumerate() {
            gram[i][i] += penalty;
        }

        let factor = cholesky(gram)?;
        self.coefficients = Some(cholesky_solve(&factor, &rhs));

        Ok(())
    }

    /// Get the fitted coefficients
    pub fn coefficients(&self) -> Result<&[f64]> {
        self.coefficients.as_deref().ok_or_else(|| {
            MathError::CalculationError("Regression has not been fitted".to_string())
        })
    }

    /// Predict the target for a single design row
    pub fn predict(&self, row: &[f64]) -> Result<f64> {
        let beta = self.coefficients()?;
        if row.len() != beta.len() {
            return Err(MathError::InvalidInput(format!(
                "Design row has {} columns, expected {}",
                row.len(),
                beta.len()
            )));
        }

        Ok(row.iter().zip(beta.iter()).map(|(x, b)| x * b).sum())
    }
}

/// Lower-triangular Cholesky factor of a symmetric positive definite matrix
fn cholesky(mut a: Vec<Vec<f64>>) -> Result<Vec<Vec<f64>>> {
    let n = a.len();
    for j in 0..n {
        let mut diag = a[j][j];
        for k in 0..j {
            diag -= a[j][k] * a[j][k];
        }
        if diag <= 1e-12 {
            return Err(MathError::CalculationError(
                "Normal equations are not positive definite".to_string(),
            ));
        }
        let diag = diag.sqrt();
        a[j][j] = diag;

        for i in (j + 1)..n {
            let mut value = a[i][j];
            for k in 0..j {
                value -= a[i][k] * a[j][k];
            }
            a[i][j] = value / diag;
        }
    }

    // Clear the untouched upper triangle
    for (i, row) in a.iter_mut().enumerate() {
        for value in row.iter_mut().skip(i + 1) {
            *value = 0.0;
        }
    }

    Ok(a)
}

/// Solve `L Lᵀ x = b` by forward then backward substitution
fn cholesky_solve(l: &[Vec<f64>], b: &[f64]) -> Vec<f64> {
    let n = b.len();

    let mut z = vec![0.0; n];
    for i in 0..n {
        let mut value = b[i];
        for k in 0..i {
            value -= l[i][k] * z[k];
        }
        z[i] = value / l[i][i];
    }

    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut value = z[i];
        for k in (i + 1)..n {
            value -= l[k][i] * x[k];
        }
        x[i] = value / l[i][i];
    }

    x
}
