//! Y/S/Z parameter conversions (§4.9), shared by the solver's global
//! reduction stage and by components whose native representation is
//! scattering parameters (directional couplers, Touchstone black boxes).
//!
//! Per-port reference impedances may be complex, so normalization uses
//! `D = diag(sqrt(Re(Z0)))` (real, even when `Z0` is not) rather than
//! `diag(sqrt(Z0))` — the latter only coincides with the former when every
//! `Z0` is real, and fixing `Re(Z0)` keeps ports with a reactive reference
//! impedance normalizing correctly. Because `D` no longer
//! block-diagonalizes `Y0` into the identity for complex `Z0`, the two
//! matrix factors being combined don't generally commute, so every
//! conversion here solves a right-hand linear system (`X * A = B`, via a
//! transposed left-solve) rather than assuming `(I - Yn)(I + Yn)^-1 ==
//! (I + Yn)^-1(I - Yn)`.

use std::cell::RefCell;
use std::collections::HashSet;

use nalgebra::DMatrix;
use num_complex::Complex64;

use crate::error::{Error, Result};

/// Above this estimated condition number, `reg * I` is added to the matrix
/// being factored before solving.
const CONDITION_THRESHOLD: f64 = 1e8;
const REGULARIZATION: f64 = 1e-12;

thread_local! {
    /// Dimensions this thread has already warned about regularizing. A sweep
    /// revisits the same matrix size at every point, so without this the same
    /// warning would fire once per point instead of once per distinct shape.
    static WARNED_DIMS: RefCell<HashSet<usize>> = RefCell::new(HashSet::new());
}

fn warn_once_for_dim(n: usize, ratio: f64) {
    WARNED_DIMS.with(|dims| {
        if dims.borrow_mut().insert(n) {
            log::warn!(
                "matrix conversion: pivot ratio {ratio:.3e} exceeds {CONDITION_THRESHOLD:.0e} for {n}x{n} matrices, regularizing (further occurrences at this size are silenced)"
            );
        }
    });
}

/// `D = diag(sqrt(Re(Z0)))`.
fn normalization(z0: &[Complex64]) -> DMatrix<Complex64> {
    DMatrix::from_diagonal(&nalgebra::DVector::from_iterator(
        z0.len(),
        z0.iter().map(|z| Complex64::new(z.re.sqrt(), 0.0)),
    ))
}

/// `D^-1 = diag(1/sqrt(Re(Z0)))`.
fn normalization_inv(z0: &[Complex64]) -> DMatrix<Complex64> {
    DMatrix::from_diagonal(&nalgebra::DVector::from_iterator(
        z0.len(),
        z0.iter().map(|z| Complex64::new(1.0 / z.re.sqrt(), 0.0)),
    ))
}

fn diag_z0(z0: &[Complex64]) -> DMatrix<Complex64> {
    DMatrix::from_diagonal(&nalgebra::DVector::from_iterator(z0.len(), z0.iter().cloned()))
}

fn diag_y0(z0: &[Complex64]) -> DMatrix<Complex64> {
    DMatrix::from_diagonal(&nalgebra::DVector::from_iterator(
        z0.len(),
        z0.iter().map(|z| Complex64::new(1.0, 0.0) / z),
    ))
}

/// Estimates conditioning from the ratio of the largest to smallest `|U_ii|`
/// pivot in an LU factorization — cheap compared to an SVD, and adequate to
/// decide whether to regularize.
fn pivot_ratio(m: &DMatrix<Complex64>) -> f64 {
    let lu = m.clone().lu();
    let u = lu.u();
    let mut max_piv = 0.0f64;
    let mut min_piv = f64::INFINITY;
    for i in 0..u.nrows().min(u.ncols()) {
        let mag = u[(i, i)].norm();
        if mag > max_piv {
            max_piv = mag;
        }
        if mag < min_piv {
            min_piv = mag;
        }
    }
    if min_piv == 0.0 {
        f64::INFINITY
    } else {
        max_piv / min_piv
    }
}

/// Elementwise-Hermitian check (`a[i,j] == conj(a[j,i])`) within `tol`, used
/// to decide whether the Cholesky fast path applies.
fn is_hermitian(a: &DMatrix<Complex64>, tol: f64) -> bool {
    let n = a.nrows();
    if n != a.ncols() {
        return false;
    }
    for i in 0..n {
        for j in 0..n {
            if (a[(i, j)] - a[(j, i)].conj()).norm() > tol {
                return false;
            }
        }
    }
    true
}

/// Solves `x * a = b` for `x` (i.e. `x = b * a^-1`) without forming the
/// inverse explicitly, regularizing `a`'s diagonal first when its pivot
/// ratio indicates it is nearly singular. Implemented as a transposed
/// left-solve: `a^T x^T = b^T`.
///
/// When `a` is Hermitian (so `a^T` is Hermitian too — conjugating a
/// Hermitian matrix preserves the property), tries Cholesky first since it
/// is cheaper than a full LU. Falls back to LU, then — if even regularized
/// LU fails to factor — to the Moore-Penrose pseudoinverse, matching the
/// "LU, then pseudoinverse on `LinAlgError`" robust-inversion contract.
fn solve_right_regularized(a: &DMatrix<Complex64>, b: &DMatrix<Complex64>) -> Result<DMatrix<Complex64>> {
    let n = a.nrows();
    let ratio = pivot_ratio(a);
    let hermitian = is_hermitian(a, 1e-9);
    let a = if ratio > CONDITION_THRESHOLD {
        warn_once_for_dim(n, ratio);
        a + DMatrix::<Complex64>::identity(n, n) * Complex64::new(REGULARIZATION, 0.0)
    } else {
        a.clone()
    };

    let at = a.transpose();
    let bt = b.transpose();

    if hermitian {
        if let Some(chol) = at.clone().cholesky() {
            return Ok(chol.solve(&bt).transpose());
        }
    }

    if let Some(xt) = at.clone().lu().solve(&bt) {
        return Ok(xt.transpose());
    }

    log::warn!("matrix conversion: LU solve failed even after regularization, falling back to pseudoinverse");
    let pinv = at
        .pseudo_inverse(REGULARIZATION)
        .map_err(|e| Error::Numeric(format!("matrix conversion: pseudoinverse failed: {e}")))?;
    Ok((pinv * bt).transpose())
}

/// Converts an admittance matrix to scattering parameters at per-port
/// reference impedances `z0` (length must equal `y`'s dimension).
///
/// `S = D * (Y0 - Y) * (Y0 + Y)^-1 * D^-1`.
pub fn y_to_s(y: &DMatrix<Complex64>, z0: &[Complex64]) -> Result<DMatrix<Complex64>> {
    let n = y.nrows();
    assert_eq!(z0.len(), n, "z0 length must match matrix dimension");
    let d = normalization(z0);
    let d_inv = normalization_inv(z0);
    let y0 = diag_y0(z0);
    let num = &y0 - y;
    let den = &y0 + y;
    let x = solve_right_regularized(&den, &num)?;
    Ok(&d * &x * &d_inv)
}

/// Converts scattering parameters back to an admittance matrix at per-port
/// reference impedances `z0`.
///
/// `Y = Y0 * (I - S') * (I + S')^-1`, `S' = D^-1 * S * D`.
pub fn s_to_y(s: &DMatrix<Complex64>, z0: &[Complex64]) -> Result<DMatrix<Complex64>> {
    let n = s.nrows();
    assert_eq!(z0.len(), n, "z0 length must match matrix dimension");
    let d = normalization(z0);
    let d_inv = normalization_inv(z0);
    let y0 = diag_y0(z0);
    let identity = DMatrix::<Complex64>::identity(n, n);
    let s_prime = &d_inv * s * &d;
    let num = &identity - &s_prime;
    let den = &identity + &s_prime;
    let x = solve_right_regularized(&den, &num)?;
    Ok(&y0 * &x)
}

/// Converts an impedance matrix to scattering parameters at per-port
/// reference impedances `z0`.
///
/// `S = D^-1 * (Z - Z0) * (Z + Z0)^-1 * D`.
pub fn z_to_s(z: &DMatrix<Complex64>, z0: &[Complex64]) -> Result<DMatrix<Complex64>> {
    let n = z.nrows();
    assert_eq!(z0.len(), n, "z0 length must match matrix dimension");
    let d = normalization(z0);
    let d_inv = normalization_inv(z0);
    let z0mat = diag_z0(z0);
    let num = z - &z0mat;
    let den = z + &z0mat;
    let x = solve_right_regularized(&den, &num)?;
    Ok(&d_inv * &x * &d)
}

/// Converts scattering parameters back to an impedance matrix at per-port
/// reference impedances `z0`.
///
/// `Z = (I + S') * Z0 * (I - S')^-1`, `S' = D * S * D^-1`.
pub fn s_to_z(s: &DMatrix<Complex64>, z0: &[Complex64]) -> Result<DMatrix<Complex64>> {
    let n = s.nrows();
    assert_eq!(z0.len(), n, "z0 length must match matrix dimension");
    let d = normalization(z0);
    let d_inv = normalization_inv(z0);
    let z0mat = diag_z0(z0);
    let identity = DMatrix::<Complex64>::identity(n, n);
    let s_prime = &d * s * &d_inv;
    let num = (&identity + &s_prime) * &z0mat;
    let den = &identity - &s_prime;
    solve_right_regularized(&den, &num)
}
