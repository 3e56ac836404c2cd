//! Shamir secret sharing: random polynomials with the secret pinned at the
//! constant term.
//!
//! A polynomial of degree `threshold - 1` is created per key generation,
//! evaluated once per share, and dropped. Evaluation at zero would hand out
//! the secret itself, so the protocol layer never uses zero as a share index.

use num_bigint::BigUint;
use rand::{CryptoRng, Rng};

use crate::field::{Field, PrimeField};

/// A uniformly random polynomial over GF(n) with a fixed constant term.
#[derive(Clone, Debug)]
pub struct SecretPolynomial {
    field: PrimeField,
    /// Coefficients from the constant term upward.
    coeffs: Vec<BigUint>,
}

impl SecretPolynomial {
    /// Degree `threshold - 1`, constant term `secret`, remaining coefficients
    /// uniform. Any `threshold` evaluations determine the secret; fewer
    /// reveal nothing.
    pub fn random<R: Rng + CryptoRng>(
        field: &PrimeField,
        secret: &BigUint,
        threshold: usize,
        rng: &mut R,
    ) -> SecretPolynomial {
        assert!(threshold >= 1, "a polynomial has at least one coefficient");
        let mut coeffs = Vec::with_capacity(threshold);
        coeffs.push(field.reduce(secret));
        for _ in 1..threshold {
            coeffs.push(field.sample(rng));
        }
        SecretPolynomial {
            field: field.clone(),
            coeffs,
        }
    }

    pub fn threshold(&self) -> usize {
        self.coeffs.len()
    }

    pub fn secret(&self) -> &BigUint {
        &self.coeffs[0]
    }

    /// Horner evaluation.
    pub fn eval(&self, at: &BigUint) -> BigUint {
        let at = self.field.reduce(at);
        let mut acc = self.field.zero();
        for c in self.coeffs.iter().rev() {
            acc = self.field.add(&self.field.mul(&acc, &at), c);
        }
        acc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lagrange::lagrange_basis;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn field() -> PrimeField {
        PrimeField::new(BigUint::from(50909u64))
    }

    #[test]
    fn constant_term_is_the_secret() {
        let field = field();
        let mut rng = StdRng::seed_from_u64(20);
        let secret = field.from_u64(4242);
        let poly = SecretPolynomial::random(&field, &secret, 4, &mut rng);
        assert_eq!(*poly.secret(), secret);
        assert_eq!(poly.eval(&field.zero()), secret);
        assert_eq!(poly.threshold(), 4);
    }

    #[test]
    fn threshold_shares_reconstruct_the_secret() {
        let field = field();
        let mut rng = StdRng::seed_from_u64(21);
        let secret = field.from_u64(31337);
        let poly = SecretPolynomial::random(&field, &secret, 3, &mut rng);

        let xs: Vec<BigUint> = [4u64, 11, 29].iter().map(|&x| field.from_u64(x)).collect();
        let basis = lagrange_basis(&field, &xs, &field.zero());
        let mut acc = field.zero();
        for (xi, li) in &basis {
            acc = field.add(&acc, &field.mul(li, &poly.eval(xi)));
        }
        assert_eq!(acc, secret);
    }

    #[test]
    fn too_few_shares_miss_the_secret() {
        let field = field();
        let mut rng = StdRng::seed_from_u64(22);
        let secret = field.from_u64(999);
        let poly = SecretPolynomial::random(&field, &secret, 3, &mut rng);

        let xs: Vec<BigUint> = [4u64, 11].iter().map(|&x| field.from_u64(x)).collect();
        let basis = lagrange_basis(&field, &xs, &field.zero());
        let mut acc = field.zero();
        for (xi, li) in &basis {
            acc = field.add(&acc, &field.mul(li, &poly.eval(xi)));
        }
        assert_ne!(acc, secret);
    }

    #[test]
    fn degree_one_polynomial_is_constant() {
        let field = field();
        let mut rng = StdRng::seed_from_u64(23);
        let secret = field.from_u64(7);
        let poly = SecretPolynomial::random(&field, &secret, 1, &mut rng);
        assert_eq!(poly.eval(&field.from_u64(12345)), secret);
    }
}
