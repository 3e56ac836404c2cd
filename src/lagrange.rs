//! Evaluated Lagrange basis over a prime field.
//!
//! For distinct nodes `x₁..x_k` and an evaluation point `x`, the basis value
//! `λᵢ = Π_{j≠i} (x - xⱼ)/(xᵢ - xⱼ)` satisfies `Σ λᵢ·f(xᵢ) = f(x)` for every
//! polynomial f of degree below k. Threshold decryption only ever needs the
//! basis itself, never the interpolated polynomial.

use std::collections::BTreeMap;

use num_bigint::BigUint;

use crate::field::{Field, PrimeField};

/// Basis coefficients at `eval_at`, keyed by node.
///
/// Panics when two nodes coincide; callers keep their node sets deduplicated
/// (attribute maps are keyed by id).
pub fn lagrange_basis(
    field: &PrimeField,
    xs: &[BigUint],
    eval_at: &BigUint,
) -> BTreeMap<BigUint, BigUint> {
    let eval_at = field.reduce(eval_at);
    let mut basis = BTreeMap::new();
    for (i, xi) in xs.iter().enumerate() {
        let xi = field.reduce(xi);
        let mut num = field.one();
        let mut den = field.one();
        for (j, xj) in xs.iter().enumerate() {
            if j == i {
                continue;
            }
            let xj = field.reduce(xj);
            num = field.mul(&num, &field.sub(&eval_at, &xj));
            den = field.mul(&den, &field.sub(&xi, &xj));
        }
        let li = field
            .div(&num, &den)
            .expect("interpolation points must be distinct");
        basis.insert(xi, li);
    }
    basis
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field() -> PrimeField {
        PrimeField::new(BigUint::from(50909u64))
    }

    // Y³ + 13Y² + 11Y + 4 over GF(50909)
    fn f(field: &PrimeField, y: u64) -> BigUint {
        let y = field.from_u64(y);
        let y2 = field.mul(&y, &y);
        let y3 = field.mul(&y2, &y);
        let mut acc = y3;
        acc = field.add(&acc, &field.mul(&field.from_u64(13), &y2));
        acc = field.add(&acc, &field.mul(&field.from_u64(11), &y));
        field.add(&acc, &field.from_u64(4))
    }

    #[test]
    fn basis_recovers_cubic_values() {
        let field = field();
        let xs: Vec<BigUint> = [2u64, 7, 19, 33].iter().map(|&x| field.from_u64(x)).collect();
        for target in [0u64, 1, 5, 1234] {
            let basis = lagrange_basis(&field, &xs, &field.from_u64(target));
            let mut acc = field.zero();
            for (xi, li) in &basis {
                let yi = f(&field, xi.to_u64_digits().first().copied().unwrap_or(0));
                acc = field.add(&acc, &field.mul(li, &yi));
            }
            assert_eq!(acc, f(&field, target));
        }
    }

    #[test]
    fn basis_at_a_node_is_an_indicator() {
        let field = field();
        let xs: Vec<BigUint> = [3u64, 8, 21].iter().map(|&x| field.from_u64(x)).collect();
        let basis = lagrange_basis(&field, &xs, &field.from_u64(8));
        for (xi, li) in &basis {
            let expected = if *xi == field.from_u64(8) {
                field.one()
            } else {
                field.zero()
            };
            assert_eq!(*li, expected);
        }
    }

    #[test]
    fn basis_sums_to_one() {
        // the constant polynomial 1 interpolates to 1 everywhere
        let field = field();
        let xs: Vec<BigUint> = [1u64, 4, 9, 16, 25].iter().map(|&x| field.from_u64(x)).collect();
        let basis = lagrange_basis(&field, &xs, &field.from_u64(777));
        let mut acc = field.zero();
        for li in basis.values() {
            acc = field.add(&acc, li);
        }
        assert_eq!(acc, field.one());
    }

    #[test]
    #[should_panic(expected = "distinct")]
    fn duplicate_nodes_panic() {
        let field = field();
        let xs: Vec<BigUint> = [5u64, 5].iter().map(|&x| field.from_u64(x)).collect();
        lagrange_basis(&field, &xs, &field.zero());
    }
}
