//! Miller's algorithm and the Weil pairing.
//!
//! Both pairing arguments live on `E(GF(p¹²))`, so the ate-style optimisations
//! that keep one argument on a twist do not apply; the classical Weil quotient
//!
//! ```text
//! e_n(P, Q) = f_P(Q + S) · f_Q(-S) / (f_P(S) · f_Q(P - S))
//! ```
//!
//! (Washington, *Elliptic Curves: Number Theory and Cryptography*, §11.2) is
//! used instead, with a random auxiliary point S shifting the evaluation away
//! from the zeros and poles of the Miller functions.

use num_bigint::BigUint;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::curve::{Curve, Point};
use crate::field::Field;

/// Seed for the auxiliary-point stream. Fixing it makes pairing values a
/// deterministic function of the inputs, which curve reconstruction from
/// serialized parameters depends on.
const AUX_SEED: u64 = 0x7765696c;

/// Auxiliary points to try before giving up. Each retry fails only when an
/// evaluation hits a zero or pole of a Miller function, an event with
/// probability O(1/p) per draw.
const AUX_BUDGET: usize = 64;

/// One Miller line evaluation: the line through `t` and `p` (their tangent if
/// equal) evaluated at `at`, divided by the vertical through `t + p`.
/// `None` when the evaluation hits a zero of either line.
fn line_eval<F: Field>(
    e: &Curve<F>,
    t: &Point<F>,
    p: &Point<F>,
    at: &Point<F>,
) -> Option<F::Elem> {
    let f = e.field();
    let (ax, ay) = match at {
        Point::Infinity => return None,
        Point::Affine { x, y } => (x, y),
    };
    let (tx, ty) = match t {
        Point::Infinity => {
            // l is the vertical through p
            let Point::Affine { x: px, .. } = p else {
                return Some(f.one());
            };
            let v = f.sub(ax, px);
            return if f.is_zero(&v) { None } else { Some(v) };
        }
        Point::Affine { x, y } => (x, y),
    };
    let (px, py) = match p {
        Point::Infinity => {
            let v = f.sub(ax, tx);
            return if f.is_zero(&v) { None } else { Some(v) };
        }
        Point::Affine { x, y } => (x, y),
    };

    if tx == px {
        if f.add(ty, py) == f.zero() {
            // p = -t: the line is the vertical through t
            let v = f.sub(ax, tx);
            return if f.is_zero(&v) { None } else { Some(v) };
        }
        // tangent at t
        let x2 = f.mul(tx, tx);
        let num = f.add(&f.add(&x2, &x2), &x2);
        let den = f.add(ty, ty);
        let slope = f.div(&num, &den)?;
        line_value(f, tx, px, &slope, ax, ay, ty)
    } else {
        let slope = f.div(&f.sub(py, ty), &f.sub(px, tx))?;
        line_value(f, tx, px, &slope, ax, ay, ty)
    }
}

/// `(l / v)(at)` for the non-vertical line of slope `slope` through `(tx, ty)`
/// and the vertical through the chord/tangent sum `t + p`.
fn line_value<F: Field>(
    f: &F,
    tx: &F::Elem,
    px: &F::Elem,
    slope: &F::Elem,
    ax: &F::Elem,
    ay: &F::Elem,
    ty: &F::Elem,
) -> Option<F::Elem> {
    let l = f.sub(&f.sub(ay, ty), &f.mul(slope, &f.sub(ax, tx)));
    // x-coordinate of t + p
    let sx = f.sub(&f.sub(&f.mul(slope, slope), tx), px);
    let v = f.sub(ax, &sx);
    if f.is_zero(&l) || f.is_zero(&v) {
        None
    } else {
        f.div(&l, &v)
    }
}

/// Miller's algorithm: evaluate the function `f_{n,P}` with divisor
/// `n(P) - n(O)` at the point `at`. `None` when an intermediate line has a
/// zero or pole at `at`; callers retry with a shifted evaluation point.
fn miller<F: Field>(
    e: &Curve<F>,
    n: &BigUint,
    p: &Point<F>,
    at: &Point<F>,
) -> Option<F::Elem> {
    let f = e.field();
    let mut acc = f.one();
    let mut t = p.clone();
    for i in (0..n.bits() - 1).rev() {
        let l = line_eval(e, &t, &t, at)?;
        acc = f.mul(&f.mul(&acc, &acc), &l);
        t = e.double(&t);
        if n.bit(i) {
            let l = line_eval(e, &t, p, at)?;
            acc = f.mul(&acc, &l);
            t = e.add(&t, p);
        }
    }
    Some(acc)
}

/// The Weil pairing `e_n(p, q)` of two points of order dividing `n`.
///
/// Alternating: `e_n(p, p) = 1` and `e_n(q, p)` is the inverse of
/// `e_n(p, q)`, so argument order matters to every caller.
///
/// Panics when [`AUX_BUDGET`] auxiliary points all hit zeros or poles, which
/// does not happen for points of the advertised order on a well-formed curve.
pub fn weil_pairing<F: Field>(
    e: &Curve<F>,
    n: &BigUint,
    p: &Point<F>,
    q: &Point<F>,
) -> F::Elem {
    let f = e.field();
    if p.is_infinity() || q.is_infinity() || p == q {
        return f.one();
    }

    let mut rng = StdRng::seed_from_u64(AUX_SEED);
    for _ in 0..AUX_BUDGET {
        let s = e.sample_point(&mut rng);
        let result = (|| {
            let qs = e.add(q, &s);
            let ps = e.add(p, &e.neg(&s));
            let num = f.mul(&miller(e, n, p, &qs)?, &miller(e, n, q, &e.neg(&s))?);
            let den = f.mul(&miller(e, n, p, &s)?, &miller(e, n, q, &ps)?);
            f.div(&num, &den)
        })();
        if let Some(v) = result {
            return v;
        }
    }
    panic!("no usable auxiliary point for the Weil pairing; curve parameters are corrupt");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bn::BnCurve;
    use crate::field::Field;
    use num_bigint::BigUint;

    fn curve() -> &'static BnCurve {
        crate::testing::curve32()
    }

    #[test]
    fn pairing_of_generators_has_full_order() {
        let c = curve();
        let gt = c.pairing(c.g0_lifted(), c.g1());
        let fp12 = c.extension().field();
        assert_ne!(gt, fp12.one());
        assert_eq!(fp12.pow(&gt, c.order()), fp12.one());
    }

    #[test]
    fn pairing_is_bilinear() {
        let c = curve();
        let e = c.extension();
        let fp12 = e.field();
        let a = BigUint::from(1234u32);
        let b = BigUint::from(5678u32);
        let pa = e.scalar_mul(&a, c.g0_lifted());
        let qb = e.scalar_mul(&b, c.g1());
        let lhs = c.pairing(&pa, &qb);
        let rhs = fp12.pow(&c.pairing(c.g0_lifted(), c.g1()), &(&a * &b));
        assert_eq!(lhs, rhs);
    }

    #[test]
    fn pairing_is_alternating() {
        let c = curve();
        let e = c.extension();
        let fp12 = e.field();
        assert_eq!(c.pairing(c.g0_lifted(), c.g0_lifted()), fp12.one());
        let fwd = c.pairing(c.g0_lifted(), c.g1());
        let rev = c.pairing(c.g1(), c.g0_lifted());
        assert_eq!(fp12.mul(&fwd, &rev), fp12.one());
    }

    #[test]
    fn pairing_with_infinity_is_one() {
        let c = curve();
        let fp12 = c.extension().field();
        assert_eq!(c.pairing(&c.extension().infinity(), c.g1()), fp12.one());
        assert_eq!(c.pairing(c.g0_lifted(), &c.extension().infinity()), fp12.one());
    }
}
