//! Affine short-Weierstrass group law, generic over the field tower.
//!
//! BN curves have the form `y² = x³ + b`, and the same equation (with the
//! same `b`, embedded) defines the extension-field group `E(GF(p¹²))` that
//! hosts the pairing. One generic [`Curve`] over the [`Field`] trait serves
//! both, so the group law and scalar multiplication exist exactly once.

use std::fmt;

use num_bigint::BigUint;
use rand::Rng;

use crate::field::{sqrt, Field};

/// How many x-coordinates [`Curve::sample_point`] tries before concluding the
/// curve object is not actually a curve. Half of all x lift, so 4096 misses
/// in a row is not a statistical accident.
const SAMPLE_BUDGET: usize = 4096;

/// A point in affine coordinates, or the point at infinity.
pub enum Point<F: Field> {
    Infinity,
    Affine { x: F::Elem, y: F::Elem },
}

impl<F: Field> Point<F> {
    pub fn is_infinity(&self) -> bool {
        matches!(self, Point::Infinity)
    }
}

// Manual impls: deriving would put spurious bounds on F itself, while the
// element type already carries Clone + PartialEq + Debug.
impl<F: Field> Clone for Point<F> {
    fn clone(&self) -> Self {
        match self {
            Point::Infinity => Point::Infinity,
            Point::Affine { x, y } => Point::Affine {
                x: x.clone(),
                y: y.clone(),
            },
        }
    }
}

impl<F: Field> PartialEq for Point<F> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Point::Infinity, Point::Infinity) => true,
            (Point::Affine { x, y }, Point::Affine { x: ox, y: oy }) => x == ox && y == oy,
            _ => false,
        }
    }
}

impl<F: Field> fmt::Debug for Point<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Point::Infinity => f.write_str("Infinity"),
            Point::Affine { x, y } => f.debug_struct("Affine").field("x", x).field("y", y).finish(),
        }
    }
}

/// The curve `y² = x³ + b` over a field of the tower.
#[derive(Clone, Debug, PartialEq)]
pub struct Curve<F: Field> {
    field: F,
    b: F::Elem,
}

impl<F: Field> Curve<F> {
    pub fn new(field: F, b: F::Elem) -> Curve<F> {
        Curve { field, b }
    }

    pub fn field(&self) -> &F {
        &self.field
    }

    pub fn b(&self) -> &F::Elem {
        &self.b
    }

    pub fn infinity(&self) -> Point<F> {
        Point::Infinity
    }

    pub fn point(&self, x: F::Elem, y: F::Elem) -> Point<F> {
        Point::Affine { x, y }
    }

    pub fn contains(&self, p: &Point<F>) -> bool {
        match p {
            Point::Infinity => true,
            Point::Affine { x, y } => {
                let f = &self.field;
                let lhs = f.mul(y, y);
                let x3 = f.mul(&f.mul(x, x), x);
                lhs == f.add(&x3, &self.b)
            }
        }
    }

    pub fn neg(&self, p: &Point<F>) -> Point<F> {
        match p {
            Point::Infinity => Point::Infinity,
            Point::Affine { x, y } => Point::Affine {
                x: x.clone(),
                y: self.field.neg(y),
            },
        }
    }

    /// Chord-and-tangent addition.
    pub fn add(&self, p: &Point<F>, q: &Point<F>) -> Point<F> {
        let f = &self.field;
        let (px, py, qx, qy) = match (p, q) {
            (Point::Infinity, _) => return q.clone(),
            (_, Point::Infinity) => return p.clone(),
            (Point::Affine { x: px, y: py }, Point::Affine { x: qx, y: qy }) => (px, py, qx, qy),
        };

        let slope = if px == qx {
            if f.add(py, qy) == f.zero() {
                // q = -p, including the 2-torsion case y = 0
                return Point::Infinity;
            }
            // tangent: (3x²) / (2y)
            let x2 = f.mul(px, px);
            let num = f.add(&f.add(&x2, &x2), &x2);
            let den = f.add(py, py);
            f.div(&num, &den).expect("doubling a point with y = 0")
        } else {
            let num = f.sub(qy, py);
            let den = f.sub(qx, px);
            f.div(&num, &den).expect("distinct x-coordinates")
        };

        let rx = f.sub(&f.sub(&f.mul(&slope, &slope), px), qx);
        let ry = f.sub(&f.mul(&slope, &f.sub(px, &rx)), py);
        Point::Affine { x: rx, y: ry }
    }

    pub fn double(&self, p: &Point<F>) -> Point<F> {
        self.add(p, p)
    }

    /// Double-and-add scalar multiplication.
    pub fn scalar_mul(&self, k: &BigUint, p: &Point<F>) -> Point<F> {
        let mut acc = Point::Infinity;
        for i in (0..k.bits()).rev() {
            acc = self.double(&acc);
            if k.bit(i) {
                acc = self.add(&acc, p);
            }
        }
        acc
    }

    /// Lift an x-coordinate to a curve point, if `x³ + b` is a square. The
    /// returned y is the deterministic Tonelli-Shanks root.
    pub fn lift_x(&self, x: &F::Elem) -> Option<Point<F>> {
        let f = &self.field;
        let rhs = f.add(&f.mul(&f.mul(x, x), x), &self.b);
        let y = sqrt(f, &rhs)?;
        Some(Point::Affine { x: x.clone(), y })
    }

    /// Draw a uniform-ish curve point by sampling x-coordinates until one
    /// lifts. Panics after [`SAMPLE_BUDGET`] misses, which only happens when
    /// the curve parameters are corrupt.
    pub fn sample_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Point<F> {
        for _ in 0..SAMPLE_BUDGET {
            let x = self.field.sample(rng);
            if let Some(p) = self.lift_x(&x) {
                return p;
            }
        }
        panic!("no liftable x-coordinate found; curve parameters are corrupt");
    }
}
