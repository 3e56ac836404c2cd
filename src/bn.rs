//! Generation of prime-order Barreto-Naehrig curves and the pairing group
//! triple (g0, g1, gt) used by the protocols.
//!
//! BN curves are parameterized by `P(x) = 36x⁴ + 36x³ + 24x² + 6x + 1`: for
//! suitable x both `p = P(±x)` and `n = p + 1 - t` (with trace `t = 6x² + 1`)
//! are prime, and `E: y² = x³ + b` over GF(p) has order n with embedding
//! degree 12. The construction follows Barreto-Naehrig, *Pairing-Friendly
//! Elliptic Curves of Prime Order* (SAC 2005).
//!
//! Generated curves are deliberately small (research scale); the parameters
//! serialize as four integers and [`BnCurve::from_params`] reconstructs the
//! identical group triple deterministically.

use num_bigint::{BigInt, BigUint};
use num_traits::{One, Zero};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::curve::{Curve, Point};
use crate::errors::Error;
use crate::field::{is_prime, sqrt, Field, Fp12, PrimeField, QuadraticExt, TowerExt};
use crate::pairing::weil_pairing;
use crate::util::sha3_256;

/// Iteration cap for the bit-length refinement in [`find_min_x`]. The
/// refinement either converges in O(log) steps or cycles (it provably cycles
/// for some tiny bit lengths), so overflow means no suitable x exists.
const FIND_X_BUDGET: usize = 4096;

/// Curve coefficients to try before declaring the (p, n) pair unusable.
const COEFF_BUDGET: u64 = 4096;

/// Candidate points to try when searching for the second generator.
const GEN_BUDGET: usize = 64;

/// Counter cap for hash-to-curve. Each counter value lifts with probability
/// one half.
const HASH_BUDGET: u32 = 4096;

/// Seed for the deterministic candidate stream of the second-generator
/// search. A fixed stream makes [`BnCurve::from_params`] a pure function of
/// the four parameters.
const GEN_SEED: u64 = 0x626e2d67656e73;

/// `P(x)` for x ≥ 0.
fn poly_p_pos(x: &BigUint) -> BigUint {
    let x2 = x * x;
    let x3 = &x2 * x;
    let x4 = &x3 * x;
    x4 * 36u32 + x3 * 36u32 + x2 * 24u32 + x * 6u32 + 1u32
}

/// `P(-x)` for x ≥ 0. Every even term dominates the next odd one, so the
/// value is positive and BigUint subtraction cannot underflow.
fn poly_p_neg(x: &BigUint) -> BigUint {
    let x2 = x * x;
    let x3 = &x2 * x;
    let x4 = &x3 * x;
    (x4 * 36u32 + x2 * 24u32 + 1u32) - (x3 * 36u32 + x * 6u32)
}

/// Find an x whose `P(-x)` has exactly `bits` bits, by multiplicative
/// refinement from `x = 2^(bits/4)`: shrink by 3/4 while too wide, grow by
/// 3/2 while too narrow.
pub fn find_min_x(bits: u64) -> Result<BigUint, Error> {
    let mut x = BigUint::one() << (bits / 4);
    for _ in 0..FIND_X_BUDGET {
        let width = poly_p_neg(&x).bits();
        if width == bits {
            return Ok(x);
        } else if width > bits {
            x = x * 3u32 >> 2;
        } else {
            x = x * 3u32 >> 1;
        }
    }
    Err(Error::ParameterSearchExhausted { bits })
}

/// The serialized form of a generated curve: four integers reconstruct the
/// whole group triple via [`BnCurve::from_params`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BnCurveParams {
    /// Characteristic of the base field.
    pub p: BigUint,
    /// Prime order of the pairing groups.
    pub n: BigUint,
    /// Curve coefficient of `y² = x³ + b`.
    pub b: u64,
    /// y-coordinate of the base generator `(1, y)`; `y² = b + 1`.
    pub y: BigUint,
}

/// Search BN parameters for the requested characteristic bit length.
///
/// Walks x upward from [`find_min_x`], trying `p = P(-x)` before `p = P(x)`
/// at each step, until both p and `n = p + 1 - t` are prime; then sweeps the
/// smallest curve coefficient b ≥ 1 for which `b + 1` is a quadratic residue
/// and `(1, √(b+1))` has order n.
pub fn find_params(bits: u64) -> Result<BnCurveParams, Error> {
    let mut x = find_min_x(bits)?;

    let (p, n) = loop {
        let t = (&x * &x) * 6u32 + 1u32;

        let p = poly_p_neg(&x);
        let n = &p + 1u32 - &t;
        if is_prime(&p) && is_prime(&n) {
            break (p, n);
        }

        let p = poly_p_pos(&x);
        let n = &p + 1u32 - &t;
        if is_prime(&p) && is_prime(&n) {
            break (p, n);
        }

        if p.bits() > bits + 4 {
            return Err(Error::ParameterSearchExhausted { bits });
        }
        x += 1u32;
    };

    let field = PrimeField::new(p.clone());
    for b in 1..=COEFF_BUDGET {
        let b1 = field.from_u64(b + 1);
        if field.legendre(&b1) != 1 {
            continue;
        }
        let curve = Curve::new(field.clone(), field.from_u64(b));
        let y = sqrt(&field, &b1).expect("b + 1 is a residue");
        let g = curve.point(field.one(), y.clone());
        if curve.scalar_mul(&n, &g).is_infinity() {
            return Ok(BnCurveParams { p, n, b, y });
        }
    }
    Err(Error::ParameterSearchExhausted { bits })
}

/// A fully constructed BN curve: field tower, base and extension-field curve
/// groups, and the generator triple.
///
/// `g0 = (1, y)` generates the order-n base group; `g1` is an independent
/// order-n generator of `E(GF(p¹²))` (its Weil pairing with g0 is
/// non-trivial); `gt = e(g0, g1)` generates the order-n target group inside
/// GF(p¹²)*.
#[derive(Clone, Debug)]
pub struct BnCurve {
    params: BnCurveParams,
    scalar: PrimeField,
    base: Curve<PrimeField>,
    ext: Curve<TowerExt>,
    g0: Point<PrimeField>,
    g0_lifted: Point<TowerExt>,
    g1: Point<TowerExt>,
    gt: Fp12,
}

impl BnCurve {
    /// Generate a fresh curve with a `bits`-bit characteristic. The whole
    /// pipeline is deterministic, so equal bit lengths yield equal curves.
    pub fn generate(bits: u64) -> Result<BnCurve, Error> {
        Ok(BnCurve::from_params(find_params(bits)?))
    }

    /// Rebuild a curve from serialized parameters.
    ///
    /// Panics when the parameters are not a valid output of [`find_params`]:
    /// composite p or n, a zero coefficient, a generator of the wrong order,
    /// or a degenerate pairing. Those are corrupt-state conditions, not
    /// recoverable ones.
    pub fn from_params(params: BnCurveParams) -> BnCurve {
        assert!(is_prime(&params.p), "base field characteristic must be prime");
        assert!(is_prime(&params.n), "group order must be prime");
        assert!(params.b != 0, "curve coefficient must be nonzero");

        let base_field = PrimeField::new(params.p.clone());
        let scalar = PrimeField::new(params.n.clone());
        let base = Curve::new(base_field.clone(), base_field.from_u64(params.b));
        let ext_field = TowerExt::new(QuadraticExt::new(base_field.clone()));
        let ext = Curve::new(ext_field.clone(), ext_field.embed_base(&base_field.from_u64(params.b)));

        let g0 = base.point(base_field.one(), base_field.reduce(&params.y));
        assert!(base.contains(&g0), "(1, y) must lie on the curve");
        assert!(
            base.scalar_mul(&params.n, &g0).is_infinity(),
            "(1, y) must have order n"
        );
        let g0_lifted = lift_point(&ext, &g0);

        // #E(GF(p¹²)) from the Frobenius trace recurrence, then strip every
        // factor of n to get the cofactor that projects onto the n-primary
        // part. Multiplying by the plain cofactor N12/n is wrong: the group
        // exponent divides it, so it annihilates every point.
        let n12 = extension_order(&params.p, &params.n);
        let mut cofactor = n12;
        let mut n_multiplicity = 0u32;
        while (&cofactor % &params.n).is_zero() {
            cofactor /= &params.n;
            n_multiplicity += 1;
        }
        assert!(n_multiplicity >= 1, "n must divide the extension group order");

        let mut rng = StdRng::seed_from_u64(GEN_SEED);
        let mut found = None;
        for _ in 0..GEN_BUDGET {
            let mut cand = ext.scalar_mul(&cofactor, &ext.sample_point(&mut rng));
            if cand.is_infinity() {
                continue;
            }
            // reduce the order from a power of n down to exactly n
            loop {
                let next = ext.scalar_mul(&params.n, &cand);
                if next.is_infinity() {
                    break;
                }
                cand = next;
            }
            // keep the first candidate independent of g0
            let gt = weil_pairing(&ext, &params.n, &g0_lifted, &cand);
            if gt != ext_field.one() {
                found = Some((cand, gt));
                break;
            }
        }
        let (g1, gt) = found.expect("no generator independent of (1, y) found");
        assert_eq!(
            ext_field.pow(&gt, &params.n),
            ext_field.one(),
            "pairing value must have order dividing n"
        );

        BnCurve {
            params,
            scalar,
            base,
            ext,
            g0,
            g0_lifted,
            g1,
            gt,
        }
    }

    pub fn params(&self) -> &BnCurveParams {
        &self.params
    }

    /// The common prime order n of the three pairing groups.
    pub fn order(&self) -> &BigUint {
        &self.params.n
    }

    /// GF(n), the field scalars and shares live in.
    pub fn scalar_field(&self) -> &PrimeField {
        &self.scalar
    }

    pub fn base_curve(&self) -> &Curve<PrimeField> {
        &self.base
    }

    /// The extension-field curve `E(GF(p¹²))` hosting both pairing inputs.
    pub fn extension(&self) -> &Curve<TowerExt> {
        &self.ext
    }

    pub fn g0(&self) -> &Point<PrimeField> {
        &self.g0
    }

    /// g0 as a point of the extension-field curve.
    pub fn g0_lifted(&self) -> &Point<TowerExt> {
        &self.g0_lifted
    }

    pub fn g1(&self) -> &Point<TowerExt> {
        &self.g1
    }

    /// `e(g0, g1)`, the target group generator.
    pub fn gt(&self) -> &Fp12 {
        &self.gt
    }

    /// The Weil pairing on `E(GF(p¹²))[n]`. Alternating, so argument order
    /// matters: the crate convention keeps the g0-side point first.
    pub fn pairing(&self, p: &Point<TowerExt>, q: &Point<TowerExt>) -> Fp12 {
        weil_pairing(&self.ext, &self.params.n, p, q)
    }

    /// Embed a base-curve point into `E(GF(p¹²))`.
    pub fn lift_base(&self, p: &Point<PrimeField>) -> Point<TowerExt> {
        lift_point(&self.ext, p)
    }

    /// Embed an integer message as a GF(p¹²) element (reduced mod p).
    pub fn embed_message(&self, m: &BigUint) -> Fp12 {
        self.ext.field().embed_base(&self.base.field().reduce(m))
    }

    /// Hash a message to a base-curve point: SHA3-256(msg ‖ counter) mod p as
    /// an x-candidate until one lifts. The base group has prime order n, so
    /// no cofactor clearing is needed.
    pub fn hash_to_g0(&self, msg: &[u8]) -> Point<PrimeField> {
        let mut input = Vec::with_capacity(msg.len() + 4);
        for ctr in 0..HASH_BUDGET {
            input.clear();
            input.extend_from_slice(msg);
            input.extend_from_slice(&ctr.to_be_bytes());
            let x = self.base.field().reduce(&BigUint::from_bytes_be(&sha3_256(&input)));
            if let Some(p) = self.base.lift_x(&x) {
                return p;
            }
        }
        panic!("no hash counter produced a liftable x-coordinate");
    }
}

fn lift_point(ext: &Curve<TowerExt>, p: &Point<PrimeField>) -> Point<TowerExt> {
    match p {
        Point::Infinity => Point::Infinity,
        Point::Affine { x, y } => {
            let f = ext.field();
            ext.point(f.embed_base(x), f.embed_base(y))
        }
    }
}

/// `#E(GF(p¹²)) = p¹² + 1 - t₁₂` where the Frobenius traces satisfy
/// `t_k = t·t_{k-1} - p·t_{k-2}` with `t₀ = 2`, `t₁ = t = p + 1 - n`.
fn extension_order(p: &BigUint, n: &BigUint) -> BigUint {
    let p = BigInt::from(p.clone());
    let t1 = &p + 1u32 - BigInt::from(n.clone());
    let mut prev = BigInt::from(2);
    let mut cur = t1.clone();
    for _ in 2..=12 {
        let next = &t1 * &cur - &p * &prev;
        prev = cur;
        cur = next;
    }
    let mut p12 = BigInt::one();
    for _ in 0..12 {
        p12 *= &p;
    }
    (p12 + 1u32 - cur)
        .to_biguint()
        .expect("extension group order is positive by Hasse-Weil")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_min_x_hits_the_target_width() {
        let x = find_min_x(32).unwrap();
        assert_eq!(poly_p_neg(&x).bits(), 32);
    }

    #[test]
    fn find_min_x_reports_unreachable_widths() {
        // the refinement cycles at x = 0 for 2-bit targets
        assert_eq!(
            find_min_x(2),
            Err(Error::ParameterSearchExhausted { bits: 2 })
        );
    }

    #[test]
    fn find_params_is_reproducible_at_32_bits() {
        let params = find_params(32).unwrap();
        assert_eq!(params.p, BigUint::from(4_675_038_223u64));
        assert_eq!(params.n, BigUint::from(4_674_969_529u64));
        assert_eq!(params.b, 29);
        // either square root of b + 1 is a valid generator coordinate
        let f = PrimeField::new(params.p.clone());
        assert_eq!(f.mul(&params.y, &params.y), f.from_u64(30));
    }

    #[test]
    fn find_params_at_16_bits() {
        // p ≡ 1 (mod 4) here, exercising the fallback GF(p²) non-residue
        let params = find_params(16).unwrap();
        assert_eq!(params.p, BigUint::from(55333u64));
        assert_eq!(params.b, 18);
        assert!(is_prime(&params.n));
    }

    #[test]
    fn generated_curve_satisfies_the_group_contracts() {
        let c = crate::testing::curve32();
        let n = c.order();

        assert!(c.base_curve().contains(c.g0()));
        assert!(c.base_curve().scalar_mul(n, c.g0()).is_infinity());

        assert!(c.extension().contains(c.g1()));
        assert!(c.extension().scalar_mul(n, c.g1()).is_infinity());
        assert!(!c.g1().is_infinity());

        let fp12 = c.extension().field();
        assert_ne!(*c.gt(), fp12.one());
        assert_eq!(fp12.pow(c.gt(), n), fp12.one());
    }

    #[test]
    fn generate_matches_the_fixed_params() {
        let c = BnCurve::generate(32).unwrap();
        let fixed = crate::testing::curve32();
        assert_eq!(c.params().p, fixed.params().p);
        assert_eq!(c.params().n, fixed.params().n);
        assert_eq!(c.params().b, fixed.params().b);
    }

    #[test]
    fn from_params_is_deterministic() {
        let c = crate::testing::curve32();
        let rebuilt = BnCurve::from_params(c.params().clone());
        assert_eq!(rebuilt.g1(), c.g1());
        assert_eq!(rebuilt.gt(), c.gt());
    }

    #[test]
    fn extension_order_is_divisible_by_n_squared_at_most() {
        let c = crate::testing::curve32();
        let n12 = extension_order(&c.params().p, &c.params().n);
        let n = c.order();
        assert!((&n12 % n).is_zero());
        assert!((&n12 / n % n).is_zero());
        assert!(!(&n12 / n / n % n).is_zero());
    }

    #[test]
    fn message_embedding_reduces_mod_p() {
        let c = crate::testing::curve32();
        let m = c.embed_message(&BigUint::from(39u32));
        assert_eq!(m, c.extension().field().embed_base(&BigUint::from(39u32)));
        let wrapped = c.embed_message(&(c.params().p.clone() + 39u32));
        assert_eq!(wrapped, m);
    }

    #[test]
    fn hash_to_g0_lands_on_the_curve() {
        let c = crate::testing::curve32();
        let h1 = c.hash_to_g0(b"message one");
        let h2 = c.hash_to_g0(b"message two");
        assert!(c.base_curve().contains(&h1));
        assert!(c.base_curve().contains(&h2));
        assert_ne!(h1, h2);
        assert_eq!(h1, c.hash_to_g0(b"message one"));
    }
}
