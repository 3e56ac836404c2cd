//! Fuzzy identity based encryption over freshly generated, deliberately small
//! Barreto-Naehrig pairing curves.
//!
//! Unlike production pairing crates, no curve is baked in at compile time:
//! [`BnCurve::generate`](bn::BnCurve::generate) searches BN parameters for a
//! requested bit length and builds the whole field tower, curve groups and
//! generator triple at runtime. The parameters serialize as four integers and
//! reconstruct deterministically. On top of the pairing sit the Sahai-Waters
//! fuzzy IBE scheme ([`fuzzy`]) and BLS signatures with tag-based
//! encryption ([`bls`]).
//!
//! The curves are research-scale (tens of bits) and the arithmetic is not
//! constant time; this crate is for studying and testing pairing protocols,
//! not for protecting data.
//!
//! # Examples
//!
//! ```
//! use fuzzy_ibe::bn::{BnCurve, BnCurveParams};
//! use fuzzy_ibe::fuzzy;
//! use num_bigint::BigUint;
//!
//! let mut rng = rand::thread_rng();
//!
//! // A fixed 32-bit research curve; `BnCurve::generate(32)` finds the same one.
//! let curve = BnCurve::from_params(BnCurveParams {
//!     p: BigUint::from(4_675_038_223u64),
//!     n: BigUint::from(4_674_969_529u64),
//!     b: 29,
//!     y: BigUint::from(1_270_807_500u64),
//! });
//!
//! // Provision six attributes and issue a key for four of them, any two of
//! // which suffice to decrypt.
//! let (pp, msk) = fuzzy::setup(&curve, &[1, 2, 3, 4, 5, 6], &mut rng)?;
//! let key = fuzzy::keygen(&curve, &msk, &[3, 5, 2, 6], 2, &mut rng)?;
//!
//! let message = curve.embed_message(&BigUint::from(39u32));
//! let ct = fuzzy::encrypt(&curve, &pp, &[3, 5], &message, &mut rng)?;
//! assert_eq!(fuzzy::decrypt(&curve, &key, &ct), message);
//! # Ok::<(), fuzzy_ibe::Error>(())
//! ```

mod util;

pub mod bls;
pub mod bn;
pub mod curve;
pub mod errors;
pub mod field;
pub mod fuzzy;
pub mod lagrange;
pub mod pairing;
pub mod sharing;

pub use bn::{BnCurve, BnCurveParams};
pub use errors::Error;

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::OnceLock;

    use num_bigint::BigUint;

    use crate::bn::{BnCurve, BnCurveParams};

    static CURVE32: OnceLock<BnCurve> = OnceLock::new();

    /// The fixed 32-bit curve, built once per test binary.
    pub(crate) fn curve32() -> &'static BnCurve {
        CURVE32.get_or_init(|| {
            BnCurve::from_params(BnCurveParams {
                p: BigUint::from(4_675_038_223u64),
                n: BigUint::from(4_674_969_529u64),
                b: 29,
                y: BigUint::from(1_270_807_500u64),
            })
        })
    }
}
