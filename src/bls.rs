//! BLS signatures and tag-based encryption over a generated curve.
//!
//! Signatures live in the base group (hash-to-point output), verification
//! keys in the extension group, and verification is the pairing equation
//! `e(H(m), vk) = e(σ, g1)`. Boneh, Lynn and Shacham, "Short Signatures from
//! the Weil Pairing", ASIACRYPT 2001.
//!
//! The same key pair doubles as an encryption key: [`encrypt`] blinds a
//! GF(p¹²) message with `e(r·H(tag), vk)` so that only the signing key
//! holder can strip the blinding, as in the silent-threshold construction of
//! Garg, Kolonelos, Policharla and Wang (CRYPTO 2024).

use num_bigint::BigUint;
use rand::{CryptoRng, Rng};

use crate::bn::BnCurve;
use crate::curve::Point;
use crate::field::{Field, Fp12, PrimeField, TowerExt};

/// Signing key: a nonzero scalar.
#[derive(Clone, Debug, PartialEq)]
pub struct SigningKey {
    sk: BigUint,
}

/// Verification key `vk = sk · g1`.
#[derive(Clone, Debug, PartialEq)]
pub struct VerifyingKey {
    vk: Point<TowerExt>,
}

/// A signature `σ = sk · H(m)` on the base curve.
#[derive(Clone, Debug, PartialEq)]
pub struct Signature {
    sigma: Point<PrimeField>,
}

pub fn keygen<R: Rng + CryptoRng>(curve: &BnCurve, rng: &mut R) -> (SigningKey, VerifyingKey) {
    let scalar = curve.scalar_field();
    let sk = loop {
        let v = scalar.sample(rng);
        if v != scalar.zero() {
            break v;
        }
    };
    let vk = curve.extension().scalar_mul(&sk, curve.g1());
    (SigningKey { sk }, VerifyingKey { vk })
}

pub fn sign(curve: &BnCurve, key: &SigningKey, msg: &[u8]) -> Signature {
    let h = curve.hash_to_g0(msg);
    Signature {
        sigma: curve.base_curve().scalar_mul(&key.sk, &h),
    }
}

/// `e(H(m), vk) = e(sk·H(m), g1)` holds exactly for signatures by the key
/// behind `vk`; both sides keep the g0-side point first.
pub fn verify(curve: &BnCurve, key: &VerifyingKey, msg: &[u8], sig: &Signature) -> bool {
    let h = curve.lift_base(&curve.hash_to_g0(msg));
    let sigma = curve.lift_base(&sig.sigma);
    curve.pairing(&h, &key.vk) == curve.pairing(&sigma, curve.g1())
}

/// A message encrypted towards a verification key under a tag:
/// `(c1, c2) = (r·g1, m · e(r·H(tag), vk))`.
#[derive(Clone, Debug, PartialEq)]
pub struct TagCiphertext {
    c1: Point<TowerExt>,
    c2: Fp12,
}

/// Blind `message` towards the holder of the signing key behind `key`, bound
/// to `tag`.
pub fn encrypt<R: Rng + CryptoRng>(
    curve: &BnCurve,
    key: &VerifyingKey,
    tag: &[u8],
    message: &Fp12,
    rng: &mut R,
) -> TagCiphertext {
    let r = curve.scalar_field().sample(rng);
    let h = curve.lift_base(&curve.hash_to_g0(tag));
    let rh = curve.extension().scalar_mul(&r, &h);
    let blind = curve.pairing(&rh, &key.vk);
    TagCiphertext {
        c1: curve.extension().scalar_mul(&r, curve.g1()),
        c2: curve.extension().field().mul(message, &blind),
    }
}

/// Unblind a tag ciphertext: `m = c2 / e(H(tag), c1)^sk`. Both pairings in
/// the scheme keep the hashed g0-side point first, so the blinding factors
/// agree at `e(H(tag), g1)^{r·sk}`. A wrong tag or key silently yields a
/// wrong group element.
pub fn decrypt(curve: &BnCurve, key: &SigningKey, tag: &[u8], ct: &TagCiphertext) -> Fp12 {
    let ext = curve.extension().field();
    let h = curve.lift_base(&curve.hash_to_g0(tag));
    let factor = ext.pow(&curve.pairing(&h, &ct.c1), &key.sk);
    ext.div(&ct.c2, &factor).expect("pairing values are units")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn sign_verify_roundtrip() {
        let curve = crate::testing::curve32();
        let mut rng = StdRng::seed_from_u64(60);
        let (sk, vk) = keygen(curve, &mut rng);
        let sig = sign(curve, &sk, b"attribute authority transcript");
        assert!(verify(curve, &vk, b"attribute authority transcript", &sig));
    }

    #[test]
    fn tampered_message_fails() {
        let curve = crate::testing::curve32();
        let mut rng = StdRng::seed_from_u64(61);
        let (sk, vk) = keygen(curve, &mut rng);
        let sig = sign(curve, &sk, b"original");
        assert!(!verify(curve, &vk, b"tampered", &sig));
    }

    #[test]
    fn foreign_key_fails() {
        let curve = crate::testing::curve32();
        let mut rng = StdRng::seed_from_u64(62);
        let (sk, _) = keygen(curve, &mut rng);
        let (_, other_vk) = keygen(curve, &mut rng);
        let sig = sign(curve, &sk, b"message");
        assert!(!verify(curve, &other_vk, b"message", &sig));
    }

    #[test]
    fn tag_encryption_roundtrip() {
        let curve = crate::testing::curve32();
        let ext = curve.extension().field();
        let mut rng = StdRng::seed_from_u64(63);
        let (sk, vk) = keygen(curve, &mut rng);
        // a target-group message, as the scheme expects
        let m = ext.pow(curve.gt(), &BigUint::from(271_828u32));
        let ct = encrypt(curve, &vk, b"Admin", &m, &mut rng);
        assert_eq!(decrypt(curve, &sk, b"Admin", &ct), m);
    }

    #[test]
    fn tag_mismatch_yields_a_wrong_message() {
        let curve = crate::testing::curve32();
        let ext = curve.extension().field();
        let mut rng = StdRng::seed_from_u64(64);
        let (sk, vk) = keygen(curve, &mut rng);
        let m = ext.pow(curve.gt(), &BigUint::from(314_159u32));
        let ct = encrypt(curve, &vk, b"Admin", &m, &mut rng);
        assert_ne!(decrypt(curve, &sk, b"Guest", &ct), m);
    }

    #[test]
    fn foreign_signing_key_cannot_decrypt() {
        let curve = crate::testing::curve32();
        let ext = curve.extension().field();
        let mut rng = StdRng::seed_from_u64(65);
        let (_, vk) = keygen(curve, &mut rng);
        let (other_sk, _) = keygen(curve, &mut rng);
        let m = ext.pow(curve.gt(), &BigUint::from(161_803u32));
        let ct = encrypt(curve, &vk, b"Admin", &m, &mut rng);
        assert_ne!(decrypt(curve, &other_sk, b"Admin", &ct), m);
    }
}
