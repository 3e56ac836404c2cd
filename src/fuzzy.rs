//! Sahai-Waters fuzzy identity based encryption.
//!
//! Identities are attribute sets; a key issued for identity ω with threshold
//! d decrypts any ciphertext whose attribute set overlaps ω in at least d
//! attributes. The master secret y is Shamir-shared over the key's
//! attributes, and decryption recombines the shares in the exponent through
//! pairings and a Lagrange basis at zero.
//!
//! See Sahai and Waters, "Fuzzy Identity-Based Encryption", EUROCRYPT 2005:
//! <https://eprint.iacr.org/2004/086>.

use std::collections::{BTreeMap, BTreeSet};

use num_bigint::BigUint;
use rand::{CryptoRng, Rng};

use crate::bn::BnCurve;
use crate::curve::Point;
use crate::errors::Error;
use crate::field::{Field, Fp12, PrimeField, TowerExt};
use crate::lagrange::lagrange_basis;
use crate::sharing::SecretPolynomial;

/// Attribute identifier. Must be nonzero and distinct modulo the group order
/// across the universe; both are checked at setup.
pub type Attribute = u64;

/// Kept by the authority; grants the power to issue decryption keys.
#[derive(Clone, Debug, PartialEq)]
pub struct MasterSecret {
    y: BigUint,
    t: BTreeMap<Attribute, BigUint>,
}

/// Published after setup; sufficient to encrypt to any attribute subset.
#[derive(Clone, Debug, PartialEq)]
pub struct PublicParams {
    /// `Y = e(g0, g1)^y`, the blinding base.
    y_pair: Fp12,
    /// `T_i = t_i · g0` per universe attribute.
    attr_points: BTreeMap<Attribute, Point<PrimeField>>,
}

impl PublicParams {
    pub fn attributes(&self) -> impl Iterator<Item = Attribute> + '_ {
        self.attr_points.keys().copied()
    }
}

/// A user key for an identity: one share point `D_i = (q(i)/t_i) · g1` per
/// identity attribute, where q is a fresh polynomial with `q(0) = y` and
/// degree `threshold - 1`.
#[derive(Clone, Debug, PartialEq)]
pub struct DecryptionKey {
    entries: BTreeMap<Attribute, Point<TowerExt>>,
}

impl DecryptionKey {
    pub fn attributes(&self) -> impl Iterator<Item = Attribute> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A message blinded towards an attribute set: `E' = m · Y^s` together with
/// `E_i = s · T_i` per ciphertext attribute.
#[derive(Clone, Debug, PartialEq)]
pub struct Ciphertext {
    eprime: Fp12,
    parts: BTreeMap<Attribute, Point<PrimeField>>,
}

impl Ciphertext {
    pub fn attributes(&self) -> impl Iterator<Item = Attribute> + '_ {
        self.parts.keys().copied()
    }
}

/// Provision an attribute universe: draw the master secret y and one secret
/// t_i per attribute.
///
/// Attribute ids must be nonzero and pairwise distinct modulo the group
/// order; an id ≡ 0 would evaluate every share polynomial at its secret
/// constant term.
pub fn setup<R: Rng + CryptoRng>(
    curve: &BnCurve,
    universe: &[Attribute],
    rng: &mut R,
) -> Result<(PublicParams, MasterSecret), Error> {
    if universe.is_empty() {
        return Err(Error::EmptyUniverse);
    }
    let scalar = curve.scalar_field();
    let mut seen = BTreeSet::new();
    for &id in universe {
        let reduced = scalar.reduce(&BigUint::from(id));
        if reduced == scalar.zero() || !seen.insert(reduced) {
            return Err(Error::InvalidAttribute(id));
        }
    }

    let y = sample_nonzero(scalar, rng);
    let mut t = BTreeMap::new();
    let mut attr_points = BTreeMap::new();
    for &id in universe {
        let ti = sample_nonzero(scalar, rng);
        attr_points.insert(id, curve.base_curve().scalar_mul(&ti, curve.g0()));
        t.insert(id, ti);
    }

    let y_pair = curve.extension().field().pow(curve.gt(), &y);
    Ok((PublicParams { y_pair, attr_points }, MasterSecret { y, t }))
}

/// Issue a key for `identity` with overlap threshold `threshold`.
///
/// The threshold must lie in `[2, identity.len()]`; every identity attribute
/// must have been provisioned at setup.
pub fn keygen<R: Rng + CryptoRng>(
    curve: &BnCurve,
    msk: &MasterSecret,
    identity: &[Attribute],
    threshold: usize,
    rng: &mut R,
) -> Result<DecryptionKey, Error> {
    if threshold < 2 || threshold > identity.len() {
        return Err(Error::InvalidThreshold {
            threshold,
            identity_len: identity.len(),
        });
    }
    let scalar = curve.scalar_field();
    let poly = SecretPolynomial::random(scalar, &msk.y, threshold, rng);

    let mut entries = BTreeMap::new();
    for &id in identity {
        let ti = msk.t.get(&id).ok_or(Error::UnknownAttribute(id))?;
        let share = poly.eval(&BigUint::from(id));
        let exponent = scalar
            .div(&share, ti)
            .expect("per-attribute secrets are nonzero");
        entries.insert(id, curve.extension().scalar_mul(&exponent, curve.g1()));
    }
    Ok(DecryptionKey { entries })
}

/// Blind `message` towards `attrs`. Anyone holding a key whose identity
/// overlaps `attrs` in at least the key's threshold can recover it.
pub fn encrypt<R: Rng + CryptoRng>(
    curve: &BnCurve,
    pp: &PublicParams,
    attrs: &[Attribute],
    message: &Fp12,
    rng: &mut R,
) -> Result<Ciphertext, Error> {
    let scalar = curve.scalar_field();
    let s = sample_nonzero(scalar, rng);

    let mut parts = BTreeMap::new();
    for &id in attrs {
        let ti_point = pp.attr_points.get(&id).ok_or(Error::UnknownAttribute(id))?;
        parts.insert(id, curve.base_curve().scalar_mul(&s, ti_point));
    }

    let ext = curve.extension().field();
    let eprime = ext.mul(message, &ext.pow(&pp.y_pair, &s));
    Ok(Ciphertext { eprime, parts })
}

/// Unblind a ciphertext with a key.
///
/// Combines the shares for S = key attributes ∩ ciphertext attributes:
/// `m = E' / Π_{i∈S} e(E_i, D_i)^{λ_i}` with the Lagrange basis λ taken at
/// zero. The pairing is alternating, so the g0-side part E_i goes first;
/// each factor is then `e(g0, g1)^{s·q(i)·λ_i}` and the product telescopes
/// to `Y^s`.
///
/// No overlap check is performed: when |S| is below the key's threshold the
/// exponents recombine to the wrong polynomial value and the result is an
/// undetectably wrong group element, not an error.
pub fn decrypt(curve: &BnCurve, key: &DecryptionKey, ct: &Ciphertext) -> Fp12 {
    let scalar = curve.scalar_field();
    let ext = curve.extension().field();

    let shared: Vec<Attribute> = key
        .entries
        .keys()
        .filter(|id| ct.parts.contains_key(*id))
        .copied()
        .collect();
    let nodes: Vec<BigUint> = shared
        .iter()
        .map(|&id| scalar.reduce(&BigUint::from(id)))
        .collect();
    let basis = lagrange_basis(scalar, &nodes, &scalar.zero());

    let mut blind = ext.one();
    for (id, node) in shared.iter().zip(&nodes) {
        let li = &basis[node];
        let ei = curve.lift_base(&ct.parts[id]);
        let pair = curve.pairing(&ei, &key.entries[id]);
        blind = ext.mul(&blind, &ext.pow(&pair, li));
    }

    ext.div(&ct.eprime, &blind)
        .expect("pairing values are units")
}

fn sample_nonzero<R: Rng + CryptoRng>(field: &PrimeField, rng: &mut R) -> BigUint {
    loop {
        let v = field.sample(rng);
        if v != field.zero() {
            return v;
        }
    }
}
