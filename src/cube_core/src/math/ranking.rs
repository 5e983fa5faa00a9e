//! Perfect hashing of cubie orbits.
//!
//! A cubie orbit (the corners or the edges of the cube) is described by a
//! permutation vector, where index `i` is a slot and the value is the cubie
//! sitting in that slot, and an orientation vector of twists modulo some
//! base. This module provides bijections between those vectors and dense
//! integers so that orbit states can index flat tables:
//!
//! - permutations of length `k` map onto `[0, k!)` via the Lehmer code
//!   (factorial number system), with lexicographic order preserved;
//! - orientation vectors map onto `[0, base^(k-1))` via a mixed radix
//!   encoding of all but the last digit, which is implied by the
//!   orientation conservation law;
//! - the two compose into an orbit rank in `[0, k! * base^(k-1))`.

use super::{FACT_UNTIL_20, pow};
use thiserror::Error;

/// The longest permutation whose rank fits in a `u64`.
pub const MAX_PERMUTATION_LEN: usize = 20;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RankingError {
    #[error("{permutation:?} is not a permutation of 0..{}", .permutation.len())]
    InvalidPermutation { permutation: Vec<u8> },
    #[error("Permutations of length {0} cannot be ranked, the maximum is {MAX_PERMUTATION_LEN}")]
    PermutationTooLong(usize),
    #[error("Rank {rank} is out of range for a rank space of size {space}")]
    RankOutOfRange { rank: u64, space: u64 },
    #[error("Orientation digit {digit} is not less than the base {base}")]
    OrientationDigitOutOfRange { digit: u8, base: u8 },
    #[error("{orientation:?} does not sum to zero modulo {base}")]
    InvalidOrientation { orientation: Vec<u8>, base: u8 },
    #[error("A permutation of length {permutation} cannot pair with an orientation of length {orientation}")]
    OrbitLengthMismatch { permutation: usize, orientation: usize },
}

/// The number of permutations of length `k`.
///
/// # Panics
///
/// If `k` is greater than [`MAX_PERMUTATION_LEN`].
#[must_use]
pub const fn permutation_rank_space(k: usize) -> u64 {
    FACT_UNTIL_20[k]
}

/// The number of encodable orientation vectors of length `k`. The last
/// digit is implied, so this is `base^(k-1)`.
#[must_use]
pub const fn orientation_rank_space(k: usize, base: u8) -> u64 {
    if k == 0 {
        1
    } else {
        pow(base as u64, k as u32 - 1)
    }
}

/// The size of the combined permutation and orientation rank space of an
/// orbit, `k! * base^(k-1)`. For the corners of the cube this is
/// `8! * 3^7 = 88_179_840`.
#[must_use]
pub const fn orbit_rank_space(k: usize, base: u8) -> u64 {
    permutation_rank_space(k) * orientation_rank_space(k, base)
}

/// Check that `perm` is a bijection on `0..perm.len()` with a multiplicity
/// count. Permutations longer than [`MAX_PERMUTATION_LEN`] are rejected.
#[must_use]
pub fn is_permutation(perm: &[u8]) -> bool {
    if perm.len() > MAX_PERMUTATION_LEN {
        return false;
    }
    let mut seen = 0_u32;
    for &value in perm {
        let value = usize::from(value);
        if value >= perm.len() || seen & (1 << value) != 0 {
            return false;
        }
        seen |= 1 << value;
    }
    true
}

/// Rank a permutation of `0..perm.len()` by its Lehmer code.
///
/// For every position `i`, the number of smaller values to its right is
/// the `i`th digit in the factorial number system. Rather than counting
/// them with a nested loop, we keep a bit vector of the values already seen
/// to the left; the smaller values to the right are then the smaller values
/// not yet seen, which is one popcount.
///
/// # Errors
///
/// If `perm` is not a permutation of `0..perm.len()` or is too long to rank.
pub fn rank_permutation(perm: &[u8]) -> Result<u64, RankingError> {
    if perm.len() > MAX_PERMUTATION_LEN {
        return Err(RankingError::PermutationTooLong(perm.len()));
    }
    if !is_permutation(perm) {
        return Err(RankingError::InvalidPermutation {
            permutation: perm.to_vec(),
        });
    }
    let k = perm.len();
    let mut seen = 0_u32;
    let mut rank = 0;
    for (i, &value) in perm.iter().enumerate() {
        let smaller_seen = (seen & ((1 << value) - 1)).count_ones();
        let smaller_right = u64::from(value) - u64::from(smaller_seen);
        rank += smaller_right * FACT_UNTIL_20[k - 1 - i];
        seen |= 1 << value;
    }
    Ok(rank)
}

/// Write the permutation of length `out.len()` with the given Lehmer rank
/// into `out`.
///
/// # Errors
///
/// If `rank` is not less than `out.len()!` or `out` is too long.
pub fn unrank_permutation_into(mut rank: u64, out: &mut [u8]) -> Result<(), RankingError> {
    let k = out.len();
    if k > MAX_PERMUTATION_LEN {
        return Err(RankingError::PermutationTooLong(k));
    }
    let space = permutation_rank_space(k);
    if rank >= space {
        return Err(RankingError::RankOutOfRange { rank, space });
    }
    let mut used = 0_u32;
    for (i, slot) in out.iter_mut().enumerate() {
        let fact = FACT_UNTIL_20[k - 1 - i];
        // `digit` is below `k - i` so this is lossless
        #[allow(clippy::cast_possible_truncation)]
        let mut digit = (rank / fact) as u32;
        rank %= fact;
        // Take the `digit + 1`th unused symbol in ascending order
        let mut symbol = 0_u32;
        loop {
            if used & (1 << symbol) == 0 {
                if digit == 0 {
                    break;
                }
                digit -= 1;
            }
            symbol += 1;
        }
        used |= 1 << symbol;
        // `symbol` is below `k <= 20`
        #[allow(clippy::cast_possible_truncation)]
        let symbol = symbol as u8;
        *slot = symbol;
    }
    Ok(())
}

/// The permutation of length `k` with the given Lehmer rank.
///
/// # Errors
///
/// If `rank` is not less than `k!` or `k` is too large.
pub fn unrank_permutation(k: usize, rank: u64) -> Result<Vec<u8>, RankingError> {
    let mut perm = vec![0; k];
    unrank_permutation_into(rank, &mut perm)?;
    Ok(perm)
}

/// Encode all but the last digit of an orientation vector in base `base`,
/// most significant digit first. The last digit is not encoded because the
/// orientation conservation law determines it, but it is still checked.
///
/// # Errors
///
/// If any digit is not less than `base`, or if the digits do not sum to
/// zero modulo `base`.
pub fn encode_orientation(ori: &[u8], base: u8) -> Result<u64, RankingError> {
    let Some((&last, encoded)) = ori.split_last() else {
        return Ok(0);
    };
    let mut rank = 0;
    let mut sum = u32::from(last);
    for &digit in encoded {
        if digit >= base {
            return Err(RankingError::OrientationDigitOutOfRange { digit, base });
        }
        rank = rank * u64::from(base) + u64::from(digit);
        sum += u32::from(digit);
    }
    if last >= base {
        return Err(RankingError::OrientationDigitOutOfRange { digit: last, base });
    }
    if !sum.is_multiple_of(u32::from(base)) {
        return Err(RankingError::InvalidOrientation {
            orientation: ori.to_vec(),
            base,
        });
    }
    Ok(rank)
}

/// Decode an orientation rank into `out`, reconstructing the last digit so
/// that the digits sum to zero modulo `base`.
///
/// # Errors
///
/// If `rank` is not less than `base^(out.len()-1)`.
pub fn decode_orientation_into(rank: u64, base: u8, out: &mut [u8]) -> Result<(), RankingError> {
    let space = orientation_rank_space(out.len(), base);
    if rank >= space {
        return Err(RankingError::RankOutOfRange { rank, space });
    }
    let Some((last, decoded)) = out.split_last_mut() else {
        return Ok(());
    };
    let mut remaining = rank;
    let mut sum = 0_u32;
    for digit in decoded.iter_mut().rev() {
        // The remainder is below `base`
        #[allow(clippy::cast_possible_truncation)]
        let value = (remaining % u64::from(base)) as u8;
        *digit = value;
        remaining /= u64::from(base);
        sum += u32::from(*digit);
    }
    let base = u32::from(base);
    #[allow(clippy::cast_possible_truncation)]
    let implied = ((base - sum % base) % base) as u8;
    *last = implied;
    Ok(())
}

/// The orientation vector of length `k` with the given rank.
///
/// # Errors
///
/// If `rank` is not less than `base^(k-1)`.
pub fn decode_orientation(k: usize, base: u8, rank: u64) -> Result<Vec<u8>, RankingError> {
    let mut ori = vec![0; k];
    decode_orientation_into(rank, base, &mut ori)?;
    Ok(ori)
}

/// Rank a whole orbit, `perm_rank * base^(k-1) + ori_rank`.
///
/// # Errors
///
/// If the permutation or orientation vector is malformed, or if their
/// lengths differ.
pub fn rank_orbit(perm: &[u8], ori: &[u8], base: u8) -> Result<u64, RankingError> {
    if perm.len() != ori.len() {
        return Err(RankingError::OrbitLengthMismatch {
            permutation: perm.len(),
            orientation: ori.len(),
        });
    }
    let perm_rank = rank_permutation(perm)?;
    let ori_rank = encode_orientation(ori, base)?;
    Ok(perm_rank * orientation_rank_space(perm.len(), base) + ori_rank)
}

/// Unrank a whole orbit into `perm` and `ori`, which must have equal
/// lengths.
///
/// # Errors
///
/// If `rank` is out of range of the orbit's rank space.
pub fn unrank_orbit_into(
    rank: u64,
    base: u8,
    perm: &mut [u8],
    ori: &mut [u8],
) -> Result<(), RankingError> {
    debug_assert_eq!(perm.len(), ori.len());
    let space = orbit_rank_space(perm.len(), base);
    if rank >= space {
        return Err(RankingError::RankOutOfRange { rank, space });
    }
    let ori_space = orientation_rank_space(perm.len(), base);
    unrank_permutation_into(rank / ori_space, perm)?;
    decode_orientation_into(rank % ori_space, base, ori)
}

/// The permutation and orientation vectors of length `k` with the given
/// orbit rank.
///
/// # Errors
///
/// If `rank` is out of range of the orbit's rank space.
pub fn unrank_orbit(k: usize, base: u8, rank: u64) -> Result<(Vec<u8>, Vec<u8>), RankingError> {
    let mut perm = vec![0; k];
    let mut ori = vec![0; k];
    unrank_orbit_into(rank, base, &mut perm, &mut ori)?;
    Ok((perm, ori))
}

/// Linear time ranking and unranking of permutations, after Myrvold and
/// Ruskey. The order is not lexicographic, but it is still a bijection onto
/// `[0, k!)`. Both directions are written iteratively.
pub mod linear {
    use super::{MAX_PERMUTATION_LEN, RankingError, is_permutation, permutation_rank_space};

    /// # Errors
    ///
    /// If `perm` is not a permutation of `0..perm.len()`.
    pub fn rank(perm: &[u8]) -> Result<u64, RankingError> {
        if perm.len() > MAX_PERMUTATION_LEN {
            return Err(RankingError::PermutationTooLong(perm.len()));
        }
        if !is_permutation(perm) {
            return Err(RankingError::InvalidPermutation {
                permutation: perm.to_vec(),
            });
        }
        let mut pi = [0_u8; MAX_PERMUTATION_LEN];
        let mut pi_inv = [0_u8; MAX_PERMUTATION_LEN];
        let k = perm.len();
        pi[..k].copy_from_slice(perm);
        for (i, &value) in perm.iter().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            let position = i as u8;
            pi_inv[usize::from(value)] = position;
        }

        let mut rank = 0;
        let mut multiplier = 1;
        for n in (2..=k).rev() {
            let s = pi[n - 1];
            pi.swap(n - 1, usize::from(pi_inv[n - 1]));
            pi_inv.swap(usize::from(s), n - 1);
            rank += u64::from(s) * multiplier;
            multiplier *= n as u64;
        }
        Ok(rank)
    }

    /// # Errors
    ///
    /// If `rank` is not less than `k!`.
    pub fn unrank(k: usize, mut rank: u64) -> Result<Vec<u8>, RankingError> {
        if k > MAX_PERMUTATION_LEN {
            return Err(RankingError::PermutationTooLong(k));
        }
        let space = permutation_rank_space(k);
        if rank >= space {
            return Err(RankingError::RankOutOfRange { rank, space });
        }
        #[allow(clippy::cast_possible_truncation)]
        let mut pi = (0..k).map(|i| i as u8).collect::<Vec<_>>();
        for n in (1..=k).rev() {
            #[allow(clippy::cast_possible_truncation)]
            let r = (rank % n as u64) as usize;
            pi.swap(n - 1, r);
            rank /= n as u64;
        }
        Ok(pi)
    }
}
