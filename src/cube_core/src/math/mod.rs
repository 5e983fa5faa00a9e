pub mod ranking;

/// A precomputed factorial table for 0! to 20!, where index[i] is i!. 20! is
/// the largest factorial that fits in a u64.
pub const FACT_UNTIL_20: [u64; 21] = {
    let mut arr = [0; 21];
    arr[0] = 1;
    let mut i = 1;
    while i <= 20 {
        arr[i] = arr[i - 1] * i as u64;
        i += 1;
    }
    arr
};

/// `base` raised to `exp`, usable in const contexts.
#[must_use]
pub const fn pow(base: u64, exp: u32) -> u64 {
    let mut result = 1;
    let mut i = 0;
    while i < exp {
        result *= base;
        i += 1;
    }
    result
}
