//! Page arithmetic for filtered result sets.

use std::num::NonZeroU32;

/// Page size applied when the caller does not supply `limit`.
pub const DEFAULT_PAGE_LIMIT: NonZeroU32 = match NonZeroU32::new(10) {
    Some(limit) => limit,
    None => unreachable!(),
};

/// Number of pages needed to hold `total` matches at `limit` per page.
///
/// `limit` is non-zero by construction; zero and negative limits are
/// rejected at the HTTP boundary before arithmetic happens.
pub fn page_count(total: u64, limit: NonZeroU32) -> u64 {
    total.div_ceil(u64::from(limit.get()))
}
