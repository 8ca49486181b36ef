use crate::model::Ms;

pub const MAX_SHOPS: usize = 1024;
pub const MAX_SHOP_NAME_LEN: usize = 64;

pub const MAX_BARBERS_PER_SHOP: usize = 1_000;
pub const MAX_SERVICES_PER_SHOP: usize = 1_000;
pub const MAX_BLOCKS_PER_BARBER: usize = 64;
pub const MAX_APPOINTMENTS_PER_BARBER: usize = 100_000;

pub const MAX_NAME_LEN: usize = 256;
pub const MAX_NOTES_LEN: usize = 4_096;
pub const MAX_MESSAGE_LEN: usize = 8_192;

/// A service may not outlast a day.
pub const MAX_SERVICE_DURATION_MINUTES: u32 = 24 * 60;

/// 1970-01-01 .. 2100-01-01
pub const MIN_VALID_TIMESTAMP_MS: Ms = 0;
pub const MAX_VALID_TIMESTAMP_MS: Ms = 4_102_444_800_000;

/// 1,000,000.00 in the shop's currency.
pub const MAX_PRICE_CENTS: i64 = 100_000_000;
pub const MAX_LOYALTY_POINTS: i64 = 1_000_000_000;

/// Newest audit records kept in memory and in a compacted WAL.
pub const MAX_AUDIT_RECORDS: usize = 5_000;
