pub const DEFAULT_CURRENCY: &str = "INR";
pub const DEFAULT_PAYMENT_MODE: &str = "Online Transfer";

/// Manual payslip edits must say why.
pub const MIN_EDIT_REASON_LEN: usize = 10;

pub const DEFAULT_PAGE_SIZE: u64 = 50;
pub const MAX_PAGE_SIZE: u64 = 200;

pub const TOKEN_LIFETIME_WEEKS: i64 = 1;
