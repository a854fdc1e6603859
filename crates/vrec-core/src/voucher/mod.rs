//! Voucher field extraction module.

mod extractor;
pub mod rules;

pub use extractor::{VoucherExtractor, VoucherFields};
