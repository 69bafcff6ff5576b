pub mod accounts;
pub mod comments;
pub mod withdrawal_records;
