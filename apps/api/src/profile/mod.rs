// Profile API: read and upsert the persona a user writes posts as.
// Persistence goes through the `Store` trait; nothing is cached here.

pub mod handlers;
