/// Database layer
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool with a startup health check
/// - `migrations`: embedded schema migrations
///
/// Queries on user records live in `models::user`; the trait used by the
/// web handlers lives in `store`.

pub mod migrations;
pub mod pool;
