//! MongoDB client backend for the docstamp facade.
//!
//! Every operation is a direct pass-through to the `mongodb` driver:
//! filters, update expressions, and options are forwarded verbatim, and
//! driver results are mapped into the neutral result types of
//! `docstamp-core`. Connection pooling, request scheduling, and retries
//! all belong to the driver.

mod database;
mod store;

pub use database::DatabaseRef;
pub use store::{MongoClientBackend, MongoClientBuilder};
