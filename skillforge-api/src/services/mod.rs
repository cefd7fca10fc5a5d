//! Service Layer
//!
//! Business logic behind the REST handlers. Services own the ownership
//! checks, progression rules and store writes, and return `ForgeResult`
//! so handlers only translate outcomes into responses.

mod lifecycle;

pub use lifecycle::*;
