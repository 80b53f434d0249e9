//! Auth-domain identifiers, account references, scope sets, and claims.

pub mod account;
pub mod claims;
pub mod id;
pub mod scope;

pub use account::*;
pub use claims::*;
pub use id::*;
pub use scope::*;
