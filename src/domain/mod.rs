mod account;
mod identity;
mod money;
mod transaction;

pub use account::*;
pub use identity::*;
pub use money::*;
pub use transaction::*;
