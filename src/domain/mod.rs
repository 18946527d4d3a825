pub mod broadcast;
pub mod error;
pub mod event;
pub mod id;
pub mod ledger;
pub mod money;
pub mod reference;
