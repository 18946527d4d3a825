pub mod dispatcher;
pub mod notifier;
pub mod worker;
