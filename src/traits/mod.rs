pub mod worker;

pub use worker::{Done, FnWorker, Worker};
