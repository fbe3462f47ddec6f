pub mod completion;
pub mod key_value_store;
pub mod remote_store;
