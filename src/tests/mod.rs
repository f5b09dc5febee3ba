pub mod store_tests;
pub mod recovery_tests;
pub mod tags_tests;
