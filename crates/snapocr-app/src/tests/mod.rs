mod mock;
mod request_tests;
