mod rotation_tests;
mod service_tests;
