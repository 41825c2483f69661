mod middleware_test;
mod requests_test;
mod schedule_test;
