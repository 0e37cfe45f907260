use employee_api::setup_logging;

#[test]
fn test_logging_setup() {
    // setup_logging installs a global subscriber, so it is called only once here.
    let result = std::panic::catch_unwind(|| {
        setup_logging();
    });

    assert!(result.is_ok(), "setup_logging function should not panic");
}
