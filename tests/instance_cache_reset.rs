use bluejacket_rs::{Dispatcher, DispatcherOptions};
use std::sync::Arc;

#[test]
fn dispatcher_when_instances_cleared_then_cache_is_empty() {
    let options = |key: &str| {
        DispatcherOptions::builder()
            .instance_key(key)
            .build()
            .unwrap()
    };
    let alpha = Dispatcher::new(Some(options("reset-alpha")));
    let _beta = Dispatcher::new(Some(options("reset-beta")));
    assert_eq!(Dispatcher::instance_count(), 2);

    Dispatcher::clear_instances();

    assert_eq!(Dispatcher::instance_count(), 0);
    assert!(Dispatcher::instance("reset-alpha").is_none());
    let fresh = Dispatcher::new(Some(options("reset-alpha")));
    assert!(!Arc::ptr_eq(&alpha, &fresh));
    assert_eq!(Dispatcher::instance_count(), 1);
}
