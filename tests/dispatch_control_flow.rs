use bluejacket_rs::{
    ConfigurationError, Context, DispatchError, Dispatcher, Flow, HALT_SENTINEL, Handler,
    PatternError, Rejection,
};
use serde_json::json;
use std::fmt;
use std::time::Duration;

fn push(label: &'static str) -> Handler {
    Handler::sync(move |ctx| {
        ctx.append("log", label);
        Ok(Flow::Next)
    })
}

#[derive(Debug)]
struct Unauthorized;

impl fmt::Display for Unauthorized {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unauthorized")
    }
}

impl std::error::Error for Unauthorized {}

#[tokio::test]
async fn dispatcher_when_handler_rejects_with_sentinel_then_resolves_early() {
    let dispatcher = Dispatcher::new(None);
    dispatcher
        .handle(
            "/test",
            [
                push("handler 1"),
                Handler::sync(|_| Err(Rejection::from(HALT_SENTINEL))),
                push("handler 2"),
            ],
        )
        .unwrap();
    dispatcher.handle_any([push("later rule")]).unwrap();

    let ctx = dispatcher
        .resolve("/test")
        .await
        .expect("sentinel should not fail resolution");

    assert_eq!(ctx.get("log"), Some(json!(["handler 1"])));
}

#[tokio::test]
async fn dispatcher_when_handler_returns_halt_then_skips_remaining_rules() {
    let dispatcher = Dispatcher::new(None);
    dispatcher
        .handle("/test", [push("first"), Handler::sync(|_| Ok(Flow::Halt))])
        .unwrap();
    dispatcher.handle("/test", [push("second")]).unwrap();

    let ctx = dispatcher.resolve("/test").await.unwrap();

    assert_eq!(ctx.get("log"), Some(json!(["first"])));
}

#[tokio::test]
async fn dispatcher_when_async_handler_halts_then_resolves_early() {
    let dispatcher = Dispatcher::new(None);
    dispatcher
        .handle(
            "/test",
            [
                Handler::action(|_ctx: Context| async {
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    Err(Rejection::from("route"))
                }),
                push("unreached"),
            ],
        )
        .unwrap();

    let ctx = dispatcher.resolve("/test").await.unwrap();

    assert!(!ctx.contains("log"));
}

#[tokio::test]
async fn dispatcher_when_handler_rejects_then_error_is_passed_through_unchanged() {
    let dispatcher = Dispatcher::new(None);
    dispatcher
        .handle(
            "/test",
            [
                Handler::sync(|_| Err(Rejection::value(json!(["x", "y"])))),
                push("unreached"),
            ],
        )
        .unwrap();
    dispatcher.handle_any([push("unreached rule")]).unwrap();

    let err = dispatcher
        .resolve("/test")
        .await
        .expect_err("rejection should fail resolution");

    match err {
        DispatchError::Rejected(rejection) => {
            assert_eq!(rejection.as_value(), Some(&json!(["x", "y"])));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn dispatcher_when_async_handler_fails_with_error_then_error_is_preserved() {
    let dispatcher = Dispatcher::new(None);
    dispatcher
        .handle(
            "/secure",
            [Handler::action(|_ctx: Context| async {
                tokio::task::yield_now().await;
                Err(Rejection::error(Unauthorized))
            })],
        )
        .unwrap();

    let err = dispatcher.resolve("/secure").await.unwrap_err();

    let rejection = err.into_rejection().expect("should carry a rejection");
    match rejection {
        Rejection::Error(source) => {
            assert!(source.downcast_ref::<Unauthorized>().is_some());
            assert_eq!(source.to_string(), "unauthorized");
        }
        other => panic!("unexpected rejection: {other:?}"),
    }
}

#[tokio::test]
async fn dispatcher_when_sentinel_is_not_a_plain_string_then_it_fails() {
    let dispatcher = Dispatcher::new(None);
    dispatcher
        .handle(
            "/test",
            [Handler::sync(|_| Err(Rejection::value(json!(["route"]))))],
        )
        .unwrap();

    let err = dispatcher.resolve("/test").await.unwrap_err();

    assert_eq!(
        err.rejection().and_then(Rejection::as_value),
        Some(&json!(["route"]))
    );
}

#[tokio::test]
async fn dispatcher_when_path_is_not_a_string_then_reports_type_contract() {
    let dispatcher = Dispatcher::new(None);
    dispatcher.handle_any([push("never")]).unwrap();

    let err = dispatcher
        .resolve_value(&json!(42), json!({}))
        .await
        .unwrap_err();

    match &err {
        DispatchError::TypeContract { found } => assert_eq!(*found, "number"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.rejection().is_none());
    assert_eq!(
        err.to_string(),
        "path to be resolved must be a string (got number)"
    );
}

#[tokio::test]
async fn dispatcher_when_path_value_is_a_string_then_resolves_normally() {
    let dispatcher = Dispatcher::new(None);
    dispatcher.handle("/test", [push("ran")]).unwrap();

    let ctx = dispatcher
        .resolve_value(&json!("/test"), json!({ "k": 1 }))
        .await
        .unwrap();

    assert_eq!(ctx.get("log"), Some(json!(["ran"])));
    assert_eq!(ctx.data(), &json!({ "k": 1 }));
}

#[test]
fn dispatcher_when_pattern_is_malformed_then_registration_fails() {
    let dispatcher = Dispatcher::new(None);

    let err = dispatcher
        .handle("/users/:", [push("never")])
        .expect_err("missing name should be rejected");
    assert!(matches!(
        err,
        ConfigurationError::Pattern(PatternError::MissingParameterName { .. })
    ));

    let err = dispatcher
        .handle("/broken/(abc", [push("never")])
        .expect_err("unbalanced group should be rejected");
    assert!(matches!(
        err,
        ConfigurationError::Pattern(PatternError::UnbalancedGroup { .. })
    ));

    assert_eq!(dispatcher.rule_count(), 0);
}
