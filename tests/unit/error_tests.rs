//! Unit tests for `AppError` display formats and conversions.

use std::time::Duration;

use jules_relay::AppError;

#[test]
fn remote_error_display_includes_status_and_body() {
    let err = AppError::Remote {
        status: 404,
        body: r#"{"error":"no such session"}"#.into(),
    };
    assert_eq!(
        err.to_string(),
        r#"remote: HTTP 404: {"error":"no such session"}"#
    );
}

#[test]
fn status_is_only_reported_for_remote_errors() {
    let remote = AppError::Remote {
        status: 503,
        body: String::new(),
    };
    assert_eq!(remote.status(), Some(503));
    assert_eq!(AppError::Transport("connection reset".into()).status(), None);
    assert_eq!(AppError::NotFound("x".into()).status(), None);
}

#[test]
fn monitor_timeout_names_session_and_elapsed_seconds() {
    let err = AppError::MonitorTimeout {
        session_id: "abc".into(),
        elapsed: Duration::from_secs(90),
    };
    assert_eq!(
        err.to_string(),
        "monitor timeout: session abc not complete after 90s"
    );
}

#[test]
fn cancelled_is_distinct_from_timeout() {
    let cancelled = AppError::Cancelled {
        session_id: "abc".into(),
    };
    let timeout = AppError::MonitorTimeout {
        session_id: "abc".into(),
        elapsed: Duration::ZERO,
    };
    assert!(cancelled.to_string().starts_with("cancelled:"));
    assert!(timeout.to_string().starts_with("monitor timeout:"));
}

#[test]
fn error_messages_carry_category_prefix() {
    let cases = [
        (AppError::Config("bad".into()), "config: bad"),
        (AppError::Transport("dns".into()), "transport: dns"),
        (AppError::Decode("eof".into()), "decode: eof"),
        (AppError::NotFound("source for a/b".into()), "not found: source for a/b"),
        (AppError::Io("denied".into()), "io: denied"),
    ];
    for (err, expected) in cases {
        assert_eq!(err.to_string(), expected);
    }
}

#[test]
fn json_errors_convert_to_decode() {
    let err: AppError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
    assert!(matches!(err, AppError::Decode(_)), "got {err:?}");
}

#[test]
fn toml_errors_convert_to_config() {
    let err: AppError = toml::from_str::<toml::Value>("= nope").unwrap_err().into();
    assert!(err.to_string().starts_with("config: invalid config:"), "{err}");
}

#[test]
fn io_errors_convert_to_io() {
    let err: AppError = std::io::Error::new(std::io::ErrorKind::NotFound, "missing").into();
    assert_eq!(err.to_string(), "io: missing");
}
