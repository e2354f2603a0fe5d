use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        SubburnError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        SubburnError::evaluation("x")
            .to_string()
            .contains("evaluation error:")
    );
    assert!(
        SubburnError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
    assert!(
        SubburnError::resource(ResourceKind::AccessDenied, "x")
            .to_string()
            .contains("resource error")
    );
}

#[test]
fn categories_separate_source_from_generic_failures() {
    assert_eq!(
        SubburnError::resource(ResourceKind::AccessDenied, "403").category(),
        ErrorCategory::SourceUnavailable
    );
    assert_eq!(
        SubburnError::resource(ResourceKind::SourceUnavailable, "dns").category(),
        ErrorCategory::SourceUnavailable
    );
    assert_eq!(
        SubburnError::resource(ResourceKind::TempIo, "disk").category(),
        ErrorCategory::ExportFailedRetryable
    );
    assert_eq!(
        SubburnError::validation("bad").category(),
        ErrorCategory::UnsupportedInput
    );
}

#[test]
fn user_messages_never_carry_internal_detail() {
    let err = SubburnError::evaluation("ffmpeg exited with status 1: secret path /tmp/x");
    let msg = err.category().user_message();
    assert!(!msg.contains("ffmpeg"));
    assert!(!msg.contains("/tmp"));
}

#[test]
fn io_errors_map_to_temp_io() {
    let err: SubburnError = std::io::Error::other("boom").into();
    assert!(matches!(
        err,
        SubburnError::Resource {
            kind: ResourceKind::TempIo,
            ..
        }
    ));
}
