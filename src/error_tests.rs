use super::*;

#[test]
fn driver_error_kind_as_str_is_stable() {
    assert_eq!(DriverErrorKind::WrongState.as_str(), "WRONG_STATE");
    assert_eq!(DriverErrorKind::WaitTimeout.as_str(), "WAIT_TIMEOUT");
}

#[test]
fn driver_error_display_includes_kind_and_message() {
    let err = DriverError::new(DriverErrorKind::Exited, "session exited");
    assert_eq!(err.to_string(), "EXITED: session exited");
}

#[test]
fn manager_error_driver_variant_does_not_translate_kind() {
    let inner = DriverError::new(DriverErrorKind::NoPendingConfirm, "nothing pending");
    let wrapped = ManagerError::Driver { id: "session-abc".to_owned(), source: inner };
    assert_eq!(wrapped.kind_str(), "NO_PENDING_CONFIRM");
    assert!(wrapped.to_string().contains("session-abc"));
}

#[test]
fn manager_error_quota_message() {
    let err = ManagerError::MaxSessionsReached { max: 10 };
    assert_eq!(err.kind_str(), "MAX_SESSIONS_REACHED");
    assert!(err.to_string().contains("10"));
}
