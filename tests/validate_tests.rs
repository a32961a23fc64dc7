//! Input validation tests

use twiq::validate;
use twiq::validate::FeedFlag;
use twiq::TwiqError;

#[test]
fn test_valid_phones() {
    for phone in ["9000000000", "8000000000", "7000000000"] {
        assert!(validate::is_valid_phone(phone), "{phone} should be valid");
        assert_eq!(validate::phone(phone).unwrap(), phone);
    }
}

#[test]
fn test_invalid_phones() {
    for phone in [
        "",
        "0",
        "1000000000",
        "6000000000",
        "90000000000",
        "900000000",
    ] {
        assert!(!validate::is_valid_phone(phone), "{phone:?} should be invalid");
        let err = validate::phone(phone).unwrap_err();
        assert!(matches!(err, TwiqError::Validation(_)));
        assert_eq!(err.to_string(), "Invalid phone number.");
    }
}

#[test]
fn test_valid_emails() {
    for email in [
        "test@example.com",
        "test.test@e.com",
        "TEST@e.au",
        "1234@e.in",
    ] {
        assert!(validate::is_valid_email(email), "{email} should be valid");
    }
    assert_eq!(validate::email("TEST@e.au").unwrap(), "test@e.au");
}

#[test]
fn test_invalid_emails() {
    for email in [
        "test",
        "@example.com",
        "",
        "test@example",
        "test.com",
        "test@e@e.com",
        "test.com@e",
        "test@e.123",
    ] {
        assert!(!validate::is_valid_email(email), "{email:?} should be invalid");
        assert!(validate::email(email).is_err());
    }
}

#[test]
fn test_invalid_feed_params() {
    let cases = [
        ("abc", "1", "1"),
        ("", "1", "1"),
        ("1", "abc", "1"),
        ("1", "", "1"),
        ("1", "1", "abc"),
        ("1", "1", ""),
        ("1", "1", "0"),
        ("1", "1", "4"),
    ];
    for (last_sync, mascot_id, flag) in cases {
        assert!(
            validate::feed(last_sync, mascot_id, flag).is_err(),
            "({last_sync:?}, {mascot_id:?}, {flag:?}) should be rejected"
        );
    }
}

#[test]
fn test_valid_feed_params() {
    let query = validate::feed("1", "1", "1").unwrap();
    assert_eq!(query.flag, FeedFlag::Top);

    let query = validate::feed("-1", "1", "2").unwrap();
    assert_eq!(query.last_sync, -1);
    assert_eq!(query.flag, FeedFlag::Before);

    let query = validate::feed("1000000000000000", "1", "3").unwrap();
    assert_eq!(query.last_sync, 1_000_000_000_000_000);
    assert_eq!(query.mascot_id, 1);
    assert_eq!(query.flag, FeedFlag::After);
}

#[test]
fn test_feed_error_names_the_field() {
    let err = validate::feed("1", "x", "1").unwrap_err();
    assert_eq!(err.to_string(), "mascotId is not a valid Integer");

    let err = validate::feed("1", "1", "9").unwrap_err();
    assert_eq!(err.to_string(), "Invalid value for flag");
}

#[test]
fn test_login_requires_long_password() {
    assert!(validate::login("9000000000", "short").is_err());
    let (phone, password) = validate::login("9000000000", "longenough").unwrap();
    assert_eq!(phone, "9000000000");
    assert_eq!(password, "longenough");
}
