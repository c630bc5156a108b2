use httpmsg::base::HttpError;
use httpmsg::body::BodyStream;
use httpmsg::cookies::Cookie;
use httpmsg::message::{Request, Response};
use url::Url;

#[test]
fn test_request_assembly() {
    let request = Request::new("POST", "https://api.example.com/v1/items?page=2")
        .unwrap()
        .with_protocol_version("1.0")
        .with_header("Content-Type", "application/json")
        .with_body(BodyStream::from_string(r#"{"name":"widget"}"#));

    assert_eq!(request.method(), "POST");
    assert_eq!(request.protocol_version(), "1.0");
    assert_eq!(request.request_target(), "/v1/items");
    assert_eq!(request.uri().query(), Some("page=2"));
    assert_eq!(
        request.headers().header("content-type"),
        Some("application/json")
    );
}

#[test]
fn test_request_with_uri_swaps_target() {
    let request = Request::new("GET", "http://example.com/a").unwrap();
    let moved = request.with_uri(Url::parse("http://other.test/b").unwrap());

    assert_eq!(request.uri().host_str(), Some("example.com"));
    assert_eq!(moved.uri().host_str(), Some("other.test"));
    assert_eq!(moved.request_target(), "/b");
}

#[test]
fn test_response_status_validation() {
    assert!(Response::new(100).is_ok());
    assert!(Response::new(599).is_ok());
    assert!(matches!(
        Response::new(999).unwrap_err(),
        HttpError::InvalidStatusCode(999)
    ));
    assert!(matches!(
        Response::new(600).unwrap_err(),
        HttpError::InvalidStatusCode(600)
    ));
}

#[test]
fn test_response_reason_defaults() {
    assert_eq!(Response::new(404).unwrap().reason_phrase(), "Not Found");
    assert_eq!(Response::new(418).unwrap().reason_phrase(), "I'm a teapot");
    assert_eq!(
        Response::new(200)
            .unwrap()
            .with_status(503, Some("Down For Lunch"))
            .unwrap()
            .reason_phrase(),
        "Down For Lunch"
    );
}

#[test]
fn test_response_set_cookie_header() {
    let session = Cookie::new("session", "abc")
        .unwrap()
        .with_path("/")
        .with_http_only(true);

    let response = Response::new(200).unwrap().with_set_cookie(&session);
    assert_eq!(
        response.headers().header("set-cookie"),
        Some("session=abc; Path=/; HttpOnly")
    );
}

#[test]
fn test_every_with_returns_an_independent_value() {
    let request = Request::new("GET", "http://example.com/").unwrap();

    // Each derived instance differs in exactly the changed field.
    let with_method = request.with_method("HEAD");
    assert_eq!(request.method(), "GET");
    assert_eq!(with_method.request_target(), request.request_target());

    let with_version = request.with_protocol_version("2.0");
    assert_eq!(request.protocol_version(), "1.1");
    assert_eq!(with_version.method(), request.method());

    let with_header = request.with_header("X-A", "1");
    assert!(!request.headers().has_header("x-a"));
    assert_eq!(with_header.method(), request.method());
}

#[test]
fn test_cloned_bodies_do_not_alias() {
    let request = Request::new("POST", "http://example.com/")
        .unwrap()
        .with_body(BodyStream::from_string("original"));

    let mut fork = request.with_header("X-Fork", "1");
    fork.body_mut().write(b"FORKFORK").unwrap();

    let mut request = request;
    assert_eq!(request.body_mut().contents().unwrap(), "original");
}
