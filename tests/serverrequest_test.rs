use std::net::{IpAddr, Ipv4Addr};

use httpmsg::body::{BodyStream, ParsedBody};
use httpmsg::files::{FileMeta, UploadEntry};
use httpmsg::message::{Environment, ServerRequest};

/// A typical reverse-proxied form submission.
fn form_post_environment() -> Environment {
    let mut env = Environment::new();
    env.server.set("SERVER_PROTOCOL", "HTTP/1.1".to_string());
    env.server.set("REQUEST_METHOD", "POST".to_string());
    env.server.set("HTTP_HOST", "shop.example.com".to_string());
    env.server.set("SERVER_PORT", "443".to_string());
    env.server.set("HTTPS", "on".to_string());
    env.server.set("REQUEST_URI", "/cart/add?ref=mail".to_string());
    env.server.set("REMOTE_ADDR", "203.0.114.7".to_string());
    env.server.set(
        "CONTENT_TYPE",
        "application/x-www-form-urlencoded".to_string(),
    );
    env.server
        .set("HTTP_ACCEPT", "text/html;q=0.9, application/json".to_string());
    env.server.set("HTTP_COOKIE", "cart=c77; locale=en_GB".to_string());
    env.body = BodyStream::from_string("sku=W-100&qty=2");
    env
}

#[test]
fn test_full_ingestion() {
    let request = ServerRequest::from_environment(form_post_environment()).unwrap();

    assert_eq!(request.method(), "POST");
    assert_eq!(request.protocol_version(), "1.1");
    assert_eq!(
        request.uri().as_str(),
        "https://shop.example.com/cart/add?ref=mail"
    );
    assert_eq!(request.request_target(), "/cart/add");
    assert_eq!(request.server_param("REMOTE_ADDR"), Some("203.0.114.7"));

    // HTTP_* variables surfaced as canonicalized headers.
    assert_eq!(
        request.headers().header_ordered_values("accept"),
        Some(vec!["application/json".to_string(), "text/html".to_string()])
    );

    // Cookie line split into the jar.
    assert_eq!(request.cookie("cart").unwrap().value(), "c77");
    assert_eq!(request.cookie("locale").unwrap().value(), "en_GB");
}

#[test]
fn test_form_body_decodes() {
    let mut request = ServerRequest::from_environment(form_post_environment()).unwrap();

    let ParsedBody::Form(pairs) = request.parsed_body().unwrap() else {
        panic!("expected form body");
    };
    assert_eq!(
        pairs,
        vec![
            ("sku".to_string(), "W-100".to_string()),
            ("qty".to_string(), "2".to_string()),
        ]
    );
}

#[test]
fn test_json_body_with_latin1_charset() {
    let mut env = form_post_environment();
    env.server.set(
        "CONTENT_TYPE",
        "application/json; charset=ISO-8859-1".to_string(),
    );
    // {"city": "Orléans"} with é as the single byte 0xE9.
    env.body = BodyStream::from_bytes(b"{\"city\": \"Orl\xe9ans\"}".to_vec());

    let mut request = ServerRequest::from_environment(env).unwrap();
    assert_eq!(request.body_charset(), "ISO-8859-1");

    let ParsedBody::Json(value) = request.parsed_body().unwrap() else {
        panic!("expected JSON body");
    };
    assert_eq!(value["city"], serde_json::json!("Orléans"));
}

#[test]
fn test_xml_body_dispatch() {
    let mut env = form_post_environment();
    env.server.set("CONTENT_TYPE", "application/xml".to_string());
    env.body = BodyStream::from_string("<cart><sku>W-100</sku></cart>");

    let mut request = ServerRequest::from_environment(env).unwrap();
    let ParsedBody::Xml(root) = request.parsed_body().unwrap() else {
        panic!("expected XML body");
    };
    assert_eq!(root.child("sku").unwrap().text, "W-100");
}

#[test]
fn test_unknown_body_type_stays_opaque() {
    let mut env = form_post_environment();
    env.server.set("CONTENT_TYPE", "text/markdown".to_string());
    env.body = BodyStream::from_string("# heading");

    let mut request = ServerRequest::from_environment(env).unwrap();
    assert_eq!(
        request.parsed_body().unwrap(),
        ParsedBody::Opaque("# heading".to_string())
    );
}

#[test]
fn test_uploads_reach_the_collection() {
    let mut env = form_post_environment();
    env.uploads.push((
        "invoice".to_string(),
        UploadEntry::Single(FileMeta {
            temp_path: "/tmp/up-1".to_string(),
            name: "invoice.pdf".to_string(),
            media_type: Some("application/pdf".to_string()),
            size: Some(44_000),
            error: 0,
        }),
    ));

    let request = ServerRequest::from_environment(env).unwrap();
    let files = request.files("invoice").unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].client_name(), "invoice.pdf");
}

#[test]
fn test_client_ip_priority_order() {
    let mut env = form_post_environment();
    // CLIENT_IP outranks X-Forwarded-For even when both are public.
    env.server
        .set("HTTP_CLIENT_IP", "93.184.216.34".to_string());
    env.server
        .set("HTTP_X_FORWARDED_FOR", "198.51.100.1".to_string());

    let request = ServerRequest::from_environment(env).unwrap();
    assert_eq!(
        request.client_ip(),
        Some(IpAddr::V4(Ipv4Addr::new(93, 184, 216, 34)))
    );
}

#[test]
fn test_client_ip_skips_reserved_tokens_within_a_chain() {
    let mut env = form_post_environment();
    env.server.set(
        "HTTP_X_FORWARDED_FOR",
        "10.1.2.3, 172.16.0.1, 89.160.20.112".to_string(),
    );

    let request = ServerRequest::from_environment(env).unwrap();
    assert_eq!(
        request.client_ip(),
        Some(IpAddr::V4(Ipv4Addr::new(89, 160, 20, 112)))
    );
}

#[test]
fn test_attributes_travel_with_copies() {
    let request = ServerRequest::from_environment(form_post_environment()).unwrap();

    let routed = request
        .with_attribute("route", "cart.add")
        .with_attribute("authenticated", true);

    assert!(request.attributes().is_empty());
    assert_eq!(
        routed.attribute("route"),
        Some(&serde_json::json!("cart.add"))
    );
    assert_eq!(
        routed.attribute("authenticated"),
        Some(&serde_json::json!(true))
    );

    let cleared = routed.without_attribute("authenticated");
    assert!(routed.has_attribute("authenticated"));
    assert!(!cleared.has_attribute("authenticated"));
}
