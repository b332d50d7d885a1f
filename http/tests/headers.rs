use lantern_http::{
    Csv, Error, HeaderName, Headers, KnownHeaderName, MediaType, OrderedCsv, Parameterised,
};
use pretty_assertions::assert_eq;

#[test]
fn lookups_are_case_insensitive() {
    let mut headers = Headers::new();
    headers.insert("Content-Type", "text/plain").unwrap();
    headers.append("X-Custom", "1").unwrap();

    assert_eq!(
        headers.get_values("content-type"),
        headers.get_values("Content-Type")
    );
    assert_eq!(headers.get_str("CONTENT-TYPE"), Some("text/plain"));
    assert_eq!(headers.get_str("x-cUsToM"), Some("1"));
    assert!(headers.has_header(KnownHeaderName::ContentType));
    assert!(headers.has_header_value("content-type", "text/plain"));
    assert!(!headers.has_header_value("content-type", "text/html"));
}

#[test]
fn duplicate_names_preserve_value_order() {
    let mut headers = Headers::new();
    headers.append(KnownHeaderName::Vary, "accept").unwrap();
    headers.append("via", "proxy-a").unwrap();
    headers.append(KnownHeaderName::Vary, "cookie").unwrap();

    assert_eq!(&**headers.get_values("vary").unwrap(), ["accept", "cookie"]);
    let order: Vec<_> = headers.iter().map(|(name, _)| name.as_ref()).collect();
    assert_eq!(order, ["Vary", "Via"]);
}

#[test]
fn display_and_parse_agree() {
    let mut headers = Headers::new();
    headers.insert(KnownHeaderName::Host, "example.com").unwrap();
    headers.insert("X-Whatever", "else").unwrap();
    headers.append(KnownHeaderName::Vary, ["a", "b"].to_vec()).unwrap();

    let formatted = headers.to_string();
    assert_eq!(
        formatted,
        "Host: example.com\r\nX-Whatever: else\r\nVary: a\r\nVary: b\r\n"
    );
}

#[test]
fn known_and_unknown_names_compare() {
    let known: HeaderName = "content-length".into();
    assert_eq!(known, KnownHeaderName::ContentLength);
    assert_eq!(known.as_ref(), "Content-Length");

    let unknown: HeaderName = "x-not-in-the-table".into();
    assert!(unknown.is_valid());
}

#[test]
fn weighted_lists_order_and_filter() {
    let list = OrderedCsv::parse("gzip;q=0.5, identity;q=0, *", true).unwrap();
    let values: Vec<_> = list.iter().map(|item| item.value()).collect();
    assert_eq!(values, ["*", "gzip"]);
    assert_eq!(list[0].weight(), 1.0);
    assert_eq!(list[1].weight(), 0.5);
}

#[test]
fn weighted_lists_reject_non_decimal_weights() {
    assert!(matches!(
        OrderedCsv::parse("br;q=high", false),
        Err(Error::MalformedWeight(_))
    ));
}

#[test]
fn csv_respects_quoting() {
    let items = Csv::parse(r#"one, "two, with comma" , three"#);
    assert_eq!(*items, ["one", "\"two, with comma\"", "three"]);
}

#[test]
fn parameterised_views() {
    let disposition = Parameterised::parse(r#"form-data; name="upload"; filename="a b.txt""#, true)
        .unwrap();
    assert_eq!(disposition.value(), "form-data");
    assert_eq!(disposition.param("name"), Some("upload"));
    assert_eq!(disposition.param("filename"), Some("a b.txt"));
}

#[test]
fn media_type_equivalence() {
    let json = MediaType::parse("application/json; charset=utf-8").unwrap();
    assert!(json.is_equivalent(&MediaType::parse("Application/JSON").unwrap()));
    assert!(json.is_equivalent(&MediaType::parse("application/*").unwrap()));
    assert!(json.is_equivalent(&MediaType::parse("*/*").unwrap()));
    assert!(!json.is_equivalent(&MediaType::parse("text/json").unwrap()));
}

#[test]
fn sealed_headers_are_immutable_but_readable() {
    let mut headers = Headers::new();
    headers.insert("X-A", "1").unwrap();
    headers.seal();

    assert!(matches!(headers.insert("X-B", "2"), Err(Error::ReadOnly)));
    assert!(matches!(headers.remove("X-A"), Err(Error::ReadOnly)));
    assert_eq!(headers.get_str("x-a"), Some("1"));
    assert_eq!(headers.len(), 1);
}
