//! Tests for the HTTP parser.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use serde::Deserialize;

    use crate::parser::{read_request, Error, HeaderIter, Method, Protocol, RequestScratch};

    async fn parse_err(input: &'static [u8]) -> Error {
        let mut input = input;
        let mut scratch = RequestScratch::default();
        let err = read_request(&mut input, &mut scratch).await.unwrap_err();
        err
    }

    #[tokio::test]
    async fn test_parse_simple_get_request() {
        let mut input: &'static [u8] = b"GET /index.html HTTP/1.1\r\nHost: example.com\r\n\r\n";
        let mut scratch = RequestScratch::default();
        let request = read_request(&mut input, &mut scratch).await.unwrap();
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.path(), "/index.html");
        assert_eq!(request.protocol, Protocol::Http11);
        assert_eq!(request.host, Some("example.com"));
        assert_eq!(request.content_length, 0);
        assert!(!request.should_close);
    }

    #[tokio::test]
    async fn test_parse_request_with_body() {
        let mut input: &'static [u8] =
            b"GET /test?test HTTP/1.1\r\nHost: localhost:8080\r\nContent-Length: 9\r\n\r\nsome body";
        let mut scratch = RequestScratch::default();
        let mut request = read_request(&mut input, &mut scratch).await.unwrap();
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.protocol, Protocol::Http11);
        assert_eq!(request.url.path, "/test");
        assert_eq!(request.url.raw_query.as_deref(), Some("test"));
        assert_eq!(request.host, Some("localhost:8080"));
        assert_eq!(request.content_length, 9);

        let body = request.read_body().await.unwrap();
        assert_eq!(&body[..], b"some body");
        assert_eq!(body.as_str().unwrap(), "some body");
    }

    #[tokio::test]
    async fn test_parse_request_with_multiple_headers() {
        let mut input: &'static [u8] =
            b"GET /index.html HTTP/1.1\r\nHost: example.com\r\nUser-Agent: test\r\nAccept: */*\r\n\r\n";
        let mut scratch = RequestScratch::default();
        let request = read_request(&mut input, &mut scratch).await.unwrap();
        assert_eq!(request.header("Host"), Some("example.com"));
        assert_eq!(request.header("User-Agent"), Some("test"));
        assert_eq!(request.header("Accept"), Some("*/*"));
        assert_eq!(request.header("Missing"), None);
        assert_eq!(
            request.raw_header_data(),
            b"Host: example.com\r\nUser-Agent: test\r\nAccept: */*\r\n"
        );
    }

    #[tokio::test]
    async fn test_case_insensitive_headers() {
        let mut input: &'static [u8] =
            b"GET / HTTP/1.1\r\nhOsT: example.com\r\ncontent-LENGTH: 0\r\n\r\n";
        let mut scratch = RequestScratch::default();
        let request = read_request(&mut input, &mut scratch).await.unwrap();
        assert_eq!(request.host, Some("example.com"));
        assert!(request.has_header("host"));
        assert!(request.has_header("HOST"));
        assert!(request.has_header("Content-Length"));
    }

    #[tokio::test]
    async fn test_first_occurrence_wins() {
        let mut input: &'static [u8] = b"GET / HTTP/1.1\r\nHost: first\r\nContent-Length: 3\r\nhost: second\r\ncontent-length: 10\r\n\r\nabc";
        let mut scratch = RequestScratch::default();
        let request = read_request(&mut input, &mut scratch).await.unwrap();
        assert_eq!(request.host, Some("first"));
        assert_eq!(request.content_length, 3);
        assert_eq!(request.header("HOST"), Some("first"));
        assert_eq!(request.header_map().get("Host").map(String::as_str), Some("first"));
    }

    #[tokio::test]
    async fn test_header_iteration_matches_map() {
        let mut input: &'static [u8] =
            b"GET / HTTP/1.1\r\nHost: example.com\r\nX-Test: value:with:colons\r\nAccept: a b c\r\n\r\n";
        let mut scratch = RequestScratch::default();
        let request = read_request(&mut input, &mut scratch).await.unwrap();

        let mut manual = HashMap::new();
        for header in HeaderIter::new(request.raw_header_data()) {
            manual.insert(header.key.to_string(), header.value.to_string());
        }

        assert_eq!(manual.len(), 3);
        assert_eq!(request.header_map(), manual);
        assert_eq!(manual.get("X-Test").unwrap(), "value:with:colons");
        assert_eq!(manual.get("Accept").unwrap(), "a b c");
    }

    #[tokio::test]
    async fn test_should_close() {
        let cases: Vec<(&'static [u8], bool)> = vec![
            (&b"GET / HTTP/1.0\r\n\r\n"[..], true),
            (&b"GET / HTTP/1.0\r\nConnection: keep-alive\r\n\r\n"[..], true),
            (&b"GET / HTTP/1.1\r\nHost: a\r\nConnection: close\r\n\r\n"[..], true),
            (&b"GET / HTTP/1.1\r\nHost: a\r\nCONNECTION: CLOSE\r\n\r\n"[..], true),
            (&b"GET / HTTP/1.1\r\nHost: a\r\nConnection: keep-alive\r\n\r\n"[..], false),
            (&b"GET / HTTP/1.1\r\nHost: a\r\n\r\n"[..], false),
        ];

        for (bytes, expected) in cases {
            let mut input = bytes;
            let mut scratch = RequestScratch::default();
            let request = read_request(&mut input, &mut scratch).await.unwrap();
            assert_eq!(request.should_close, expected, "{}", String::from_utf8_lossy(bytes));
        }
    }

    #[tokio::test]
    async fn test_all_methods() {
        let methods: Vec<(&'static [u8], Method)> = vec![
            (&b"GET / HTTP/1.1\r\n\r\n"[..], Method::GET),
            (&b"HEAD / HTTP/1.1\r\n\r\n"[..], Method::HEAD),
            (&b"POST / HTTP/1.1\r\n\r\n"[..], Method::POST),
            (&b"PUT / HTTP/1.1\r\n\r\n"[..], Method::PUT),
            (&b"DELETE / HTTP/1.1\r\n\r\n"[..], Method::DELETE),
            (&b"CONNECT / HTTP/1.1\r\n\r\n"[..], Method::CONNECT),
            (&b"OPTIONS / HTTP/1.1\r\n\r\n"[..], Method::OPTIONS),
            (&b"TRACE / HTTP/1.1\r\n\r\n"[..], Method::TRACE),
            (&b"PATCH / HTTP/1.1\r\n\r\n"[..], Method::PATCH),
            (&b"INVALID / HTTP/1.1\r\n\r\n"[..], Method::UNKNOWN),
            (&b"get / HTTP/1.1\r\n\r\n"[..], Method::UNKNOWN),
        ];

        for (bytes, expected) in methods {
            let mut input = bytes;
            let mut scratch = RequestScratch::default();
            let request = read_request(&mut input, &mut scratch).await.unwrap();
            assert_eq!(request.method, expected);
        }
    }

    #[test]
    fn test_method_prefix_classification() {
        assert_eq!(Method::classify("GETX"), Method::GET);
        assert_eq!(Method::classify("POSTAL"), Method::POST);
        assert_eq!(Method::classify("HEADER"), Method::HEAD);
        assert_eq!(Method::classify("PUTS"), Method::PUT);
        assert_eq!(Method::classify("PA"), Method::PATCH);
        assert_eq!(Method::classify("D"), Method::DELETE);
        assert_eq!(Method::classify("PX"), Method::UNKNOWN);
        assert_eq!(Method::classify("P"), Method::UNKNOWN);
        assert_eq!(Method::classify(""), Method::UNKNOWN);
        assert_eq!(Method::classify("get"), Method::UNKNOWN);
    }

    #[tokio::test]
    async fn test_protocols() {
        let protocols: Vec<(&'static [u8], Protocol)> = vec![
            (&b"GET / HTTP/0.9\r\n\r\n"[..], Protocol::Http09),
            (&b"GET / HTTP/1.0\r\n\r\n"[..], Protocol::Http10),
            (&b"GET / HTTP/1.1\r\n\r\n"[..], Protocol::Http11),
            (&b"GET / HTTP/2.0\r\n\r\n"[..], Protocol::Http20),
            (&b"GET / HTTP/9.9\r\n\r\n"[..], Protocol::Http11),
            (&b"GET / banana\r\n\r\n"[..], Protocol::Http11),
        ];

        for (bytes, expected) in protocols {
            let mut input = bytes;
            let mut scratch = RequestScratch::default();
            let request = read_request(&mut input, &mut scratch).await.unwrap();
            assert_eq!(request.protocol, expected);
        }
    }

    #[tokio::test]
    async fn test_missing_status_line_tokens() {
        assert!(matches!(parse_err(b"\r\n").await, Error::InvalidMethod));
        assert!(matches!(parse_err(b"GET\r\n").await, Error::InvalidUrl));
        assert!(matches!(parse_err(b"GET /index.html\r\n").await, Error::InvalidProtocol));
    }

    #[tokio::test]
    async fn test_invalid_line_endings() {
        assert!(matches!(parse_err(b"GET / HTTP/1.1\n\r\n").await, Error::InvalidLineEnding));
        assert!(matches!(
            parse_err(b"GET / HTTP/1.1\r\nHost: example.com\n\r\n").await,
            Error::InvalidLineEnding
        ));
        assert!(matches!(
            parse_err(b"GET / HTTP/1.1\r\nHost: example.com\r\n\n").await,
            Error::InvalidLineEnding
        ));
    }

    #[tokio::test]
    async fn test_invalid_header_format() {
        assert!(matches!(
            parse_err(b"GET / HTTP/1.1\r\nInvalidHeader\r\n\r\n").await,
            Error::IncorrectHeader
        ));
        assert!(matches!(
            parse_err(b"GET / HTTP/1.1\r\nHost:example.com\r\n\r\n").await,
            Error::IncorrectHeader
        ));
        assert!(matches!(
            parse_err(b"GET / HTTP/1.1\r\nHost: \r\n\r\n").await,
            Error::IncorrectHeader
        ));
        assert!(matches!(
            parse_err(b"GET / HTTP/1.1\r\n: value\r\n\r\n").await,
            Error::MissingHeaders
        ));
    }

    #[tokio::test]
    async fn test_content_length_errors() {
        assert!(matches!(
            parse_err(b"POST / HTTP/1.1\r\nContent-Length: 99999999999999999999\r\n\r\n").await,
            Error::Overflow
        ));
        assert!(matches!(
            parse_err(b"POST / HTTP/1.1\r\nContent-Length: 12x\r\n\r\n").await,
            Error::InvalidCharacter
        ));
    }

    #[tokio::test]
    async fn test_invalid_utf8() {
        assert!(matches!(
            parse_err(b"GET / HTTP/1.1\r\nX-Bytes: \xff\xfe\r\n\r\n").await,
            Error::InvalidCharacter
        ));
    }

    #[tokio::test]
    async fn test_end_of_stream() {
        let err = parse_err(b"").await;
        assert!(matches!(err, Error::EndOfStream));
        assert!(err.is_disconnect());

        assert!(matches!(parse_err(b"GET / HTTP/1.1\r\nHost: exa").await, Error::EndOfStream));
        assert!(matches!(parse_err(b"GET / HTTP/1.1\r\nHost: example.com\r\n").await, Error::EndOfStream));
    }

    #[tokio::test]
    async fn test_headers_too_large() {
        let mut input: &'static [u8] =
            b"GET / HTTP/1.1\r\nHost: example.com\r\nUser-Agent: a-rather-long-user-agent\r\n\r\n";
        let mut scratch = RequestScratch::new(40, 64, 1024);
        let err = read_request(&mut input, &mut scratch).await.unwrap_err();
        assert!(matches!(err, Error::HeadersTooLarge));
        assert!(!err.is_disconnect());
    }

    #[tokio::test]
    async fn test_does_not_read_past_headers() {
        let mut input: &'static [u8] =
            b"POST /first HTTP/1.1\r\nContent-Length: 4\r\n\r\nbodyGET /second HTTP/1.1\r\n\r\n";
        let mut scratch = RequestScratch::default();

        let request = read_request(&mut input, &mut scratch).await.unwrap();
        assert_eq!(request.path(), "/first");
        drop(request);

        assert_eq!(input, b"bodyGET /second HTTP/1.1\r\n\r\n");
        assert_eq!(scratch.unread_body(), 4);
    }

    #[tokio::test]
    async fn test_empty_body_reads_nothing() {
        let mut input: &'static [u8] = b"GET / HTTP/1.1\r\nHost: a\r\n\r\nGET /next HTTP/1.1\r\n\r\n";
        let mut scratch = RequestScratch::default();

        let mut request = read_request(&mut input, &mut scratch).await.unwrap();
        let body = request.read_body().await.unwrap();
        assert!(body.is_empty());
        drop(body);
        drop(request);

        assert_eq!(input, b"GET /next HTTP/1.1\r\n\r\n");
    }

    #[tokio::test]
    async fn test_short_body_is_end_of_stream() {
        let mut input: &'static [u8] = b"POST / HTTP/1.1\r\nContent-Length: 10\r\n\r\nshort";
        let mut scratch = RequestScratch::default();
        let mut request = read_request(&mut input, &mut scratch).await.unwrap();
        assert!(matches!(request.read_body().await, Err(Error::EndOfStream)));
    }

    #[tokio::test]
    async fn test_large_body_uses_arena() {
        let mut raw = b"POST / HTTP/1.1\r\nContent-Length: 1000\r\n\r\n".to_vec();
        raw.extend(std::iter::repeat(b'x').take(1000));
        let raw: &'static [u8] = Box::leak(raw.into_boxed_slice());

        let mut input = raw;
        let mut scratch = RequestScratch::default();
        let mut request = read_request(&mut input, &mut scratch).await.unwrap();
        let body = request.read_body().await.unwrap();
        assert_eq!(body.len(), 1000);
        assert!(body.iter().all(|&b| b == b'x'));
        drop(body);
        drop(request);

        assert_eq!(scratch.arena_used(), 1000);
        scratch.reset();
        assert_eq!(scratch.arena_used(), 0);
    }

    #[tokio::test]
    async fn test_body_too_long() {
        let mut input: &'static [u8] = b"POST / HTTP/1.1\r\nContent-Length: 100\r\n\r\n";
        let mut scratch = RequestScratch::new(1024, 64, 50);
        let mut request = read_request(&mut input, &mut scratch).await.unwrap();
        assert!(matches!(request.read_body().await, Err(Error::StreamTooLong)));
    }

    #[tokio::test]
    async fn test_body_exceeds_arena_limit() {
        let mut input: &'static [u8] = b"POST / HTTP/1.1\r\nContent-Length: 600\r\n\r\n";
        let mut scratch = RequestScratch::new(1024, 64, 1024).with_arena_limit(512);
        let mut request = read_request(&mut input, &mut scratch).await.unwrap();
        assert!(matches!(request.read_body().await, Err(Error::OutOfMemory)));
        drop(request);
        assert_eq!(scratch.arena_used(), 0);
    }

    #[tokio::test]
    async fn test_read_body_into_fixed_buffer() {
        let mut input: &'static [u8] = b"POST / HTTP/1.1\r\nContent-Length: 9\r\n\r\nsome bodyEXTRA";
        let mut scratch = RequestScratch::default();
        let mut request = read_request(&mut input, &mut scratch).await.unwrap();

        let mut buf = [0u8; 4];
        let mut collected = Vec::new();
        loop {
            let n = request.read_body_into(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            collected.extend_from_slice(&buf[..n]);
        }
        assert_eq!(collected, b"some body");

        let mut empty: [u8; 0] = [];
        assert!(matches!(request.read_body_into(&mut empty).await, Err(Error::InvalidBody)));
    }

    #[tokio::test]
    async fn test_json_body() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct User {
            name: String,
            age: u32,
        }

        let mut input: &'static [u8] = b"POST /users HTTP/1.1\r\nHost: a\r\nContent-Type: application/json\r\nContent-Length: 23\r\n\r\n{\"name\":\"Ada\",\"age\":36}";
        let mut scratch = RequestScratch::default();
        let mut request = read_request(&mut input, &mut scratch).await.unwrap();
        assert!(request.is_json());

        let user: User = request.json().await.unwrap();
        assert_eq!(user, User { name: "Ada".to_string(), age: 36 });
    }

    #[tokio::test]
    async fn test_query_params() {
        let mut input: &'static [u8] = b"GET /search?q=rust&page=2&flag HTTP/1.1\r\nHost: a\r\n\r\n";
        let mut scratch = RequestScratch::default();
        let request = read_request(&mut input, &mut scratch).await.unwrap();
        assert_eq!(request.url.path, "/search");
        assert_eq!(request.url.query_param("q").as_deref(), Some("rust"));
        assert_eq!(request.url.query_param("page").as_deref(), Some("2"));
        assert_eq!(request.url.query_param("flag").as_deref(), Some(""));
        assert_eq!(request.url.query_param("missing"), None);
    }
}
