//! A simple example demonstrating how to use the minihttp-rs library to parse HTTP requests.

use minihttp_rs::{read_request, RequestScratch};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Example HTTP request
    let mut input: &'static [u8] =
        b"POST /index.html?lang=en HTTP/1.1\r\nHost: example.com\r\nUser-Agent: ExampleBrowser/1.0\r\nContent-Length: 11\r\n\r\nhello world";
    let mut scratch = RequestScratch::default();

    // Parse the request
    match read_request(&mut input, &mut scratch).await {
        Ok(mut request) => {
            println!("Successfully parsed HTTP request:");
            println!("Method: {}", request.method);
            println!("Path: {}", request.url.path);
            println!("Query: {:?}", request.url.raw_query);
            println!("Protocol: {}", request.protocol);
            println!("Host: {:?}", request.host);
            println!("Headers:");
            for header in request.headers() {
                println!("  {}: {}", header.key, header.value);
            }
            match request.read_body().await {
                Ok(body) => println!("Body: {}", String::from_utf8_lossy(&body)),
                Err(err) => println!("Error reading body: {err}"),
            }
        }
        Err(err) => {
            println!("Error parsing request: {err}");
        }
    }

    // Example with an invalid request
    let mut invalid: &'static [u8] = b"GET /index.html HTTP/1.1\nHost: example.com\r\n\r\n";
    let mut scratch = RequestScratch::default();

    match read_request(&mut invalid, &mut scratch).await {
        Ok(_) => {
            println!("\nUnexpectedly parsed invalid request!");
        }
        Err(err) => {
            println!("\nExpected error parsing invalid request: {err}");
        }
    }
}
