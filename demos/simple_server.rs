//! A simple HTTP server demonstrating how to use the minihttp-rs library.
//!
//! Try it with:
//!
//! ```text
//! curl -v http://127.0.0.1:8081/hello?name=you
//! curl -v -d '{"message":"hi"}' -H 'Content-Type: application/json' http://127.0.0.1:8081/echo
//! ```

use std::time::Duration;

use log::info;
use minihttp_rs::{Handler, HandlerFuture, HttpServer, Method, Request, Response, ServerConfig, StatusCode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    message: String,
}

struct App;

impl Handler for App {
    fn handle<'a>(&'a self, res: &'a mut Response<'_>, mut req: Request<'a>) -> HandlerFuture<'a> {
        Box::pin(async move {
            info!("{} {} from {:?}", req.method, req.url.path, req.host);

            match (req.method, req.path()) {
                (Method::GET, "/hello") => {
                    let name = req.url.query_param("name").unwrap_or_else(|| "world".to_string());
                    res.set_content_type("text/plain");
                    res.write(format!("Hello, {name}!"));
                }
                (Method::POST, "/echo") if req.is_json() => {
                    let message: Message = req.json().await?;
                    res.write_json(&message)?;
                }
                (Method::POST, "/echo") => {
                    let body = req.read_body().await?;
                    res.set_content_type("application/octet-stream");
                    res.write(&body[..]);
                }
                _ => {
                    res.write_header(StatusCode::NotFound);
                    res.set_content_type("text/plain");
                    res.write(format!("Not found: {}", req.url.path));
                }
            }

            Ok(())
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), minihttp_rs::ServerError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::default()
        .with_addr(([127, 0, 0, 1], 8081).into())
        .with_read_timeout(Duration::from_secs(30))
        .with_write_timeout(Duration::from_secs(30));

    HttpServer::new(config, App).start().await
}
