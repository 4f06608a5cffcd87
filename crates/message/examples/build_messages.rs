use http_message::error::Error;
use http_message::response::Response;
use http_message::server::{ServerEnv, ServerRequest};
use http_message::stream::Stream;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<(), Error> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder().with_max_level(Level::TRACE).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    // a snapshot like the one transport glue would assemble
    let env = ServerEnv::new()
        .with_server_value("SERVER_PROTOCOL", "HTTP/1.1")
        .with_server_value("REQUEST_METHOD", "POST")
        .with_server_value("REQUEST_URI", "/items?page=2")
        .with_server_value("QUERY_STRING", "page=2")
        .with_server_value("HTTP_HOST", "example.com")
        .with_server_value("SERVER_PORT", "8080")
        .with_header("Host", "example.com:8080")
        .with_header("Content-Type", "application/json")
        .with_input(&br#"{"name":"widget"}"#[..]);

    let request = ServerRequest::from_env(&env)?;
    info!(method = %request.method(), uri = %request.uri(), "request assembled");

    let tagged = request.with_attribute("route", "items.create");
    info!(route = ?tagged.attribute("route"), "routing attribute attached");

    let body = request.body().borrow_mut().contents()?;
    info!(bytes = body.len(), "request body drained");

    let mut stream = Stream::temp();
    stream.write(b"created")?;

    let response = Response::builder()
        .status(201)
        .header("Content-Type", "text/plain")
        .header("Location", "/items/1")
        .body(stream)
        .build()?;
    info!(status = response.status_code(), reason = %response.reason_phrase(), "response assembled");

    let listing = response.with_added_header("X-Trace", "abc123");
    info!(headers = listing.headers().len(), "derived response keeps the original intact");

    Ok(())
}
