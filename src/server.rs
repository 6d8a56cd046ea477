//! HTTP front end: routing, replies and the worker pool
//!
//! Routing is a pure function (`handle`) from method, url, content type and
//! body to a `Reply`, so it can be exercised without a socket. `GridServer`
//! wires it to a `tiny_http::Server` shared by a fixed pool of threads.

use std::io::{self, Read};
use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};
use std::thread;

use log::{error, info, warn};
use tiny_http::{Header, Method, Request, Response, Server};

use crate::rendering::render_grid;
use crate::{form, Error, Grid, Result, ServerConfig};

pub const IMAGE_ROUTE: &str = "/image";

/// An HTTP response that has not been written yet.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub headers: Vec<(&'static str, String)>,
    pub body: Vec<u8>,
}

impl Reply {
    pub fn html(body: &str) -> Self {
        Self {
            status: 200,
            headers: vec![("Content-Type", "text/html; charset=utf-8".into())],
            body: body.as_bytes().to_vec(),
        }
    }

    pub fn attachment(body: Vec<u8>, filename: &str) -> Self {
        Self {
            status: 200,
            headers: vec![
                ("Content-Type", "application/octet-stream".into()),
                ("Content-Disposition", format!("attachment; filename=\"{}\"", filename)),
            ],
            body,
        }
    }

    pub fn text(status: u16, message: &str) -> Self {
        Self {
            status,
            headers: vec![
                ("Content-Type", "text/plain; charset=utf-8".into()),
                ("X-Content-Type-Options", "nosniff".into()),
            ],
            body: format!("{}\n", message).into_bytes(),
        }
    }

    pub fn from_error(err: &Error) -> Self {
        Self::text(err.status_code(), &err.to_string())
    }

    pub fn method_not_allowed(allow: &str) -> Self {
        let mut reply = Self::text(405, "Method Not Allowed");
        reply.headers.push(("Allow", allow.to_string()));
        reply
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn into_response(self) -> Response<std::io::Cursor<Vec<u8>>> {
        let mut response = Response::from_data(self.body).with_status_code(self.status);
        for (name, value) in &self.headers {
            match Header::from_bytes(name.as_bytes(), value.as_bytes()) {
                Ok(h) => response.add_header(h),
                Err(()) => warn!("dropping invalid response header {}", name),
            }
        }
        response
    }
}

/// The HTML form page with the sample grid filled in.
pub fn form_page() -> &'static str {
    static PAGE: OnceLock<String> = OnceLock::new();
    PAGE.get_or_init(|| {
        let sample = Grid::sample().to_json().unwrap_or_else(|_| "[]".to_string());
        include_str!("form.html").replace("__GRID_SAMPLE__", &sample)
    })
}

fn route_path(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

/// Whether the request is an image upload, the only route that reads its body.
pub fn is_upload(method: &Method, url: &str) -> bool {
    *method == Method::Post && route_path(url) == IMAGE_ROUTE
}

/// Route one request.
pub fn handle(
    method: &Method,
    url: &str,
    content_type: Option<&str>,
    body: &[u8],
    config: &ServerConfig,
) -> Reply {
    if route_path(url) != IMAGE_ROUTE {
        return Reply::html(form_page());
    }
    if *method != Method::Post {
        return Reply::method_not_allowed("POST");
    }

    // Render fully before replying so an encode failure still gets a status.
    let rendered = form::parse_grid(content_type, body).and_then(|grid| render_grid(&grid, &config.render));
    match rendered {
        Ok(image) => Reply::attachment(image.png_data, &config.download_filename),
        Err(err) => Reply::from_error(&err),
    }
}

/// Read at most `limit` bytes of body. Past the limit up to another `limit`
/// bytes are drained so the client sees the error reply instead of a reset
/// connection; a body announced larger than that is refused unread.
pub fn read_limited<R: Read + ?Sized>(
    reader: &mut R,
    announced: Option<usize>,
    limit: usize,
) -> Result<Vec<u8>> {
    if announced.is_some_and(|len| len > limit.saturating_mul(2)) {
        return Err(Error::PayloadTooLarge(limit));
    }
    let mut body = Vec::new();
    Read::take(&mut *reader, limit as u64 + 1).read_to_end(&mut body)?;
    if body.len() > limit {
        io::copy(&mut Read::take(&mut *reader, limit as u64), &mut io::sink())?;
        return Err(Error::PayloadTooLarge(limit));
    }
    Ok(body)
}

/// Throw away at most `cap` bytes of a body nobody reads.
fn discard_body(request: &mut Request, cap: usize) {
    if let Err(e) = io::copy(&mut Read::take(request.as_reader(), cap as u64), &mut io::sink()) {
        warn!("failed to discard request body: {}", e);
    }
}

fn serve(mut request: Request, config: &ServerConfig) {
    let method = request.method().clone();
    let url = request.url().to_string();
    let content_type = request
        .headers()
        .iter()
        .find(|h| h.field.equiv("Content-Type"))
        .map(|h| h.value.as_str().to_string());

    let reply = if is_upload(&method, &url) {
        let announced = request.body_length();
        match read_limited(request.as_reader(), announced, config.max_body_bytes) {
            Ok(body) => handle(&method, &url, content_type.as_deref(), &body, config),
            Err(err) => Reply::from_error(&err),
        }
    } else {
        discard_body(&mut request, config.max_body_bytes.saturating_mul(2));
        handle(&method, &url, content_type.as_deref(), b"", config)
    };

    match reply.status {
        400..=499 => warn!(
            "{} {} -> {}: {}",
            method,
            url,
            reply.status,
            String::from_utf8_lossy(&reply.body).trim_end()
        ),
        500..=599 => error!(
            "{} {} -> {}: {}",
            method,
            url,
            reply.status,
            String::from_utf8_lossy(&reply.body).trim_end()
        ),
        _ => info!("{} {} -> {} ({} bytes)", method, url, reply.status, reply.body.len()),
    }

    if let Err(e) = request.respond(reply.into_response()) {
        error!("{} {}: failed to write response: {}", method, url, e);
    }
}

/// A bound server that has not started accepting yet.
pub struct GridServer {
    server: Server,
    config: ServerConfig,
}

impl GridServer {
    pub fn bind(config: ServerConfig) -> Result<Self> {
        let server = Server::http(config.bind.as_str())
            .map_err(|e| Error::ServerError(format!("failed to bind {}: {}", config.bind, e)))?;
        Ok(Self { server, config })
    }

    /// The bound address; useful after binding port 0.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    /// Serve requests on `config.workers` threads until the workers exit.
    pub fn run(self) -> Result<()> {
        let workers = self.config.workers.max(1);
        let server = Arc::new(self.server);
        let config = Arc::new(self.config);

        let mut handles = Vec::with_capacity(workers);
        for id in 0..workers {
            let server = Arc::clone(&server);
            let config = Arc::clone(&config);
            let handle = thread::Builder::new()
                .name(format!("gridpng-worker-{}", id))
                .spawn(move || worker_loop(&server, &config))
                .map_err(|e| Error::ServerError(format!("failed to spawn worker {}: {}", id, e)))?;
            handles.push(handle);
        }
        info!("serving on {} with {} workers", config.bind, workers);

        for handle in handles {
            if handle.join().is_err() {
                error!("worker thread panicked");
            }
        }
        Ok(())
    }
}

fn worker_loop(server: &Server, config: &ServerConfig) {
    loop {
        match server.recv() {
            Ok(request) => serve(request, config),
            Err(e) => {
                error!("accept failed: {}", e);
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post_image(body: &str) -> Reply {
        handle(
            &Method::Post,
            IMAGE_ROUTE,
            Some(form::FORM_URLENCODED),
            body.as_bytes(),
            &ServerConfig::default(),
        )
    }

    fn encoded(json: &str) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .append_pair(form::DATA_FIELD, json)
            .finish()
    }

    #[test]
    fn index_serves_form_with_sample() {
        let reply = handle(&Method::Get, "/", None, b"", &ServerConfig::default());
        assert_eq!(reply.status, 200);
        assert_eq!(reply.header("content-type"), Some("text/html; charset=utf-8"));
        let html = String::from_utf8(reply.body).unwrap();
        assert!(html.contains(r#"action="/image""#));
        assert!(html.contains(r#"{"R":200,"G":0,"B":0,"A":255}"#));
        assert!(!html.contains("__GRID_SAMPLE__"));
    }

    #[test]
    fn unknown_paths_fall_back_to_form() {
        let reply = handle(&Method::Post, "/elsewhere", None, b"", &ServerConfig::default());
        assert_eq!(reply.status, 200);
        assert!(reply.header("Content-Type").unwrap().starts_with("text/html"));
    }

    #[test]
    fn image_route_returns_attachment() {
        let reply = post_image(&encoded(&Grid::sample().to_json().unwrap()));
        assert_eq!(reply.status, 200);
        assert_eq!(reply.header("Content-Type"), Some("application/octet-stream"));
        assert_eq!(
            reply.header("Content-Disposition"),
            Some("attachment; filename=\"image.png\"")
        );
        assert_eq!(&reply.body[0..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn query_string_is_ignored_for_routing() {
        let reply = handle(
            &Method::Post,
            "/image?download=1",
            Some(form::FORM_URLENCODED),
            encoded(&Grid::sample().to_json().unwrap()).as_bytes(),
            &ServerConfig::default(),
        );
        assert_eq!(reply.status, 200);
    }

    #[test]
    fn malformed_json_is_bad_request() {
        let reply = post_image(&encoded("[[{\"R\": 1"));
        assert_eq!(reply.status, 400);
        assert!(!reply.body.is_empty());
        assert_eq!(reply.header("X-Content-Type-Options"), Some("nosniff"));
    }

    #[test]
    fn empty_and_ragged_grids_are_bad_requests() {
        assert_eq!(post_image(&encoded("[]")).status, 400);
        let ragged = r#"[[{"R":1,"G":1,"B":1,"A":1}],[]]"#;
        assert_eq!(post_image(&encoded(ragged)).status, 400);
    }

    #[test]
    fn bad_url_escape_is_bad_request() {
        let reply = post_image(r#"data=[[{"R":1,"G":2,"B":3,"A":4}]]&x=%zz"#);
        assert_eq!(reply.status, 400);
        let text = String::from_utf8(reply.body).unwrap();
        assert!(text.contains("invalid URL escape"));
    }

    #[test]
    fn upload_without_content_type_is_bad_request() {
        let body = encoded(&Grid::sample().to_json().unwrap());
        let reply = handle(&Method::Post, IMAGE_ROUTE, None, body.as_bytes(), &ServerConfig::default());
        assert_eq!(reply.status, 400);
    }

    #[test]
    fn only_image_posts_read_a_body() {
        assert!(is_upload(&Method::Post, "/image"));
        assert!(is_upload(&Method::Post, "/image?x=1"));
        assert!(!is_upload(&Method::Get, "/image"));
        assert!(!is_upload(&Method::Post, "/"));
        assert!(!is_upload(&Method::Get, "/"));
    }

    #[test]
    fn read_limited_accepts_bodies_within_limit() {
        let body = read_limited(&mut &b"data=abc"[..], Some(8), 8).unwrap();
        assert_eq!(body, b"data=abc");
    }

    #[test]
    fn read_limited_stops_on_endless_body() {
        // io::repeat never ends; the read must still terminate.
        let err = read_limited(&mut io::repeat(b'x'), None, 1024).unwrap_err();
        assert!(matches!(err, Error::PayloadTooLarge(1024)));
    }

    #[test]
    fn read_limited_drains_a_bounded_overflow() {
        let data = vec![b'x'; 1500];
        let mut reader = &data[..];
        let err = read_limited(&mut reader, Some(1500), 1000).unwrap_err();
        assert!(matches!(err, Error::PayloadTooLarge(1000)));
        assert!(reader.is_empty());
    }

    #[test]
    fn read_limited_refuses_huge_announced_body_unread() {
        let data = vec![b'x'; 16];
        let mut reader = &data[..];
        let err = read_limited(&mut reader, Some(usize::MAX), 1000).unwrap_err();
        assert!(matches!(err, Error::PayloadTooLarge(1000)));
        assert_eq!(reader.len(), 16);
    }

    #[test]
    fn get_on_image_route_is_not_allowed() {
        let reply = handle(&Method::Get, IMAGE_ROUTE, None, b"", &ServerConfig::default());
        assert_eq!(reply.status, 405);
        assert_eq!(reply.header("Allow"), Some("POST"));
    }

    #[test]
    fn custom_filename_is_used() {
        let cfg = ServerConfig {
            download_filename: "grid.png".into(),
            ..Default::default()
        };
        let body = encoded(&Grid::sample().to_json().unwrap());
        let reply = handle(
            &Method::Post,
            IMAGE_ROUTE,
            Some(form::FORM_URLENCODED),
            body.as_bytes(),
            &cfg,
        );
        assert_eq!(
            reply.header("Content-Disposition"),
            Some("attachment; filename=\"grid.png\"")
        );
    }
}
