use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// What the stub answers for one request.
#[derive(Debug, Clone)]
pub enum Reply {
    Json(String),
    Text(String),
    Status(u16),
    /// Accept the request, then say nothing for this long.
    Hang(Duration),
}

type Handler = dyn Fn(&str) -> Reply + Send + Sync;

/// Minimal HTTP/1.1 server on an ephemeral port. Each connection gets its own
/// thread, so a hanging reply never blocks the others.
pub struct StubServer {
    port: u16,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    /// `handler` receives the request target (path and query).
    pub fn start<F>(handler: F) -> Self
    where
        F: Fn(&str) -> Reply + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind stub server");
        let port = listener.local_addr().expect("stub server address").port();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let handler: Arc<Handler> = Arc::new(handler);

        {
            let requests = requests.clone();
            thread::spawn(move || {
                for stream in listener.incoming() {
                    let Ok(stream) = stream else { continue };
                    let handler = handler.clone();
                    let requests = requests.clone();
                    thread::spawn(move || serve(stream, &*handler, &requests));
                }
            });
        }

        Self { port, requests }
    }

    /// Answers every request with a freegeoip record for the requested address.
    pub fn geolocation() -> Self {
        Self::start(|target| Reply::Json(geodata_json(address_of(target))))
    }

    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}/", self.port)
    }

    /// Request targets seen so far, in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// First path segment of a request target: `/1.2.3.4?output=json` -> `1.2.3.4`.
pub fn address_of(target: &str) -> &str {
    let path = target.split('?').next().unwrap_or_default();
    path.trim_start_matches('/')
}

pub fn geodata_json(address: &str) -> String {
    let last = address.rsplit('.').next().unwrap_or("0");
    format!(
        r#"{{"ip":"{address}","country_code":"US","country_name":"United States","region_code":"OR","region_name":"Oregon","city":"City{last}","zip_code":"97818","time_zone":"America/Los_Angeles","latitude":45.5,"longitude":-119.5,"metro_code":810,"hostname":null}}"#
    )
}

fn serve(mut stream: TcpStream, handler: &Handler, requests: &Mutex<Vec<String>>) {
    let mut reader = BufReader::new(match stream.try_clone() {
        Ok(s) => s,
        Err(_) => return,
    });

    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }

    // Drain headers.
    loop {
        let mut header = String::new();
        match reader.read_line(&mut header) {
            Ok(0) => break,
            Ok(_) if header == "\r\n" || header == "\n" => break,
            Ok(_) => continue,
            Err(_) => return,
        }
    }

    let target = request_line
        .split_whitespace()
        .nth(1)
        .unwrap_or("/")
        .to_string();
    requests.lock().unwrap().push(target.clone());

    let (status, content_type, body) = match handler(&target) {
        Reply::Json(body) => (200, "application/json", body),
        Reply::Text(body) => (200, "text/plain", body),
        Reply::Status(code) => (code, "text/plain", String::new()),
        Reply::Hang(how_long) => {
            thread::sleep(how_long);
            return;
        }
    };

    let response = format!(
        "HTTP/1.1 {status} Stub\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}
