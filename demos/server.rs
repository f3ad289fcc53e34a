//! Demo server: pre-generates random objects, waits for a request on
//! stream 66 of the form `"sid:idx sid:idx ..."`, ships the requested
//! objects on the caller's stream ids, then signals the end of the
//! transmission with `b"fin"` on stream 77.

use std::collections::HashMap;
use std::net::SocketAddr;

use bytes::Bytes;
use clap::Parser;
use dquic::Endpoint;
use rand::Rng;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Stream carrying the client's request string.
const REQUEST_STREAM: u32 = 66;
/// Stream carrying the end-of-transmission sentinel.
const FIN_STREAM: u32 = 77;

const NUM_OBJECTS: usize = 10;
const MIN_OBJECT_BYTES: usize = 1024 * 1024;
const MAX_OBJECT_BYTES: usize = 2 * 1024 * 1024;

#[derive(Parser)]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1:9999")]
    listen: SocketAddr,
}

fn generate_objects() -> Vec<Bytes> {
    let mut rng = rand::rng();
    (0..NUM_OBJECTS)
        .map(|_| {
            let size = rng.random_range(MIN_OBJECT_BYTES..=MAX_OBJECT_BYTES);
            let blob: Vec<u8> = (0..size).map(|_| rng.random()).collect();
            Bytes::from(blob)
        })
        .collect()
}

/// Parse `"sid:idx sid:idx ..."` into (stream id, object index) pairs.
fn parse_request(request: &str) -> Option<Vec<(u32, usize)>> {
    request
        .split_whitespace()
        .map(|pair| {
            let (sid, idx) = pair.split_once(':')?;
            Some((sid.parse().ok()?, idx.parse().ok()?))
        })
        .collect()
}

fn main() -> dquic::DquicResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();

    info!("generating {NUM_OBJECTS} objects");
    let objects = generate_objects();

    let mut endpoint = Endpoint::new();
    endpoint.bind(args.listen)?;
    info!(addr = %args.listen, "listening, waiting for a request");

    let (client, request) = endpoint.receive_from(65536)?;
    let Some(request) = request.get(&REQUEST_STREAM) else {
        error!(%client, "first packet carried no request stream");
        return Ok(());
    };
    let request = String::from_utf8_lossy(request);
    let Some(pairs) = parse_request(&request) else {
        error!(%client, %request, "malformed request");
        return Ok(());
    };

    let mut response: HashMap<u32, Bytes> = HashMap::new();
    for &(sid, idx) in &pairs {
        let Some(object) = objects.get(idx) else {
            error!(idx, "request names an object out of range");
            return Ok(());
        };
        info!(stream = sid, object = idx, size = object.len(), "queued");
        response.insert(sid, object.clone());
    }

    info!(%client, streams = response.len(), "sending objects");
    let sent = endpoint.send_to(client, &response)?;
    info!(bytes = sent, "objects delivered");

    let fin = HashMap::from([(FIN_STREAM, Bytes::from_static(b"fin"))]);
    endpoint.send_to(client, &fin)?;
    endpoint.close();
    info!("socket closed");
    Ok(())
}
