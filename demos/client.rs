//! Demo client: requests a handful of the server's objects by sending
//! `"sid:idx sid:idx ..."` on stream 66, then drains the endpoint until
//! stream 77 delivers the server's `b"fin"` sentinel.

use std::collections::HashMap;
use std::net::SocketAddr;

use bytes::Bytes;
use clap::Parser;
use dquic::Endpoint;
use rand::seq::SliceRandom;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const REQUEST_STREAM: u32 = 66;
const FIN_STREAM: u32 = 77;

/// The server holds this many objects to pick from.
const NUM_OBJECTS: usize = 10;

#[derive(Parser)]
struct Args {
    /// How many streams to request, between 1 and 10.
    streams: usize,
    /// Server address.
    #[arg(long, default_value = "127.0.0.1:9999")]
    server: SocketAddr,
}

fn build_request(streams: usize) -> String {
    let mut rng = rand::rng();
    let mut sids: Vec<u32> = (0..NUM_OBJECTS as u32).collect();
    let mut objects: Vec<usize> = (0..NUM_OBJECTS).collect();
    sids.shuffle(&mut rng);
    objects.shuffle(&mut rng);
    sids.iter()
        .zip(&objects)
        .take(streams)
        .map(|(sid, idx)| format!("{sid}:{idx}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn main() -> dquic::DquicResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();
    if !(1..=NUM_OBJECTS).contains(&args.streams) {
        error!("stream count must be between 1 and {NUM_OBJECTS}");
        return Ok(());
    }

    let request = build_request(args.streams);
    info!(%request, server = %args.server, "sending request");

    let mut endpoint = Endpoint::new();
    let request_map = HashMap::from([(REQUEST_STREAM, Bytes::from(request.into_bytes()))]);
    endpoint.send_to(args.server, &request_map)?;

    // drain the response until the fin sentinel lands on stream 77
    let mut received: HashMap<u32, Vec<u8>> = HashMap::new();
    let mut packets = 0u64;
    info!("receiving response");
    while received.get(&FIN_STREAM).map(Vec::as_slice) != Some(b"fin".as_slice()) {
        let (_, chunk) = endpoint.receive_from(65536)?;
        packets += 1;
        for (sid, data) in chunk {
            received.entry(sid).or_default().extend_from_slice(&data);
        }
    }

    received.remove(&FIN_STREAM);
    info!(packets, streams = received.len(), "receiving complete");
    for (sid, object) in &received {
        info!(stream = sid, size = object.len(), "object received");
    }

    endpoint.close();
    info!("socket closed");
    Ok(())
}
