mod util;

mod raw_peer;
