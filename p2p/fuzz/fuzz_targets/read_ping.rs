#![no_main]
#[macro_use]
extern crate libfuzzer_sys;
extern crate glacier_core;
extern crate glacier_p2p;

use glacier_core::ser;
use glacier_p2p::msg::Ping;

fuzz_target!(|data: &[u8]| {
	let mut d = data.clone();
	let _t: Result<Ping, ser::Error> = ser::deserialize(&mut d);
});
