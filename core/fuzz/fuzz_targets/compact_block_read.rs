#![no_main]
extern crate glacier_core;
#[macro_use]
extern crate libfuzzer_sys;

use glacier_core::core::block;
use glacier_core::ser;

fuzz_target!(|data: &[u8]| {
	let mut d = data.clone();
	let _t: Result<block::CompactBlock, ser::Error> = ser::deserialize(&mut d);
});
