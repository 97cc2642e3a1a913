#![no_main]
#[macro_use] extern crate libfuzzer_sys;
extern crate glacier_core;

use std::path::Path;
use std::fs::File;
use std::io::prelude::*;
use glacier_core::ser;
use glacier_core::core::{self, block};

fuzz_target!(|data: &[u8]| {
	let mut d = data.clone();
	let _t: Result<block::Block, ser::Error> = ser::deserialize(&mut d);
});

