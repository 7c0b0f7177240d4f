#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);
    let args: Vec<String> = s.split('\0').map(str::to_owned).collect();
    gpolyline::cli::fuzz_try_parse_args(&args);
});
