#![no_main]
use libfuzzer_sys::fuzz_target;
use gpolyline::codec::{decode, decode_unchecked};

fuzz_target!(|data: &[u8]| {
    // The decoder must never panic, only return errors.
    let s = String::from_utf8_lossy(data);
    let eager = decode(&s);
    let lazy = decode_unchecked(&s).find_map(Result::err);

    // Both passes must agree on whether the input is valid.
    assert_eq!(eager.is_ok(), lazy.is_none());
});
