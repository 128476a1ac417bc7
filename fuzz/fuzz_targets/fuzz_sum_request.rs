//! Fuzz testing for the `/sum` request body decoder.
//!
//! The decoder is the only parser that sees untrusted bytes. For any input it
//! must either reject the body or produce operands whose sum is well defined:
//!
//! - Never panics, including on invalid UTF-8 and deeply nested JSON
//! - Decoding is deterministic
//! - Summing never overflows (wrapping arithmetic)
//!
//! # Running the Fuzz Tests
//!
//! ```bash
//! # Install cargo-fuzz (requires nightly)
//! cargo +nightly install cargo-fuzz
//!
//! # Run the decoder fuzz target
//! cargo +nightly fuzz run fuzz_sum_request
//!
//! # Run with a time limit (e.g., 60 seconds)
//! cargo +nightly fuzz run fuzz_sum_request -- -max_total_time=60
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use sum_service::handlers::decode_sum_request;

fuzz_target!(|data: &[u8]| {
    if let Ok(request) = decode_sum_request(data) {
        let response = request.sum();
        assert_eq!(response.sum, request.a.wrapping_add(request.b));

        let again = decode_sum_request(data).expect("accepted body must decode again");
        assert_eq!(again, request);
    }
});
