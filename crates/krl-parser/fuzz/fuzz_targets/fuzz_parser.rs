#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Nested chevron interpolations re-enter the lexer and parser once per
    // level.
    if data.len() > 16_384 {
        return;
    }
    if let Ok(source) = std::str::from_utf8(data) {
        // The parser must never panic on any input
        let _ = krl_parser::parse(source);
        let _ = krl_parser::parse_expression(source);
    }
});
