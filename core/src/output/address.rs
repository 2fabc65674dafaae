use std::collections::HashMap;

use lazy_regex::{lazy_regex, Captures, Lazy, Regex};

static RE_MEMORY_ADDRESS: Lazy<Regex> = lazy_regex!(r"\b0x[0-9A-Fa-f]+\b");

/// Spacing between fake addresses: `0x100`, `0x200`, `0x300`, ...
const ADDRESS_STEP: u64 = 0x100;

/// Replaces every hex address with a fake one, numbered in order of first appearance.
///
/// The same address always gets the same replacement within one call.
///
/// ```
/// use snipcheck_core::output::address::normalise_memory_addresses;
///
/// let got = normalise_memory_addresses("a=0xdeadbeef b=0x7ff0 again=0xdeadbeef\n");
/// assert_eq!(got, "a=0x100 b=0x200 again=0x100\n");
/// ```
pub fn normalise_memory_addresses(output: &str) -> String {
    let mut seen: HashMap<String, String> = HashMap::new();

    RE_MEMORY_ADDRESS
        .replace_all(output, |cap: &Captures| {
            let next = (seen.len() as u64 + 1) * ADDRESS_STEP;
            seen.entry(cap[0].to_owned())
                .or_insert_with(|| format!("{:#x}", next))
                .clone()
        })
        .into_owned()
}
