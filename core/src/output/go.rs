use lazy_regex::{lazy_regex, Lazy, Regex};

use super::{address, Verbosity};

static RE_PANIC: Lazy<Regex> = lazy_regex!(r"(?s)(panic: [^\n]*\n).*");

static RE_STACK_OVERFLOW: Lazy<Regex> = lazy_regex!(
    r"(?s)runtime: goroutine stack exceeds [^\n]*limit\nruntime:[^\n]*\n(fatal error: stack overflow\n).*"
);

/// Panic and stack overflow traces are cut below [`Verbosity::Verbatim`].
pub fn normalise(output: &str, verbosity: Verbosity) -> String {
    let normalised = address::normalise_memory_addresses(output);
    if verbosity == Verbosity::Verbatim {
        return normalised;
    }
    let normalised = normalise_panic(&normalised);
    let normalised = normalise_stack_overflow(&normalised);
    address::normalise_memory_addresses(&normalised)
}

/// Keeps the `panic: ...` line and drops the goroutine dump after it.
pub fn normalise_panic(output: &str) -> String {
    RE_PANIC.replace(output, "${1}").into_owned()
}

pub fn normalise_stack_overflow(output: &str) -> String {
    RE_STACK_OVERFLOW.replace(output, "${1}").into_owned()
}
