//! Conversion between plain text and the HTML that Anki keeps in note fields.

use lazy_regex::{lazy_regex, Captures, Lazy, Regex};

static RE_CODE_OPEN: Lazy<Regex> = lazy_regex!(r#"<pre><code class="lang-\w+">"#);

/// One pass, so `&amp;quot;` stays `&quot;`.
static RE_ESCAPE: Lazy<Regex> = lazy_regex!(r"<br>|&(?:lt|gt|nbsp|apos|quot|amp);");

const CODE_CLOSE: &str = "</code></pre>";
const SAMP_OPEN: &str = "<pre><samp>";
const SAMP_CLOSE: &str = "</samp></pre>";

/// Accepts more escapes than [`escape_html`] emits.
///
/// ```
/// use snipcheck_core::storage::markup::unescape_html;
///
/// assert_eq!(unescape_html("a&nbsp;&lt;b&gt;<br>&quot;c&apos;"), "a <b>\n\"c'");
/// ```
pub fn unescape_html(html: &str) -> String {
    RE_ESCAPE
        .replace_all(html, |cap: &Captures| match &cap[0] {
            "<br>" => "\n",
            "&lt;" => "<",
            "&gt;" => ">",
            "&nbsp;" => " ",
            "&apos;" => "'",
            "&quot;" => "\"",
            _ => "&",
        })
        .into_owned()
}

/// `&` must go first.
pub fn escape_html(plain: &str) -> String {
    plain.replace('&', "&amp;").replace('<', "&lt;")
}

pub fn code_from_field(field: &str) -> String {
    let code = RE_CODE_OPEN.replace_all(field, "");
    let code = code.strip_suffix(CODE_CLOSE).unwrap_or(&*code);
    unescape_html(code)
}

pub fn code_to_field(code: &str, highlight_class: &str) -> String {
    format!(
        r#"<pre><code class="lang-{}">{}{}"#,
        highlight_class,
        escape_html(code),
        CODE_CLOSE
    )
}

pub fn output_from_field(field: &str) -> String {
    let output = field.strip_prefix(SAMP_OPEN).unwrap_or(field);
    let output = output.strip_suffix(SAMP_CLOSE).unwrap_or(output);
    unescape_html(output)
}

pub fn output_to_field(output: &str) -> String {
    format!("{}{}{}", SAMP_OPEN, escape_html(output), SAMP_CLOSE)
}
