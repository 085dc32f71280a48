use std::borrow::Cow;

pub const PREAMBLE: &str = "<html><head><style>\r\n\
                            body{font-family: monospace; font-size: 15px;}\r\n\
                            td {padding: 1.5px 6px;}\r\n\
                            </style></head><body><table>\r\n";

pub const EPILOGUE: &str = "</table></body></html>\r\n";

/// Escapes text for use in HTML content and quoted attribute values.
pub fn escape_html(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// One table row linking to `{path}/{name}`.
pub fn row(path: &str, name: &str) -> String {
    let name = escape_html(name);
    format!(
        "<tr><td><a href=\"{}/{}\">{}</a></td></tr>\r\n",
        escape_html(path),
        name,
        name
    )
}

/// Full listing page. The `.` entry is skipped; everything else keeps the
/// order it was given in.
pub fn render<S: AsRef<str>>(path: &str, entries: &[S]) -> String {
    let mut page = String::with_capacity(PREAMBLE.len() + EPILOGUE.len() + entries.len() * 64);
    page.push_str(PREAMBLE);
    for name in entries {
        let name = name.as_ref();
        if name != "." {
            page.push_str(&row(path, name));
        }
    }
    page.push_str(EPILOGUE);
    page
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_leaves_plain_text_borrowed() {
        assert!(matches!(escape_html("a.txt"), Cow::Borrowed("a.txt")));
    }

    #[test]
    fn escape_replaces_markup() {
        assert_eq!(
            escape_html("<b>\"x\" & 'y'</b>"),
            "&lt;b&gt;&quot;x&quot; &amp; &#39;y&#39;&lt;/b&gt;"
        );
    }
}
