//! Template-to-page transform.
//!
//! [`render`] is a pure function of the template text and the page id. It
//! never touches the filesystem; persisting the result is the job of
//! [`Materializer`](crate::Materializer).

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::MaterializeError;

/// File name of the client-side script that fetches page content by id.
const DATA_LOADER_FILE: &str = "dataLoader.js";

/// Reference appended when the template does not load the data loader itself.
const DATA_LOADER_TAG: &str = r#"<script src="../js/dataLoader.js"></script>"#;

/// Root-relative references rewritten to parent-relative ones.
///
/// Each entry is an attribute name and the path after the leading `/`.
/// Entries ending in `/` match any path below that directory; the others
/// match a single file, optionally followed by a query or fragment.
const ASSET_CLASSES: &[(&str, &str)] = &[
    ("href", "style/"),
    ("src", "script.js"),
    ("src", "js/dataLoader.js"),
    ("href", "images/"),
    ("src", "images/"),
    ("href", "videos/"),
    ("src", "videos/"),
    ("href", "fonts/"),
    ("src", "fonts/"),
];

static HEAD_CLOSE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</head\s*>").unwrap());

static BODY_CLOSE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</body\s*>").unwrap());

/// A `<script>` whose only content assigns the page id global.
///
/// A declaration alone on its line is removed with the whole line; one that
/// shares its line with other markup is removed by itself.
static PAGE_ID_DECL_RE: LazyLock<Regex> = LazyLock::new(|| {
    const DECL: &str = r"<script\b[^>]*>\s*(?:window\.)?PAGE_ID\s*=\s*[^<;]*;?\s*</script\s*>";
    Regex::new(&format!(r"(?im)^[ \t]*{DECL}[ \t]*(?:\r?\n|\z)|{DECL}")).unwrap()
});

/// `href`/`src` attribute whose value starts with a single `/`.
static ROOT_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?P<lead>\s(?P<attr>href|src)\s*=\s*["'])/(?P<path>[^"'\s>]*)"#).unwrap()
});

/// Derive a page document from `template` for the page with id `page_id`.
///
/// Steps, in order:
/// 1. remove any existing page id declaration;
/// 2. declare `window.PAGE_ID` before `</head>`;
/// 3. rewrite the known root-relative asset references to `../`;
/// 4. reference the data loader before `</body>` unless already present.
///
/// The output is deterministic for a given `(template, page_id)`.
pub fn render(template: &str, page_id: i64) -> Result<String, MaterializeError> {
    if page_id <= 0 {
        return Err(MaterializeError::InvalidPageId(page_id));
    }
    if !HEAD_CLOSE_RE.is_match(template) {
        return Err(MaterializeError::TemplateMalformed { missing: "</head>" });
    }
    if !BODY_CLOSE_RE.is_match(template) {
        return Err(MaterializeError::TemplateMalformed { missing: "</body>" });
    }

    let stripped = strip_page_id(template);
    let declared = declare_page_id(&stripped, page_id)?;
    let rewritten = rewrite_asset_paths(&declared);
    ensure_data_loader(&rewritten)
}

/// Remove every page id declaration.
fn strip_page_id(html: &str) -> String {
    let removed = PAGE_ID_DECL_RE.find_iter(html).count();
    if removed > 0 {
        tracing::debug!(removed, "Removed stale page id declarations");
    }
    PAGE_ID_DECL_RE.replace_all(html, "").into_owned()
}

/// Insert the page id declaration before the first `</head>`.
fn declare_page_id(html: &str, page_id: i64) -> Result<String, MaterializeError> {
    let head_close = HEAD_CLOSE_RE
        .find(html)
        .ok_or(MaterializeError::TemplateMalformed { missing: "</head>" })?;
    let tag = format!("<script>window.PAGE_ID = {page_id};</script>");
    Ok(insert_before(html, head_close.start(), &tag))
}

/// Rewrite root-relative references of the known asset classes.
fn rewrite_asset_paths(html: &str) -> String {
    let mut rewritten = 0usize;
    let result = ROOT_ATTR_RE.replace_all(html, |caps: &Captures<'_>| {
        if is_asset_reference(&caps["attr"], &caps["path"]) {
            rewritten += 1;
            format!("{}../{}", &caps["lead"], &caps["path"])
        } else {
            caps[0].to_owned()
        }
    });
    tracing::debug!(rewritten, "Rewrote asset references");
    result.into_owned()
}

/// Check whether `attr="/path"` belongs to one of [`ASSET_CLASSES`].
fn is_asset_reference(attr: &str, path: &str) -> bool {
    ASSET_CLASSES.iter().any(|(class_attr, prefix)| {
        if !attr.eq_ignore_ascii_case(class_attr) {
            return false;
        }
        if prefix.ends_with('/') {
            return path.starts_with(prefix);
        }
        path.strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with(['?', '#']))
    })
}

/// Append the data loader before the last `</body>` unless referenced.
fn ensure_data_loader(html: &str) -> Result<String, MaterializeError> {
    if html.contains(DATA_LOADER_FILE) {
        return Ok(html.to_owned());
    }
    let body_close = BODY_CLOSE_RE
        .find_iter(html)
        .last()
        .ok_or(MaterializeError::TemplateMalformed { missing: "</body>" })?;
    Ok(insert_before(html, body_close.start(), DATA_LOADER_TAG))
}

/// Insert `snippet` before the closing tag at byte offset `pos`.
///
/// When the tag sits alone on its line, the snippet gets its own line with
/// the tag's indentation. Otherwise it is placed directly before the tag.
fn insert_before(html: &str, pos: usize, snippet: &str) -> String {
    let line_start = html[..pos].rfind('\n').map_or(0, |i| i + 1);
    let indent = &html[line_start..pos];

    let mut out = String::with_capacity(html.len() + snippet.len() + indent.len() + 1);
    if indent.chars().all(|c| c == ' ' || c == '\t') {
        out.push_str(&html[..line_start]);
        out.push_str(indent);
        out.push_str(snippet);
        out.push('\n');
        out.push_str(&html[line_start..]);
    } else {
        out.push_str(&html[..pos]);
        out.push_str(snippet);
        out.push_str(&html[pos..]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="pl">
<head>
  <meta charset="utf-8">
  <link rel="stylesheet" href="/style/style.css">
  <link rel="icon" href="/images/favicon.png">
  <link rel="preload" href="/fonts/inter.woff2" as="font">
  <link rel="canonical" href="https://example.com/">
</head>
<body>
  <img src="/images/logo.png" alt="Logo">
  <img src="/fonts/icons.svg" alt="">
  <video src="/videos/intro.mp4" poster="/images/poster.jpg"></video>
  <a href="/videos/intro.mp4">Download</a>
  <a href="https://cdn.example.com/style/external.css">External</a>
  <a href="/api/pages/1">API</a>
  <script src="//cdn.example.com/lib.js"></script>
  <script src="/script.js"></script>
</body>
</html>
"#;

    fn count(haystack: &str, needle: &str) -> usize {
        haystack.matches(needle).count()
    }

    #[test]
    fn test_render_end_to_end_minimal_template() {
        let template = "<html>\n<head>\n<link href=\"/style/style.css\">\n<script src=\"/script.js\"></script>\n</head>\n<body>\n</body>\n</html>\n";
        let html = render(template, 7).unwrap();
        assert_eq!(
            html,
            "<html>\n<head>\n<link href=\"../style/style.css\">\n<script src=\"../script.js\"></script>\n<script>window.PAGE_ID = 7;</script>\n</head>\n<body>\n<script src=\"../js/dataLoader.js\"></script>\n</body>\n</html>\n"
        );
    }

    #[test]
    fn test_render_rewrites_every_asset_class() {
        let html = render(TEMPLATE, 3).unwrap();

        assert!(html.contains(r#"href="../style/style.css""#));
        assert!(html.contains(r#"href="../images/favicon.png""#));
        assert!(html.contains(r#"href="../fonts/inter.woff2""#));
        assert!(html.contains(r#"src="../images/logo.png""#));
        assert!(html.contains(r#"src="../videos/intro.mp4""#));
        assert!(html.contains(r#"href="../videos/intro.mp4""#));
        assert!(html.contains(r#"src="../script.js""#));
        assert!(html.contains(r#"src="../fonts/icons.svg""#));

        for attr in ["href", "src"] {
            for dir in ["style", "images", "videos", "fonts"] {
                assert_eq!(count(&html, &format!(r#"{attr}="/{dir}/"#)), 0, "{attr} {dir}");
            }
        }
        assert_eq!(count(&html, r#"src="/script.js"#), 0);
        assert_eq!(count(&rewrite_asset_paths(TEMPLATE), r#"="../"#), 8);
    }

    #[test]
    fn test_render_leaves_unrelated_paths_untouched() {
        let html = render(TEMPLATE, 3).unwrap();

        assert!(html.contains(r#"href="https://example.com/""#));
        assert!(html.contains(r#"href="https://cdn.example.com/style/external.css""#));
        assert!(html.contains(r#"href="/api/pages/1""#));
        assert!(html.contains(r#"src="//cdn.example.com/lib.js""#));
    }

    #[test]
    fn test_render_poster_attribute_is_not_an_asset_class() {
        // Only href and src are rewritten.
        let html = render(TEMPLATE, 3).unwrap();
        assert!(html.contains(r#"poster="/images/poster.jpg""#));
    }

    #[test]
    fn test_rewrite_is_scoped_to_attribute() {
        let html = rewrite_asset_paths(
            r#"<a href="/script.js">s</a><img src="/style/bg.png"><link href="/js/dataLoader.js">"#,
        );
        assert_eq!(
            html,
            r#"<a href="/script.js">s</a><img src="/style/bg.png"><link href="/js/dataLoader.js">"#
        );
    }

    #[test]
    fn test_rewrite_matches_exact_script_file() {
        let html = rewrite_asset_paths(
            r#"<script src="/script.js?v=2"></script><script src="/script.jsx"></script><script src="/scripts/app.js"></script>"#,
        );
        assert_eq!(
            html,
            r#"<script src="../script.js?v=2"></script><script src="/script.jsx"></script><script src="/scripts/app.js"></script>"#
        );
    }

    #[test]
    fn test_rewrite_requires_directory_boundary() {
        let html = rewrite_asset_paths(r#"<link href="/styles.css"><img src="/imagesets/a.png">"#);
        assert_eq!(html, r#"<link href="/styles.css"><img src="/imagesets/a.png">"#);
    }

    #[test]
    fn test_rewrite_handles_single_quotes_and_uppercase_attributes() {
        let html = rewrite_asset_paths(r"<link HREF='/style/a.css'><img SRC='/images/a.png'>");
        assert_eq!(html, r"<link HREF='../style/a.css'><img SRC='../images/a.png'>");
    }

    #[test]
    fn test_rewrite_ignores_data_attributes() {
        let html = rewrite_asset_paths(r#"<div data-src="/images/lazy.png"></div>"#);
        assert_eq!(html, r#"<div data-src="/images/lazy.png"></div>"#);
    }

    #[test]
    fn test_render_declares_exactly_one_page_id() {
        let html = render(TEMPLATE, 42).unwrap();
        assert_eq!(count(&html, "PAGE_ID"), 1);
        assert!(html.contains("\n<script>window.PAGE_ID = 42;</script>\n</head>"));
    }

    #[test]
    fn test_render_replaces_stale_page_id() {
        let template = "<head>\n  <script>window.PAGE_ID = 3;</script>\n  <script>PAGE_ID=9</script>\n</head><body></body>";
        let html = render(template, 5).unwrap();
        assert_eq!(count(&html, "PAGE_ID"), 1);
        assert!(html.contains("window.PAGE_ID = 5;"));
        assert!(!html.contains("= 3;"));
    }

    #[test]
    fn test_render_strips_mid_line_declaration_without_joining_tags() {
        let template = "<head>\n<title>x</title> <script>window.PAGE_ID = 3;</script>\n<meta charset=\"utf-8\">\n</head>\n<body>\n</body>\n";
        let html = render(template, 5).unwrap();
        assert_eq!(
            html,
            "<head>\n<title>x</title> \n<meta charset=\"utf-8\">\n<script>window.PAGE_ID = 5;</script>\n</head>\n<body>\n<script src=\"../js/dataLoader.js\"></script>\n</body>\n"
        );
    }

    #[test]
    fn test_render_strips_declaration_on_last_line() {
        let template = "<head></head><body></body>\n  <script>PAGE_ID = 1</script>";
        let html = render(template, 2).unwrap();
        assert_eq!(count(&html, "PAGE_ID"), 1);
        assert!(html.ends_with("</body>\n"));
    }

    #[test]
    fn test_render_keeps_other_inline_scripts() {
        let template =
            "<head><script>window.THEME = 'dark';</script></head><body><script>init();</script></body>";
        let html = render(template, 1).unwrap();
        assert!(html.contains("<script>window.THEME = 'dark';</script>"));
        assert!(html.contains("<script>init();</script>"));
    }

    #[test]
    fn test_render_appends_data_loader_when_missing() {
        let html = render(TEMPLATE, 3).unwrap();
        assert_eq!(count(&html, DATA_LOADER_FILE), 1);
        assert!(html.contains("\n<script src=\"../js/dataLoader.js\"></script>\n</body>"));
    }

    #[test]
    fn test_render_does_not_duplicate_existing_data_loader() {
        let template =
            "<head></head><body><script src=\"/js/dataLoader.js\"></script></body>";
        let html = render(template, 3).unwrap();
        assert_eq!(count(&html, DATA_LOADER_FILE), 1);
        assert!(html.contains(r#"<script src="../js/dataLoader.js"></script></body>"#));
    }

    #[test]
    fn test_render_inline_closing_tags() {
        let html = render("<html><head></head><body><p>x</p></body></html>", 2).unwrap();
        assert_eq!(
            html,
            "<html><head><script>window.PAGE_ID = 2;</script></head><body><p>x</p><script src=\"../js/dataLoader.js\"></script></body></html>"
        );
    }

    #[test]
    fn test_render_closing_tags_are_case_insensitive() {
        let html = render("<HEAD></HEAD><BODY></BODY>", 2).unwrap();
        assert!(html.contains("window.PAGE_ID = 2;</script></HEAD>"));
        assert!(html.contains("dataLoader.js\"></script></BODY>"));
    }

    #[test]
    fn test_render_is_deterministic() {
        assert_eq!(render(TEMPLATE, 9).unwrap(), render(TEMPLATE, 9).unwrap());
    }

    #[test]
    fn test_render_of_generated_document_is_stable() {
        let first = render(TEMPLATE, 4).unwrap();
        let second = render(&first, 8).unwrap();

        assert_eq!(count(&second, "PAGE_ID"), 1);
        assert!(second.contains("window.PAGE_ID = 8;"));
        assert_eq!(count(&second, DATA_LOADER_FILE), 1);
        assert_eq!(count(&second, "../../"), 0);
        assert_eq!(second, first.replace("PAGE_ID = 4;", "PAGE_ID = 8;"));
    }

    #[test]
    fn test_render_missing_head_close() {
        let err = render("<html><body></body></html>", 1).unwrap_err();
        assert!(matches!(
            err,
            MaterializeError::TemplateMalformed { missing: "</head>" }
        ));
    }

    #[test]
    fn test_render_missing_body_close() {
        let err = render("<html><head></head><body></html>", 1).unwrap_err();
        assert!(matches!(
            err,
            MaterializeError::TemplateMalformed { missing: "</body>" }
        ));
    }

    #[test]
    fn test_render_rejects_non_positive_id() {
        assert!(matches!(
            render(TEMPLATE, 0),
            Err(MaterializeError::InvalidPageId(0))
        ));
        assert!(matches!(
            render(TEMPLATE, -4),
            Err(MaterializeError::InvalidPageId(-4))
        ));
    }
}
