//! HTTP response rendering for the redirect page
//!
//! Whatever the outcome of parsing, the browser gets exactly one minimal
//! HTTP/1.1 response: a `200 OK` status line, `Content-Length`,
//! `Content-Type: text/html`, a close header, and one of two HTML pages
//! with the catalog-provided title and message substituted in.

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::catalog::{keys, MessageCatalog};

const SUCCESS_TEMPLATE: &str = include_str!("templates/login_success.html");
const FAILED_TEMPLATE: &str = include_str!("templates/login_failed.html");

/// Renders the success or failure page, replacing the `${title}` and
/// `${message}` tokens with catalog lookups.
pub(crate) fn render_page(success: bool, catalog: &dyn MessageCatalog) -> String {
    let (template, title_key, message_key) = if success {
        (SUCCESS_TEMPLATE, keys::SUCCESS_TITLE, keys::SUCCESS_MESSAGE)
    } else {
        (FAILED_TEMPLATE, keys::FAILED_TITLE, keys::FAILED_MESSAGE)
    };
    template
        .replace("${title}", &catalog.get(title_key))
        .replace("${message}", &catalog.get(message_key))
}

/// Writes a minimal HTTP/1.1 response carrying `html`.
///
/// `Content-Length` is the exact byte length of the body. No other headers,
/// no chunked encoding; the connection is closed by the caller afterwards.
pub(crate) async fn write_response<W>(writer: &mut W, html: &str) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n{}",
        html.len(),
        html
    );
    writer.write_all(response.as_bytes()).await?;
    writer.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::EnglishCatalog;
    use std::io::Cursor;

    /// Catalog returning multi-byte text, to pin `Content-Length` to bytes
    /// rather than characters.
    struct UmlautCatalog;

    impl MessageCatalog for UmlautCatalog {
        fn get(&self, _key: &str) -> String {
            "Schlüssel übergeben".to_string()
        }
    }

    fn split_response(raw: &[u8]) -> (String, Vec<u8>) {
        let text = String::from_utf8_lossy(raw);
        let boundary = text.find("\r\n\r\n").expect("header/body boundary");
        (
            text[..boundary].to_string(),
            raw[boundary + 4..].to_vec(),
        )
    }

    #[test]
    fn test_render_substitutes_both_tokens() {
        let page = render_page(true, &EnglishCatalog);
        assert!(page.contains("Login successful"));
        assert!(!page.contains("${title}"), "title token left in page: {page}");
        assert!(!page.contains("${message}"), "message token left in page: {page}");
    }

    #[test]
    fn test_render_selects_failure_template_on_failure() {
        let page = render_page(false, &EnglishCatalog);
        assert!(page.contains("Login failed"));
        assert!(!page.contains("Login successful"));
    }

    #[tokio::test]
    async fn test_response_shape_and_headers() {
        let html = render_page(true, &EnglishCatalog);
        let mut sink = Cursor::new(Vec::new());
        write_response(&mut sink, &html).await.expect("write to buffer");

        let (headers, body) = split_response(sink.get_ref());
        assert!(headers.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(headers.contains("Content-Type: text/html"));
        assert!(headers.contains("Connection: close"));
        assert_eq!(body, html.as_bytes());
    }

    #[tokio::test]
    async fn test_content_length_counts_bytes_not_chars() {
        let html = render_page(false, &UmlautCatalog);
        assert_ne!(
            html.len(),
            html.chars().count(),
            "fixture must contain multi-byte characters"
        );

        let mut sink = Cursor::new(Vec::new());
        write_response(&mut sink, &html).await.expect("write to buffer");

        let (headers, body) = split_response(sink.get_ref());
        let content_length: usize = headers
            .lines()
            .find_map(|line| line.strip_prefix("Content-Length: "))
            .expect("Content-Length header")
            .parse()
            .expect("numeric Content-Length");
        assert_eq!(content_length, body.len());
    }
}
