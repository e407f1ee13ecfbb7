//! Cloud-drive (Google Drive) download.
//!
//! Small files come back directly as an attachment. Large files first get an
//! HTML interstitial ("can't scan this file for viruses") whose form or link
//! carries a confirmation token; following it, with the cookies the first
//! response set, yields the file.

use super::get::{perform, persist, stage};
use super::{CurlOptions, Fetcher, TransferError};
use std::fs;
use std::path::Path;
use url::Url;

pub struct GoogleDriveFetcher {
    opts: CurlOptions,
    max_hops: u32,
}

impl GoogleDriveFetcher {
    pub fn new(opts: CurlOptions, max_hops: u32) -> Self {
        Self { opts, max_hops }
    }
}

impl Fetcher for GoogleDriveFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<(), TransferError> {
        let id = file_id(url).ok_or_else(|| TransferError::MissingFileId {
            url: url.to_string(),
        })?;
        tracing::info!(id = %id, "downloading [{}] to [{}]", url, dest.display());

        let mut easy = self.opts.easy()?;
        // Empty string turns on the in-memory cookie engine.
        easy.cookie_file("")?;

        let mut next = url.to_string();
        for hop in 0..=self.max_hops {
            let mut staged = stage(dest)?;
            let resp = perform(&mut easy, &next, staged.as_file_mut())?;
            if !resp.is_success() {
                return Err(TransferError::Http {
                    url: next,
                    code: resp.code,
                });
            }
            if resp.is_attachment() || !resp.is_html() {
                persist(staged, dest)?;
                tracing::debug!(bytes = resp.bytes, hops = hop, dest = %dest.display(), "download complete");
                return Ok(());
            }

            let page = fs::read(staged.path()).map_err(|source| TransferError::Io {
                path: staged.path().to_path_buf(),
                source,
            })?;
            let page = String::from_utf8_lossy(&page);
            next = confirm_url(&page, &next).ok_or_else(|| TransferError::NoDownloadLink {
                url: url.to_string(),
            })?;
            tracing::debug!(hop, next = %next, "following cloud-drive confirmation page");
        }

        Err(TransferError::TooManyHops {
            url: url.to_string(),
            hops: self.max_hops + 1,
        })
    }
}

/// The `id` query parameter of a share URL.
fn file_id(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed
        .query_pairs()
        .find(|(k, _)| k == "id")
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty())
}

/// Where the interstitial page wants us to go next, resolved against `page_url`.
///
/// Tries, in order: the `download-form` form (action plus hidden inputs), an
/// `/uc?export=download` link, and a `"downloadUrl"` JSON field.
fn confirm_url(html: &str, page_url: &str) -> Option<String> {
    let base = Url::parse(page_url).ok()?;
    download_form(html, &base)
        .or_else(|| export_link(html, &base))
        .or_else(|| json_download_url(html))
}

fn download_form(html: &str, base: &Url) -> Option<String> {
    let marker = html.find("id=\"download-form\"")?;
    let start = html[..marker].rfind("<form")?;
    let end = html[marker..]
        .find("</form>")
        .map(|i| marker + i)
        .unwrap_or(html.len());
    let form = &html[start..end];
    let form_tag = &form[..form.find('>')?];
    let action = unescape_html(attr(form_tag, "action")?);

    let mut url = base.join(&action).ok()?;
    {
        let mut pairs = url.query_pairs_mut();
        let mut rest = form;
        while let Some(i) = rest.find("<input") {
            rest = &rest[i..];
            let tag_end = rest.find('>').unwrap_or(rest.len());
            let tag = &rest[..tag_end];
            if attr(tag, "type") == Some("hidden") {
                if let (Some(name), Some(value)) = (attr(tag, "name"), attr(tag, "value")) {
                    pairs.append_pair(&unescape_html(name), &unescape_html(value));
                }
            }
            rest = &rest[tag_end..];
        }
    }
    Some(url.into())
}

fn export_link(html: &str, base: &Url) -> Option<String> {
    let mut rest = html;
    while let Some(i) = rest.find("href=\"") {
        rest = &rest[i + "href=\"".len()..];
        let end = rest.find('"')?;
        let href = unescape_html(&rest[..end]);
        if href.contains("/uc?export=download") {
            return base.join(&href).ok().map(String::from);
        }
        rest = &rest[end..];
    }
    None
}

fn json_download_url(html: &str) -> Option<String> {
    let key = "\"downloadUrl\":\"";
    let start = html.find(key)? + key.len();
    let end = html[start..].find('"')? + start;
    let raw = html[start..end]
        .replace("\\u003d", "=")
        .replace("\\u0026", "&")
        .replace("\\/", "/");
    Url::parse(&raw).ok().map(String::from)
}

/// Value of `name="..."` inside a single tag.
fn attr<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    let needle = format!(" {}=\"", name);
    let start = tag.find(&needle)? + needle.len();
    let end = tag[start..].find('"')? + start;
    Some(&tag[start..end])
}

fn unescape_html(s: &str) -> String {
    s.replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "https://drive.google.com/u/0/uc?id=1YiEO85VvV2OJbr1ueZomznyL_pO9Lmwy";

    #[test]
    fn file_id_from_share_url() {
        assert_eq!(
            file_id(PAGE).as_deref(),
            Some("1YiEO85VvV2OJbr1ueZomznyL_pO9Lmwy")
        );
        assert_eq!(file_id("https://drive.google.com/uc?export=download"), None);
        assert_eq!(file_id("https://drive.google.com/uc?id="), None);
        assert_eq!(file_id("not a url"), None);
    }

    #[test]
    fn form_with_hidden_inputs() {
        let html = r#"<html><body>
            <p>Google Drive can't scan this file for viruses.</p>
            <form id="download-form" action="https://drive.usercontent.google.com/download" method="get">
              <input type="submit" id="uc-download-link" value="Download anyway"/>
              <input type="hidden" name="id" value="1YiEO85VvV2OJbr1ueZomznyL_pO9Lmwy">
              <input type="hidden" name="export" value="download">
              <input type="hidden" name="confirm" value="t">
              <input type="hidden" name="uuid" value="abc-123">
            </form></body></html>"#;
        let next = confirm_url(html, PAGE).unwrap();
        assert_eq!(
            next,
            "https://drive.usercontent.google.com/download?id=1YiEO85VvV2OJbr1ueZomznyL_pO9Lmwy&export=download&confirm=t&uuid=abc-123"
        );
    }

    #[test]
    fn relative_form_action_joins_page_url() {
        let html = r#"<form action="/download" id="download-form"><input type="hidden" name="confirm" value="t"></form>"#;
        let next = confirm_url(html, "http://127.0.0.1:9000/uc?id=x").unwrap();
        assert_eq!(next, "http://127.0.0.1:9000/download?confirm=t");
    }

    #[test]
    fn legacy_export_link() {
        let html = r#"<a id="uc-download-link" href="/uc?export=download&amp;confirm=Xy_z&amp;id=abc">Download anyway</a>"#;
        let next = confirm_url(html, "https://drive.google.com/uc?id=abc").unwrap();
        assert_eq!(
            next,
            "https://drive.google.com/uc?export=download&confirm=Xy_z&id=abc"
        );
    }

    #[test]
    fn json_download_url_field() {
        let html = r#"<script>var data = {"downloadUrl":"https:\/\/doc-0s.googleusercontent.com\/x?id=abc&e=download"};</script>"#;
        let next = confirm_url(html, PAGE).unwrap();
        assert_eq!(next, "https://doc-0s.googleusercontent.com/x?id=abc&e=download");
    }

    #[test]
    fn page_without_link() {
        let html = "<html><body>Sorry, you can't view or download this file at this time.</body></html>";
        assert_eq!(confirm_url(html, PAGE), None);
    }

    #[test]
    fn attr_requires_exact_name() {
        let tag = r#"<input type="hidden" data-name="x" name="confirm" value="t""#;
        assert_eq!(attr(tag, "name"), Some("confirm"));
        assert_eq!(attr(tag, "value"), Some("t"));
        assert_eq!(attr(tag, "action"), None);
    }
}
