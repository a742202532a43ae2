//! Server-rendered HTML pages.

mod templates;

use std::collections::BTreeSet;

/// Escape a string for safe use in HTML content and attribute values.
fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn layout(title: &str, body: &str) -> String {
    templates::LAYOUT
        .replace("{title}", &escape_html(title))
        .replace("{body}", body)
}

fn error_line(error: Option<&str>) -> String {
    error
        .map(|e| format!("<p class=\"error\">{}</p>\n", escape_html(e)))
        .unwrap_or_default()
}

fn format_size(bytes: u64) -> String {
    const MIB: u64 = 1024 * 1024;
    const KIB: u64 = 1024;
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{} MiB", bytes / MIB)
    } else if bytes >= KIB && bytes % KIB == 0 {
        format!("{} KiB", bytes / KIB)
    } else {
        format!("{bytes} bytes")
    }
}

/// Login form, optionally with an error message.
pub fn login_page(error: Option<&str>) -> String {
    let body = templates::CREDENTIAL_FORM
        .replace("{heading}", "Log in")
        .replace("{action}", "/login")
        .replace("{error}", &error_line(error))
        .replace("{submit}", "Log in")
        .replace("{footer}", "");
    layout("Log in", &body)
}

/// Registration form for the first (and only) account.
pub fn register_page(error: Option<&str>) -> String {
    let body = templates::CREDENTIAL_FORM
        .replace("{heading}", "Create the account")
        .replace("{action}", "/register")
        .replace("{error}", &error_line(error))
        .replace("{submit}", "Register")
        .replace(
            "{footer}",
            "<p class=\"muted\">Registration closes once this account exists. \
             <a href=\"/login\">Log in</a></p>",
        );
    layout("Register", &body)
}

/// Landing page with the upload form and the current slot contents.
pub fn index_page(username: &str, files: &BTreeSet<String>, max_upload_bytes: u64) -> String {
    let files_html = if files.is_empty() {
        "<p class=\"muted\">No file stored.</p>".to_string()
    } else {
        let items: String = files
            .iter()
            .map(|name| {
                let name = escape_html(name);
                format!("<li><a href=\"/uploads/{name}\" target=\"_blank\">{name}</a></li>")
            })
            .collect();
        format!("<ul>{items}</ul>")
    };

    let body = templates::INDEX
        .replace("{files}", &files_html)
        .replace("{max_upload}", &format_size(max_upload_bytes))
        .replace("{username}", &escape_html(username));
    layout("Upload", &body)
}
