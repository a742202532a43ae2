//! HTML page templates.

/// Shared page chrome.
///
/// Placeholders:
/// - `{title}` - Page title
/// - `{body}` - Page content
pub const LAYOUT: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} - cfipd</title>
<style>
body { font-family: system-ui, sans-serif; max-width: 40rem; margin: 3rem auto; padding: 0 1rem; color: #222; }
form.card, section.card { border: 1px solid #ddd; border-radius: 6px; padding: 1.25rem; margin-bottom: 1.5rem; }
label { display: block; margin: 0.5rem 0 0.25rem; }
input[type=text], input[type=password] { width: 100%; padding: 0.4rem; box-sizing: border-box; }
button { margin-top: 0.75rem; padding: 0.4rem 1rem; }
.error { color: #b00020; }
.muted { color: #666; font-size: 0.9rem; }
code { background: #f4f4f4; padding: 0.1rem 0.3rem; word-break: break-all; }
</style>
</head>
<body>
{body}
</body>
</html>
"#;

/// Credential form used by both login and registration.
///
/// Placeholders:
/// - `{heading}` - Form heading
/// - `{action}` - Form target path
/// - `{error}` - Rendered error paragraph, or empty
/// - `{submit}` - Submit button label
/// - `{footer}` - Link shown under the form
pub const CREDENTIAL_FORM: &str = r#"<h1>{heading}</h1>
<form class="card" method="post" action="{action}">
{error}<label for="username">Username</label>
<input id="username" name="username" type="text" autocomplete="username" required autofocus>
<label for="password">Password</label>
<input id="password" name="password" type="password" autocomplete="current-password" required>
<button type="submit">{submit}</button>
</form>
{footer}"#;

/// Landing page for logged-in users.
///
/// Placeholders:
/// - `{username}` - Logged-in user
/// - `{files}` - Rendered file list
/// - `{max_upload}` - Human-readable upload limit
pub const INDEX: &str = r#"<h1>cfipd</h1>
<p class="muted">Signed in as {username} &middot; <a href="/logout">Log out</a></p>

<form class="card" id="upload-form">
<h2>Upload</h2>
<p class="muted">One CSV or TXT file, up to {max_upload}. A new upload replaces the stored file.</p>
<input type="file" name="file" accept=".csv,.txt" required>
<button type="submit">Upload</button>
<p id="upload-result"></p>
</form>

<section class="card">
<h2>Stored file</h2>
{files}
<button type="button" id="clear-files">Clear files</button>
</section>

<section class="card">
<h2>API key</h2>
<p class="muted">Send it as <code>X-API-Key</code> to upload without a session.</p>
<button type="button" id="generate-key">Generate API key</button>
<p id="api-key"></p>
</section>

<script>
async function postJson(url, init) {
  const response = await fetch(url, Object.assign({ method: "POST", credentials: "same-origin" }, init));
  const body = await response.json().catch(() => ({ status: "error", message: response.statusText }));
  return { ok: response.ok, body };
}

document.getElementById("upload-form").addEventListener("submit", async (event) => {
  event.preventDefault();
  const out = document.getElementById("upload-result");
  const { ok, body } = await postJson("/upload", { body: new FormData(event.target) });
  if (ok) {
    out.textContent = (body.replaced ? "Replaced with " : "Stored as ") + body.filename + " (from " + body.originalname + ")";
    setTimeout(() => location.reload(), 800);
  } else {
    out.textContent = body.message;
    out.className = "error";
  }
});

document.getElementById("clear-files").addEventListener("click", async () => {
  if (!confirm("Delete the stored file?")) return;
  const { ok, body } = await postJson("/clear-files");
  if (ok) location.reload(); else alert(body.message);
});

document.getElementById("generate-key").addEventListener("click", async () => {
  const out = document.getElementById("api-key");
  const { ok, body } = await postJson("/generate-api-key");
  if (ok) {
    out.innerHTML = "";
    const code = document.createElement("code");
    code.textContent = body.api_key;
    out.append("Copy it now, it is not shown again: ", code);
  } else {
    out.textContent = body.message;
    out.className = "error";
  }
});
</script>"#;
