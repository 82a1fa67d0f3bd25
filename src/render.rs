//! HTML pages
//!
//! Pure rendering functions; no I/O and no failure modes. Every value that
//! originates from Discord is escaped before it reaches the document.

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::auth::UserRecord;

/// Render the profile page for an authenticated user
pub fn render_profile(user: &UserRecord) -> String {
    let username = encode_text(&user.username);
    let display_name = encode_text(user.display_name());
    let avatar_url = user.avatar_url();
    let avatar_url = encode_double_quoted_attribute(&avatar_url);
    // No custom avatar: the id-bearing URL 404s on the CDN, so swap in the default
    let avatar_fallback = if user.has_custom_avatar() {
        String::new()
    } else {
        format!(
            r#" onerror="this.onerror=null;this.src='{}'""#,
            encode_double_quoted_attribute(&user.default_avatar_url())
        )
    };
    let id = encode_text(&user.id);
    let locale = encode_text(user.locale.as_deref().unwrap_or("unknown"));
    let premium = user
        .premium_type
        .map(|tier| tier.to_string())
        .unwrap_or_else(|| "None".to_string());

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Welcome {username}</title>
    <style>
        body {{ text-align: center; font-family: Arial, sans-serif; margin-top: 50px; }}
        img {{ border-radius: 50%; width: 100px; height: 100px; }}
        .container {{ padding: 20px; border: 1px solid #ccc; display: inline-block; border-radius: 10px; background-color: #f4f4f4; }}
    </style>
</head>
<body>
    <div class="container">
        <h1>Welcome, {display_name}!</h1>
        <img src="{avatar_url}" alt="Avatar"{avatar_fallback}>
        <p>Discord ID: {id}</p>
        <p>Locale: {locale}</p>
        <p>Premium Type: {premium}</p>
        <a href="/game">Go back to game</a>
    </div>
</body>
</html>
"#
    )
}

/// Render the sign-in page
///
/// `signed_in_as` is the display name of an already authenticated session.
pub fn render_home(signed_in_as: Option<&str>) -> String {
    let continue_link = match signed_in_as {
        Some(name) => format!(
            r#"<p><a href="/profile">Continue as {}</a></p>"#,
            encode_text(name)
        ),
        None => String::new(),
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Discord Arcade</title>
</head>
<body style="text-align: center; font-family: Arial, sans-serif; margin-top: 50px;">
    <h1>Discord Arcade</h1>
    <p>Please sign in with Discord</p>
    <a href="/auth/start">Sign in with Discord</a>
    {continue_link}
</body>
</html>
"#
    )
}
