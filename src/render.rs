use crate::form::{FormView, SubmissionStatus};

/// Render the landing page with the contact section drawn from `view`.
pub fn landing_page(view: &FormView) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Contact</title>
<style>{css}</style>
</head>
<body>
<main>
<section id="contact" class="contact-page">
<h1 class="contact-title">Get in touch</h1>
{form}
</section>
</main>
</body>
</html>"#,
        css = css(),
        form = contact_form(view),
    )
}

/// The form block alone: inputs bound to the current fields, submit button, notice.
pub fn contact_form(view: &FormView) -> String {
    let sending = view.status == SubmissionStatus::Sending;
    let button_label = if sending { "Sending..." } else { "Send Message" };
    let disabled = if sending { " disabled" } else { "" };

    let notice_html = match (view.status, view.notice) {
        (SubmissionStatus::Success, Some(msg)) => format!(
            "<p class=\"contact-flash contact-flash-success\" role=\"status\">{}</p>",
            html_escape(msg)
        ),
        (SubmissionStatus::Error, Some(msg)) => format!(
            "<p class=\"contact-flash contact-flash-error\" role=\"alert\">{}</p>",
            html_escape(msg)
        ),
        _ => String::new(),
    };

    format!(
        r#"<form method="post" action="/contact" class="contact-form">
<div class="contact-form-group"><input type="text" id="cf-name" name="name" required placeholder="Your Name" value="{name}"></div>
<div class="contact-form-group"><input type="email" id="cf-email" name="email" required placeholder="Your Email" value="{email}"></div>
<div class="contact-form-group"><textarea id="cf-message" name="message" rows="4" required placeholder="Your Message">{message}</textarea></div>
<button type="submit" class="contact-submit"{disabled}>{button_label}</button>
{notice_html}
</form>"#,
        name = html_escape(&view.fields.name),
        email = html_escape(&view.fields.email),
        message = html_escape(&view.fields.message),
        disabled = disabled,
        button_label = button_label,
        notice_html = notice_html,
    )
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn css() -> &'static str {
    r#"
body{margin:0;background:#000;color:#fff;font-family:system-ui,sans-serif}
.contact-page{max-width:32rem;margin:0 auto;padding:64px 20px}
.contact-title{text-align:center;color:#eab308}
.contact-form-group{margin-bottom:24px}
.contact-form input,.contact-form textarea{width:100%;box-sizing:border-box;padding:12px 16px;border-radius:8px;background:rgba(0,0,0,.5);border:1px solid rgba(234,179,8,.2);color:#fff}
.contact-form textarea{resize:none}
.contact-submit{width:100%;padding:16px 32px;background:#eab308;color:#000;font-weight:600;border:0;border-radius:8px;cursor:pointer}
.contact-submit:disabled{opacity:.5;cursor:not-allowed}
.contact-flash{text-align:center}
.contact-flash-success{color:#22c55e}
.contact-flash-error{color:#ef4444}
"#
}
