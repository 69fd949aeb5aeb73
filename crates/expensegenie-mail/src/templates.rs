//! Message templates
//!
//! Every message has a plain-text and an HTML body. User-supplied values
//! are escaped before they reach the HTML.

pub const VERIFY_SUBJECT: &str = "Verify Your Email Address - ExpenseGenie";
pub const RESET_SUBJECT: &str = "Reset Your Password - ExpenseGenie";

/// A rendered message ready for a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Signup email carrying the 6-digit code
pub fn verification_code(to: &str, username: &str, code: &str, valid_minutes: i64) -> EmailMessage {
    let text = format!(
        "Hi {username},\n\n\
         Thank you for signing up for ExpenseGenie!\n\n\
         Your verification code is: {code}\n\n\
         Enter this code on the verification page to activate your account. \
         The code will expire in {valid_minutes} minutes.\n\n\
         If you didn't create an account with ExpenseGenie, please ignore this email.\n\n\
         Best regards,\nThe ExpenseGenie Team\n"
    );

    let body = format!(
        r#"<p>Hi <strong>{name}</strong>,</p>
<p>Thank you for signing up! Use the code below to verify your email address.</p>
<p style="font-size: 32px; font-weight: bold; letter-spacing: 8px; text-align: center;">{code}</p>
<p style="color: #999999; font-size: 14px;">This code will expire in {valid_minutes} minutes. If you didn't create an account with ExpenseGenie, please ignore this email.</p>"#,
        name = escape_html(username),
        code = escape_html(code),
    );

    EmailMessage {
        to: to.to_string(),
        subject: VERIFY_SUBJECT.to_string(),
        text,
        html: layout("Welcome to ExpenseGenie!", &body),
    }
}

/// Resend email carrying both a fresh code and a verification link
pub fn verification(to: &str, username: &str, code: &str, link: &str, valid_minutes: i64) -> EmailMessage {
    let text = format!(
        "Hi {username},\n\n\
         Your new verification code is: {code}\n\
         It will expire in {valid_minutes} minutes.\n\n\
         You can also verify your email address by opening this link:\n{link}\n\n\
         This link will expire in 24 hours.\n\n\
         If you didn't create an account with ExpenseGenie, please ignore this email.\n\n\
         Best regards,\nThe ExpenseGenie Team\n"
    );

    let body = format!(
        r#"<p>Hi <strong>{name}</strong>,</p>
<p>Your new verification code is:</p>
<p style="font-size: 32px; font-weight: bold; letter-spacing: 8px; text-align: center;">{code}</p>
<p>Or verify with one click:</p>
<p style="text-align: center;"><a href="{link}" style="display: inline-block; padding: 14px 40px; background-color: #667eea; color: #ffffff; text-decoration: none; border-radius: 6px; font-weight: bold;">Verify Email Address</a></p>
<p style="color: #667eea; font-size: 14px; word-break: break-all;">{link}</p>
<p style="color: #999999; font-size: 14px;">The code expires in {valid_minutes} minutes and the link in 24 hours.</p>"#,
        name = escape_html(username),
        code = escape_html(code),
        link = escape_html(link),
    );

    EmailMessage {
        to: to.to_string(),
        subject: VERIFY_SUBJECT.to_string(),
        text,
        html: layout("Verify Your Email", &body),
    }
}

pub fn password_reset(to: &str, username: &str, link: &str) -> EmailMessage {
    let text = format!(
        "Hi {username}, we received a request to reset your password. \
         Visit this link to reset it: {link}\n\n\
         This link will expire in 1 hour. If you didn't request a password reset, please ignore this email.\n"
    );

    let body = format!(
        r#"<p>Hi {name},</p>
<p>We received a request to reset your password. Click the button below to set a new password:</p>
<p style="text-align: center;"><a href="{link}" style="display: inline-block; padding: 14px 40px; background-color: #667eea; color: #ffffff; text-decoration: none; border-radius: 6px; font-weight: bold;">Reset Password</a></p>
<p style="color: #999999; font-size: 14px;">This link will expire in 1 hour. If you didn't request a password reset, please ignore this email.</p>"#,
        name = escape_html(username),
        link = escape_html(link),
    );

    EmailMessage {
        to: to.to_string(),
        subject: RESET_SUBJECT.to_string(),
        text,
        html: layout("Reset Your Password", &body),
    }
}

fn layout(heading: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>{heading}</title></head>
<body style="font-family: Arial, sans-serif; background-color: #f4f4f4; padding: 20px;">
<div style="max-width: 600px; margin: 0 auto; background-color: #ffffff; padding: 40px; border-radius: 8px;">
<h1 style="color: #333333; text-align: center;">{heading}</h1>
{body}
</div>
</body>
</html>"#
    )
}

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_code_message() {
        let msg = verification_code("maria@example.com", "maria", "482913", 15);
        assert_eq!(msg.to, "maria@example.com");
        assert_eq!(msg.subject, VERIFY_SUBJECT);
        assert!(msg.text.contains("Your verification code is: 482913"));
        assert!(msg.text.contains("15 minutes"));
        assert!(msg.html.contains("482913"));
    }

    #[test]
    fn test_verification_message_has_code_and_link() {
        let link = "http://localhost:5173/verify-email?token=abc";
        let msg = verification("m@example.com", "m", "123456", link, 15);
        assert!(msg.text.contains("123456"));
        assert!(msg.text.contains(link));
        assert!(msg.html.contains(link));
    }

    #[test]
    fn test_reset_message() {
        let link = "http://localhost:5173/reset-password?token=abc";
        let msg = password_reset("m@example.com", "m", link);
        assert_eq!(msg.subject, RESET_SUBJECT);
        assert!(msg.text.contains(link));
        assert!(msg.text.contains("1 hour"));
    }

    #[test]
    fn test_username_is_escaped() {
        let msg = verification_code("x@example.com", "<script>", "111111", 15);
        assert!(!msg.html.contains("<script>"));
        assert!(msg.html.contains("&lt;script&gt;"));
    }
}
