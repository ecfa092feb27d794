use super::{NotificationKind, OutboundEmail, TicketEmail};
use crate::short_id;

const PANEL: &str = "background: #f5f5f5; padding: 15px; border-radius: 5px; margin: 20px 0;";
const REPLY_PANEL: &str = "background: #e3f2fd; padding: 15px; border-radius: 5px; margin: 20px 0;";
const SIGNATURE: &str = "<p>Best regards,<br>Support Team</p>";

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub(super) fn render(email: &TicketEmail) -> OutboundEmail {
    let reference = short_id(&email.ticket_id);
    let name = escape_html(&email.customer_name);
    let subject = escape_html(&email.subject);
    let message = escape_html(&email.message);

    let (mail_subject, html) = match &email.kind {
        NotificationKind::Receipt => (
            format!("Support Ticket Received - #{}", reference),
            format!(
                "<h1>Thank you for contacting us, {name}!</h1>\
                 <p>We have received your support ticket and will get back to you as soon as possible.</p>\
                 <div style=\"{PANEL}\">\
                 <p><strong>Subject:</strong> {subject}</p>\
                 <p><strong>Your Message:</strong></p>\
                 <p>{message}</p>\
                 </div>\
                 <p>Ticket ID: #{reference}</p>\
                 <p>We typically respond within 24 hours.</p>\
                 {SIGNATURE}"
            ),
        ),
        NotificationKind::Reply { reply_message } => {
            let reply = escape_html(reply_message);
            (
                format!("Re: {} - Ticket #{}", email.subject, reference),
                format!(
                    "<h1>Support Team Reply</h1>\
                     <p>Hello {name},</p>\
                     <p>Our support team has replied to your ticket:</p>\
                     <div style=\"{PANEL}\">\
                     <p><strong>Your original message:</strong></p>\
                     <p>{message}</p>\
                     </div>\
                     <div style=\"{REPLY_PANEL}\">\
                     <p><strong>Support Team Response:</strong></p>\
                     <p>{reply}</p>\
                     </div>\
                     <p>If you have any further questions, feel free to reach out.</p>\
                     {SIGNATURE}"
                ),
            )
        }
        NotificationKind::StatusUpdate { new_status } => {
            let explanation = new_status.customer_message();
            (
                format!("Ticket Status Updated - #{}", reference),
                format!(
                    "<h1>Ticket Status Update</h1>\
                     <p>Hello {name},</p>\
                     <p>Your support ticket status has been updated to: <strong>{new_status}</strong></p>\
                     <div style=\"{PANEL}\">\
                     <p><strong>Ticket ID:</strong> #{reference}</p>\
                     <p><strong>Subject:</strong> {subject}</p>\
                     <p><strong>Status:</strong> {new_status}</p>\
                     <p>{explanation}</p>\
                     </div>\
                     <p>If you have any questions, feel free to reach out.</p>\
                     {SIGNATURE}"
                ),
            )
        }
    };

    OutboundEmail {
        to: email.to.clone(),
        subject: mail_subject,
        html,
    }
}
