//! User-visible texts — prompts, menus, summaries, and notifications.
//!
//! HTML markup (Telegram parse_mode HTML); the client falls back to plain
//! text if a send with markup is refused.

use crate::store::{IntakeFields, Request};
use crate::telegram::Conversant;

// ── Main menu button labels ─────────────────────────────────────────

pub const BTN_FIND_TOUR: &str = "🏖 Find a tour";
pub const BTN_MY_REQUESTS: &str = "📋 My requests";
pub const BTN_ABOUT: &str = "ℹ️ About us";
pub const BTN_CONTACT: &str = "🆘 Contact an operator";
pub const BTN_REPEAT: &str = "🔁 Repeat last request";
pub const BTN_FAQ: &str = "❓ FAQ";
pub const BTN_OPERATOR_PANEL: &str = "🛠 Operator panel";

// ── Fixed notices ───────────────────────────────────────────────────

pub const GREETING: &str = "👋 <b>Welcome to the Tourdesk travel bot!</b>\n\n\
    Here you can send a tour request, check the status of your requests, \
    and reach an operator.";

pub const ABOUT: &str = "🌍 <b>Tourdesk — trips tailored to your wishes.</b>\n\n\
    We will pick a tour to match your budget, hotel preferences, and dates.\n\
    Fill in a request and wait for an operator to reply.";

pub const FAQ: &str = "❓ <b>Frequently asked questions</b>\n\n\
    <b>1. How fast does an operator reply?</b>\n\
    Usually within 15–60 minutes during working hours.\n\n\
    <b>2. When do I pay for the tour?</b>\n\
    After the option is agreed and the booking is confirmed.\n\n\
    <b>3. Do I need a visa?</b>\n\
    Depends on the destination — the operator will advise.\n\n\
    <b>4. Which documents are needed?</b>\n\
    A passport, and sometimes extra documents for a visa.";

pub const CONTACT_OPERATOR: &str = "🆘 <b>Reach an operator</b>\n\n\
    Describe your question in one message. We will see it and reply to you \
    in this chat.";

pub const PROFILE_NOT_FOUND: &str = "Profile not found. Press /start.";

pub const NO_REQUESTS_YET: &str = "You have no requests yet.\n\
    Press \"🏖 Find a tour\" to send your first one.";

pub const NOTHING_TO_REPEAT: &str = "No prior request to repeat.\n\
    Send your first one via \"🏖 Find a tour\".";

pub const REQUEST_NOT_FOUND: &str = "Request not found.";

pub const ACCESS_DENIED: &str = "No access.";

pub const OPERATOR_PANEL: &str = "🛠 <b>Tourdesk operator panel</b>\n\n\
    Choose which requests to look at.";

pub const REPEAT_CANCELLED: &str = "Repeat cancelled.";

pub const FORWARDED_TO_OPERATORS: &str = "Your message was passed to an operator. \
    We will reply as soon as we can.";

pub const NOTHING_TO_SUBMIT: &str = "Nothing to submit.";

pub const RESTARTING: &str = "Starting over.";

pub const INTERNAL_ERROR: &str = "Something went wrong. Please try again.";

/// Default reason stored when a reject comment is left empty.
pub const DEFAULT_REJECT_REASON: &str = "Rejected without a stated reason.";

// ── Intake step prompts ─────────────────────────────────────────────

pub const PROMPT_DESTINATION: &str = "✈️ <b>Step 1 of 7.</b>\n\n\
    Which country or city would you like to visit?";
pub const PROMPT_DATES: &str = "📅 <b>Step 2 of 7.</b>\n\n\
    When are you planning the trip? Give approximate dates or a period.";
pub const PROMPT_ADULTS: &str = "👥 <b>Step 3 of 7.</b>\n\n\
    How many adults are travelling? (enter a number)";
pub const PROMPT_CHILDREN: &str = "👨‍👩‍👧 <b>Step 4 of 7.</b>\n\n\
    How many children are travelling? Enter 0 if none.";
pub const PROMPT_BUDGET: &str = "💵 <b>Step 5 of 7.</b>\n\n\
    What is your approximate budget? Feel free to name a currency, e.g.\n\
    <i>up to 1500 USD for two</i>.";
pub const PROMPT_WISHES: &str = "🏨 <b>Step 6 of 7.</b>\n\n\
    Your wishes for the hotel and the tour:\n\
    • hotel rating\n\
    • board type\n\
    • anything important (first line, quiet area, etc.)\n\n\
    If you have no special wishes, write \"none\".";
pub const PROMPT_CONTACT: &str = "📞 <b>Step 7 of 7.</b>\n\n\
    How can we reach you? A phone number, @username, or e-mail.";

// ── Validation messages ─────────────────────────────────────────────

pub const INVALID_EMPTY: &str = "Please send a non-empty answer.";
pub const INVALID_ADULTS: &str = "Please enter a positive number.";
pub const INVALID_CHILDREN: &str = "Please enter 0 or a positive number.";

// ── Rendering helpers ───────────────────────────────────────────────

fn handle(username: Option<&str>) -> String {
    match username {
        Some(u) => format!("@{u}"),
        None => "no_username".to_string(),
    }
}

/// Summary shown at the confirm step.
pub fn intake_summary(fields: &IntakeFields) -> String {
    format!(
        "📝 <b>Review your request:</b>\n\n\
         <b>Destination:</b> {}\n\
         <b>Dates:</b> {}\n\
         <b>Adults:</b> {}\n\
         <b>Children:</b> {}\n\
         <b>Budget:</b> {}\n\
         <b>Wishes:</b> {}\n\
         <b>Contact:</b> {}\n\n\
         If everything is correct, send the request to an operator.",
        fields.destination,
        fields.dates,
        fields.adults,
        fields.children,
        fields.budget,
        fields.wishes,
        fields.contact,
    )
}

/// Confirmation sent to the owner right after submit.
pub fn submitted_notice(request_id: i64) -> String {
    format!(
        "✅ <b>Request #{request_id} was sent to an operator.</b>\n\n\
         We will get back to you shortly."
    )
}

/// Operator notification about a freshly submitted request.
pub fn new_request_notice(request_id: i64, who: &Conversant, fields: &IntakeFields) -> String {
    format!(
        "📩 <b>New request #{request_id}</b>\n\
         From: {} (ID {})\n\n\
         Destination: {}\n\
         Dates: {}\n\
         Adults: {}, children: {}\n\
         Budget: {}\n\
         Wishes: {}\n\
         Contact: {}",
        handle(who.username.as_deref()),
        who.chat_id,
        fields.destination,
        fields.dates,
        fields.adults,
        fields.children,
        fields.budget,
        fields.wishes,
        fields.contact,
    )
}

/// Operator notification about a repeated request.
pub fn repeated_request_notice(new_id: i64, source: &Request) -> String {
    format!(
        "📩 <b>New repeated request #{new_id}</b>\n\
         (based on request #{})\n\
         From: {} (ID {})\n\n\
         Destination: {}\n\
         Dates: {}\n\
         Adults: {}, children: {}\n\
         Budget: {}\n\
         Wishes: {}\n\
         Contact: {}",
        source.id,
        handle(source.username.as_deref()),
        source.chat_id,
        source.fields.destination,
        source.fields.dates,
        source.fields.adults,
        source.fields.children,
        source.fields.budget,
        source.fields.wishes,
        source.fields.contact,
    )
}

/// Confirmation to the owner after a repeat.
pub fn repeated_notice(new_id: i64, source_id: i64) -> String {
    format!(
        "✅ Request #{new_id} was sent again.\n\
         (based on request #{source_id})"
    )
}

/// Preview of the latest request before repeating it.
pub fn repeat_preview(request: &Request) -> String {
    format!(
        "📎 <b>Latest request #{}</b> ({})\n\n\
         <b>Destination:</b> {}\n\
         <b>Dates:</b> {}\n\
         <b>Adults:</b> {}\n\
         <b>Children:</b> {}\n\
         <b>Budget:</b> {}\n\
         <b>Wishes:</b> {}\n\
         <b>Contact:</b> {}\n\n\
         Send the same request again?",
        request.id,
        request.status.label(),
        request.fields.destination,
        request.fields.dates,
        request.fields.adults,
        request.fields.children,
        request.fields.budget,
        request.fields.wishes,
        request.fields.contact,
    )
}

/// One line of a user's own request listing.
pub fn my_request_line(request: &Request) -> String {
    format!(
        "• #{} — {}\n  Destination: {}\n  Dates: {}\n  Updated: {}\n",
        request.id,
        request.status.label(),
        request.fields.destination,
        request.fields.dates,
        request.updated_at.format("%Y-%m-%d %H:%M"),
    )
}

/// One item of an operator listing.
pub fn request_list_item(request: &Request) -> String {
    format!(
        "#{} — {}\n\
         Client: {} (ID {})\n\
         Destination: {}\n\
         Dates: {}\n\
         Created: {}",
        request.id,
        request.status.label(),
        handle(request.username.as_deref()),
        request.chat_id,
        request.fields.destination,
        request.fields.dates,
        request.created_at.format("%Y-%m-%d %H:%M"),
    )
}

/// Full request card shown to an operator on open.
pub fn request_full(request: &Request) -> String {
    format!(
        "📝 <b>Request #{}</b> — {}\n\n\
         <b>Client:</b> {} (ID {})\n\
         <b>Name:</b> {}\n\
         <b>Created:</b> {}\n\
         <b>Updated:</b> {}\n\n\
         <b>Destination:</b> {}\n\
         <b>Dates:</b> {}\n\
         <b>Adults:</b> {}\n\
         <b>Children:</b> {}\n\
         <b>Budget:</b> {}\n\
         <b>Wishes:</b> {}\n\
         <b>Contact:</b> {}\n\n\
         <b>Operator comment:</b> {}",
        request.id,
        request.status.label(),
        handle(request.username.as_deref()),
        request.chat_id,
        request.first_name.as_deref().unwrap_or("-"),
        request.created_at.format("%Y-%m-%d %H:%M"),
        request.updated_at.format("%Y-%m-%d %H:%M"),
        request.fields.destination,
        request.fields.dates,
        request.fields.adults,
        request.fields.children,
        request.fields.budget,
        request.fields.wishes,
        request.fields.contact,
        request.operator_comment.as_deref().unwrap_or("—"),
    )
}

/// Prompt sent to an operator entering an approve comment.
pub fn approve_comment_prompt(request_id: i64) -> String {
    format!(
        "Approving request #{request_id}.\n\n\
         Enter a comment for the client (tour details, terms, etc.). \
         If you have no comment, send \"-\"."
    )
}

/// Prompt sent to an operator entering a reject reason.
pub fn reject_comment_prompt(request_id: i64) -> String {
    format!(
        "Rejecting request #{request_id}.\n\n\
         State the reason (e.g. no availability for the dates, \
         budget too low, etc.)."
    )
}

/// Confirmation to the operator after an approve.
pub fn approved_operator_notice(request_id: i64) -> String {
    format!("Request #{request_id} is marked as <b>approved</b>.")
}

/// Confirmation to the operator after a reject.
pub fn rejected_operator_notice(request_id: i64) -> String {
    format!("Request #{request_id} is marked as <b>rejected</b>.")
}

/// Owner notification after an approve.
pub fn approved_owner_notice(request: &Request, comment: &str) -> String {
    let mut text = format!(
        "✅ <b>Your request #{} was approved by an operator.</b>\n\n\
         Destination: {}\n\
         Dates: {}\n\n",
        request.id, request.fields.destination, request.fields.dates,
    );
    if comment.is_empty() {
        text.push_str("We will contact you to settle the details.");
    } else {
        text.push_str(&format!("Operator comment:\n{comment}"));
    }
    text
}

/// Owner notification after a reject.
pub fn rejected_owner_notice(request_id: i64, reason: &str) -> String {
    format!(
        "❌ <b>Your request #{request_id} was rejected.</b>\n\n\
         Reason:\n{reason}"
    )
}

/// A free-text message forwarded from a customer to the operators.
pub fn forwarded_message(who: &Conversant, text: &str) -> String {
    format!(
        "📨 Message from {} (ID {}):\n\n{}",
        handle(who.username.as_deref()),
        who.chat_id,
        text,
    )
}

/// Title line for an operator listing.
pub fn listing_title(title: &str, empty: bool) -> String {
    if empty {
        format!("{title}\n\nNo requests in this category.")
    } else {
        title.to_string()
    }
}
