//! Keyboard builders — `reply_markup` payloads for the Bot API.

use serde_json::{Value, json};

use crate::telegram::action::{Action, StatusFilter};
use crate::texts;

/// Main reply keyboard. Operators get an extra panel row.
pub fn main_menu(is_operator: bool) -> Value {
    let mut rows = vec![
        json!([
            { "text": texts::BTN_FIND_TOUR },
            { "text": texts::BTN_MY_REQUESTS },
        ]),
        json!([
            { "text": texts::BTN_ABOUT },
            { "text": texts::BTN_CONTACT },
        ]),
        json!([
            { "text": texts::BTN_REPEAT },
            { "text": texts::BTN_FAQ },
        ]),
    ];
    if is_operator {
        rows.push(json!([{ "text": texts::BTN_OPERATOR_PANEL }]));
    }
    json!({ "keyboard": rows, "resize_keyboard": true })
}

fn button(text: &str, action: Action) -> Value {
    json!({ "text": text, "callback_data": action.to_string() })
}

/// Operator panel — the five status filters.
pub fn operator_panel() -> Value {
    json!({
        "inline_keyboard": [
            [
                button("🆕 New requests", Action::ListRequests(StatusFilter::New)),
                button("⏳ In review", Action::ListRequests(StatusFilter::InReview)),
            ],
            [
                button("✅ Approved", Action::ListRequests(StatusFilter::Approved)),
                button("❌ Rejected", Action::ListRequests(StatusFilter::Rejected)),
            ],
            [
                button("📊 All requests", Action::ListRequests(StatusFilter::All)),
            ],
        ]
    })
}

/// Single open button attached to each listed request.
pub fn request_item(request_id: i64) -> Value {
    json!({
        "inline_keyboard": [[
            button("🔍 Open request", Action::Open(request_id)),
        ]]
    })
}

/// Approve/reject buttons on an opened request.
pub fn request_manage(request_id: i64) -> Value {
    json!({
        "inline_keyboard": [[
            button("✅ Approve", Action::Approve(request_id)),
            button("❌ Reject", Action::Reject(request_id)),
        ]]
    })
}

/// Submit/restart buttons on the intake summary.
pub fn intake_confirm() -> Value {
    json!({
        "inline_keyboard": [
            [button("📨 Send the request", Action::SubmitIntake)],
            [button("🔁 Start over", Action::RestartIntake)],
        ]
    })
}

/// Follow-up buttons on an approve/reject owner notification.
pub fn after_status() -> Value {
    json!({
        "inline_keyboard": [
            [button("🏖 New request", Action::NewRequest)],
            [button("🆘 Contact an operator", Action::ContactOperator)],
        ]
    })
}

/// Confirm/cancel buttons on the repeat preview.
pub fn repeat_confirm(request_id: i64) -> Value {
    json!({
        "inline_keyboard": [
            [button("📨 Repeat this request", Action::RepeatRequest(request_id))],
            [button("❌ Cancel", Action::CancelRepeat)],
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn callback_tokens(keyboard: &Value) -> Vec<String> {
        keyboard["inline_keyboard"]
            .as_array()
            .unwrap()
            .iter()
            .flat_map(|row| row.as_array().unwrap())
            .map(|b| b["callback_data"].as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn operator_panel_has_five_filters() {
        let tokens = callback_tokens(&operator_panel());
        assert_eq!(
            tokens,
            vec![
                "adm:list:new",
                "adm:list:in_review",
                "adm:list:approved",
                "adm:list:rejected",
                "adm:list:all",
            ]
        );
    }

    #[test]
    fn manage_keyboard_pins_the_request_id() {
        let tokens = callback_tokens(&request_manage(42));
        assert_eq!(tokens, vec!["adm:approve:42", "adm:reject:42"]);
    }

    #[test]
    fn confirm_keyboard_offers_send_and_restart() {
        let tokens = callback_tokens(&intake_confirm());
        assert_eq!(tokens, vec!["app:send", "app:restart"]);
    }

    #[test]
    fn repeat_keyboard_offers_send_and_cancel() {
        let tokens = callback_tokens(&repeat_confirm(7));
        assert_eq!(tokens, vec!["rep:send:7", "rep:cancel"]);
    }

    #[test]
    fn main_menu_panel_row_is_operator_only() {
        let user_menu = main_menu(false);
        let operator_menu = main_menu(true);
        assert_eq!(user_menu["keyboard"].as_array().unwrap().len(), 3);
        assert_eq!(operator_menu["keyboard"].as_array().unwrap().len(), 4);
    }
}
