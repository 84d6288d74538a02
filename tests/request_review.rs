//! Operator review workflow: listings, open, approve/reject, repeat, and
//! access gating.

mod common;

use common::*;

async fn submitted_app() -> (tourdesk::app::App, std::sync::Arc<RecordingOutbound>) {
    let (app, outbound) = test_app().await;
    fill_questionnaire(&app, CUSTOMER).await;
    app.handle_event(action_event(CUSTOMER, "app:send")).await;
    (app, outbound)
}

#[tokio::test]
async fn open_moves_a_new_request_into_review() {
    let (app, outbound) = submitted_app().await;

    app.handle_event(action_event(OPERATOR, "adm:open:1")).await;

    let card = outbound.last_for(OPERATOR).await;
    assert!(card.text.contains("Request #1"));
    assert!(card.text.contains("In review"));
    assert_eq!(
        outbound.last_tokens_for(OPERATOR).await,
        vec!["adm:approve:1", "adm:reject:1"]
    );
}

#[tokio::test]
async fn approve_with_comment_notifies_the_owner() {
    let (app, outbound) = submitted_app().await;
    app.handle_event(action_event(OPERATOR, "adm:open:1")).await;

    app.handle_event(action_event(OPERATOR, "adm:approve:1")).await;
    let prompt = outbound.last_for(OPERATOR).await;
    assert!(prompt.text.contains("Approving request #1"));

    app.handle_event(text_event(OPERATOR, "hotel confirmed, 1800 USD")).await;

    let operator_texts = outbound.texts_for(OPERATOR).await;
    assert!(operator_texts.last().unwrap().contains("approved"));

    let owner = outbound.last_for(CUSTOMER).await;
    assert!(owner.text.contains("approved"));
    assert!(owner.text.contains("hotel confirmed, 1800 USD"));
    assert_eq!(
        outbound.last_tokens_for(CUSTOMER).await,
        vec!["user:newapp", "user:contact"]
    );

    // The approve/reject buttons were retracted
    assert_eq!(outbound.cleared.lock().await.len(), 2); // submit + manage
}

#[tokio::test]
async fn approve_with_dash_sends_the_no_comment_variant() {
    let (app, outbound) = submitted_app().await;
    app.handle_event(action_event(OPERATOR, "adm:approve:1")).await;
    app.handle_event(text_event(OPERATOR, "-")).await;

    let owner = outbound.last_for(CUSTOMER).await;
    assert!(owner.text.contains("We will contact you"));
}

#[tokio::test]
async fn reject_reason_reaches_the_owner() {
    let (app, outbound) = submitted_app().await;
    app.handle_event(action_event(OPERATOR, "adm:reject:1")).await;
    app.handle_event(text_event(OPERATOR, "no availability for the dates")).await;

    let owner = outbound.last_for(CUSTOMER).await;
    assert!(owner.text.contains("rejected"));
    assert!(owner.text.contains("no availability for the dates"));
}

#[tokio::test]
async fn non_operator_tokens_are_denied_without_state_change() {
    let (app, outbound) = submitted_app().await;

    app.handle_event(action_event(CUSTOMER, "adm:approve:1")).await;
    app.handle_event(action_event(CUSTOMER, "adm:list:all")).await;

    // Denial came back on the callback, not as a message
    let answered = outbound.answered.lock().await;
    assert!(
        answered
            .iter()
            .any(|(_, text)| text.as_deref() == Some("No access.")),
        "expected a denial alert"
    );
    drop(answered);

    // The request is untouched: an operator opening it still sees `new`
    // auto-promoted, not an approved state
    app.handle_event(action_event(OPERATOR, "adm:open:1")).await;
    let card = outbound.last_for(OPERATOR).await;
    assert!(card.text.contains("In review"));
}

#[tokio::test]
async fn operator_panel_lists_by_filter() {
    let (app, outbound) = submitted_app().await;

    app.handle_event(text_event(OPERATOR, "🛠 Operator panel")).await;
    let tokens = outbound.last_tokens_for(OPERATOR).await;
    assert_eq!(tokens.len(), 5);
    assert!(tokens.contains(&"adm:list:new".to_string()));

    app.handle_event(action_event(OPERATOR, "adm:list:new")).await;
    let last = outbound.last_for(OPERATOR).await;
    assert!(last.text.contains("#1"));
    assert_eq!(outbound.last_tokens_for(OPERATOR).await, vec!["adm:open:1"]);

    // Approved filter is empty so far
    app.handle_event(action_event(OPERATOR, "adm:list:approved")).await;
    let last = outbound.last_for(OPERATOR).await;
    assert!(last.text.contains("No requests in this category"));
}

#[tokio::test]
async fn terminal_request_card_has_no_manage_buttons() {
    let (app, outbound) = submitted_app().await;
    app.handle_event(action_event(OPERATOR, "adm:approve:1")).await;
    app.handle_event(text_event(OPERATOR, "-")).await;

    app.handle_event(action_event(OPERATOR, "adm:open:1")).await;
    let card = outbound.last_for(OPERATOR).await;
    assert!(card.text.contains("Approved"));
    assert!(card.keyboard.is_none());
}

#[tokio::test]
async fn repeat_preview_and_confirm_clone_the_request() {
    let (app, outbound) = submitted_app().await;
    app.handle_event(action_event(OPERATOR, "adm:reject:1")).await;
    app.handle_event(text_event(OPERATOR, "sold out")).await;

    app.handle_event(text_event(CUSTOMER, "🔁 Repeat last request")).await;
    let preview = outbound.last_for(CUSTOMER).await;
    assert!(preview.text.contains("Latest request #1"));
    assert_eq!(
        outbound.last_tokens_for(CUSTOMER).await,
        vec!["rep:send:1", "rep:cancel"]
    );

    let operator_count = outbound.texts_for(OPERATOR).await.len();
    app.handle_event(action_event(CUSTOMER, "rep:send:1")).await;

    let texts = outbound.texts_for(CUSTOMER).await;
    assert!(texts.last().unwrap().contains("Request #2 was sent again"));

    // Operators got the repeated summary; the clone starts over at `new`
    let operator_texts = outbound.texts_for(OPERATOR).await;
    assert_eq!(operator_texts.len(), operator_count + 1);
    assert!(operator_texts.last().unwrap().contains("repeated request #2"));

    app.handle_event(action_event(OPERATOR, "adm:open:2")).await;
    let card = outbound.last_for(OPERATOR).await;
    assert!(card.text.contains("In review"));
    assert!(card.text.contains("Lisbon"));
}

#[tokio::test]
async fn repeat_with_no_history_says_so() {
    let (app, outbound) = test_app().await;
    app.handle_event(text_event(CUSTOMER, "/start")).await;
    app.handle_event(text_event(CUSTOMER, "🔁 Repeat last request")).await;

    let texts = outbound.texts_for(CUSTOMER).await;
    assert!(texts.last().unwrap().contains("No prior request"));
}

#[tokio::test]
async fn repeat_cancel_leaves_everything_alone() {
    let (app, outbound) = submitted_app().await;
    app.handle_event(text_event(CUSTOMER, "🔁 Repeat last request")).await;
    let operator_count = outbound.texts_for(OPERATOR).await.len();

    app.handle_event(action_event(CUSTOMER, "rep:cancel")).await;

    let texts = outbound.texts_for(CUSTOMER).await;
    assert!(texts.last().unwrap().contains("Repeat cancelled"));
    assert_eq!(outbound.texts_for(OPERATOR).await.len(), operator_count);
}

#[tokio::test]
async fn malformed_tokens_are_acknowledged_and_dropped() {
    let (app, outbound) = submitted_app().await;
    let sent_before = outbound.sent.lock().await.len();
    let answered_before = outbound.answered.lock().await.len();

    app.handle_event(action_event(OPERATOR, "adm:open:NaN")).await;
    app.handle_event(action_event(OPERATOR, "bogus:stuff")).await;
    app.handle_event(action_event(OPERATOR, "")).await;

    assert_eq!(outbound.sent.lock().await.len(), sent_before);
    assert_eq!(outbound.answered.lock().await.len(), answered_before + 3);
}

#[tokio::test]
async fn operators_are_customers_too() {
    let (app, outbound) = test_app().await;
    fill_questionnaire(&app, OPERATOR).await;
    app.handle_event(action_event(OPERATOR, "app:send")).await;

    // The submitting operator also receives the fan-out, plus the
    // submitted notice
    let texts = outbound.texts_for(OPERATOR).await;
    assert!(texts.iter().any(|t| t.contains("New request #1")));
    assert!(texts.iter().any(|t| t.contains("was sent to an operator")));
}
