//! End-to-end intake: questionnaire, submission, restart, and the idle
//! fallback.

mod common;

use common::*;

#[tokio::test]
async fn completed_questionnaire_reaches_the_operators() {
    let (app, outbound) = test_app().await;

    fill_questionnaire(&app, CUSTOMER).await;

    // The confirm summary carries the submit/restart buttons
    let tokens = outbound.last_tokens_for(CUSTOMER).await;
    assert_eq!(tokens, vec!["app:send", "app:restart"]);

    app.handle_event(action_event(CUSTOMER, "app:send")).await;

    let customer_texts = outbound.texts_for(CUSTOMER).await;
    assert!(
        customer_texts.last().unwrap().contains("#1"),
        "customer should see the submitted notice"
    );

    // Both operators got the summary with an open shortcut
    for operator in [OPERATOR, SECOND_OPERATOR] {
        let last = outbound.last_for(operator).await;
        assert!(last.text.contains("New request #1"));
        assert!(last.text.contains("Lisbon"));
        assert_eq!(outbound.last_tokens_for(operator).await, vec!["adm:open:1"]);
    }
}

#[tokio::test]
async fn invalid_counts_reprompt_without_advancing() {
    let (app, outbound) = test_app().await;
    app.handle_event(text_event(CUSTOMER, "🏖 Find a tour")).await;
    app.handle_event(text_event(CUSTOMER, "Lisbon")).await;
    app.handle_event(text_event(CUSTOMER, "July")).await;

    app.handle_event(text_event(CUSTOMER, "zero")).await;
    let texts = outbound.texts_for(CUSTOMER).await;
    assert!(texts.last().unwrap().contains("positive number"));

    app.handle_event(text_event(CUSTOMER, "2")).await;
    let texts = outbound.texts_for(CUSTOMER).await;
    assert!(
        texts.last().unwrap().contains("children"),
        "a valid count should move on to the children step"
    );
}

#[tokio::test]
async fn second_submit_press_creates_no_second_request() {
    let (app, outbound) = test_app().await;
    fill_questionnaire(&app, CUSTOMER).await;

    app.handle_event(action_event(CUSTOMER, "app:send")).await;
    let operator_count = outbound.texts_for(OPERATOR).await.len();

    app.handle_event(action_event(CUSTOMER, "app:send")).await;

    let texts = outbound.texts_for(CUSTOMER).await;
    assert!(texts.last().unwrap().contains("Nothing to submit"));
    assert_eq!(
        outbound.texts_for(OPERATOR).await.len(),
        operator_count,
        "no further operator notification"
    );
}

#[tokio::test]
async fn restart_button_starts_the_questionnaire_over() {
    let (app, outbound) = test_app().await;
    fill_questionnaire(&app, CUSTOMER).await;

    app.handle_event(action_event(CUSTOMER, "app:restart")).await;
    let texts = outbound.texts_for(CUSTOMER).await;
    assert!(texts.last().unwrap().contains("Step 1 of 7"));

    // The old draft is gone: answers run from the beginning again
    app.handle_event(text_event(CUSTOMER, "Porto")).await;
    let texts = outbound.texts_for(CUSTOMER).await;
    assert!(texts.last().unwrap().contains("Step 2 of 7"));
}

#[tokio::test]
async fn idle_text_is_forwarded_to_operators() {
    let (app, outbound) = test_app().await;

    app.handle_event(text_event(CUSTOMER, "do you have anything in Greece?"))
        .await;

    for operator in [OPERATOR, SECOND_OPERATOR] {
        let last = outbound.last_for(operator).await;
        assert!(last.text.contains("anything in Greece"));
        assert!(last.text.contains(&CUSTOMER.to_string()));
    }
    let texts = outbound.texts_for(CUSTOMER).await;
    assert!(texts.last().unwrap().contains("passed to an operator"));
}

#[tokio::test]
async fn menu_texts_answer_without_forwarding() {
    let (app, outbound) = test_app().await;

    app.handle_event(text_event(CUSTOMER, "❓ FAQ")).await;
    app.handle_event(text_event(CUSTOMER, "ℹ️ About us")).await;

    assert!(outbound.texts_for(OPERATOR).await.is_empty());
    let texts = outbound.texts_for(CUSTOMER).await;
    assert!(texts[0].contains("Frequently asked questions"));
    assert!(texts[1].contains("Tourdesk"));
}

#[tokio::test]
async fn start_mid_questionnaire_keeps_the_draft() {
    let (app, outbound) = test_app().await;
    app.handle_event(text_event(CUSTOMER, "🏖 Find a tour")).await;
    app.handle_event(text_event(CUSTOMER, "Lisbon")).await;

    app.handle_event(text_event(CUSTOMER, "/start")).await;
    let texts = outbound.texts_for(CUSTOMER).await;
    assert!(texts.last().unwrap().contains("Welcome"));

    // Still at the dates step
    app.handle_event(text_event(CUSTOMER, "July")).await;
    let texts = outbound.texts_for(CUSTOMER).await;
    assert!(texts.last().unwrap().contains("Step 3 of 7"));
}

#[tokio::test]
async fn my_requests_lists_own_submissions_only() {
    let (app, outbound) = test_app().await;
    fill_questionnaire(&app, CUSTOMER).await;
    app.handle_event(action_event(CUSTOMER, "app:send")).await;

    app.handle_event(text_event(CUSTOMER, "📋 My requests")).await;
    let texts = outbound.texts_for(CUSTOMER).await;
    let listing = texts.last().unwrap();
    assert!(listing.contains("#1"));
    assert!(listing.contains("Lisbon"));

    // A stranger with a profile but no requests sees the empty notice
    app.handle_event(text_event(77, "/start")).await;
    app.handle_event(text_event(77, "📋 My requests")).await;
    let texts = outbound.texts_for(77).await;
    assert!(texts.last().unwrap().contains("no requests yet"));
}
