mod common;

use common::{after_greeting, session, station, PROMPT};

#[tokio::test]
async fn send_prompts_for_missing_fields() {
    let st = station();
    let input = "send\n\nn1abc\nField day\nLine one\n\nLine three\n /EX \nbye\n";
    let out = session(&st, "N0CALL", input).await;
    assert_eq!(
        after_greeting(&out),
        format!(
            "{p}\r\nCallsign:\r\nCallsign:\r\nSubject:\r\n\
             Message - end with /ex on a single line:\r\nMessage saved!\r\n{p}\r\nBye!\r\n",
            p = PROMPT
        )
    );
    let msg = st.store().get_message(1).unwrap().unwrap();
    assert_eq!(msg.recipient, "N1ABC");
    assert_eq!(msg.subject, "Field day");
    assert_eq!(msg.body, "Line one\n\nLine three\n");
    assert!(!msg.is_private);
}

#[tokio::test]
async fn send_only_prompts_for_what_is_missing() {
    let st = station();
    let out = session(&st, "N0CALL", "s N1ABC --subject \"Net tonight\"\nSee you there\n/ex\nbye\n").await;
    assert!(!out.contains("Callsign:"));
    assert!(!out.contains("Subject:"));
    assert!(out.contains("Message saved!"));
    let msg = st.store().get_message(1).unwrap().unwrap();
    assert_eq!(msg.subject, "Net tonight");
    assert_eq!(msg.body, "See you there\n");
}

#[tokio::test]
async fn blank_subject_flag_is_prompted() {
    let st = station();
    let out = session(&st, "N0CALL", "sp N1ABC --subject \"\" --message=hello\nPing\nbye\n").await;
    assert!(out.contains("Subject:\r\n"));
    let msg = st.store().get_message(1).unwrap().unwrap();
    assert_eq!(msg.subject, "Ping");
    assert_eq!(msg.body, "hello");
    assert!(msg.is_private);
}

#[tokio::test]
async fn invalid_recipient_is_rejected_before_anything_is_stored() {
    let st = station();
    let out = session(&st, "N0CALL", "send N1@BC --subject x --message y\nbye\n").await;
    assert!(out.contains("Callsign contains invalid characters: @.\r\n"));
    assert!(out.ends_with("Bye!\r\n"));
    assert_eq!(st.store().count_messages().unwrap(), 0);
}

#[tokio::test]
async fn disconnect_mid_compose_stores_nothing() {
    let st = station();
    let out = session(&st, "N0CALL", "send N1ABC\nSubject line\nbody without sentinel\n").await;
    assert!(out.ends_with("Message - end with /ex on a single line:\r\n"));
    assert_eq!(st.store().count_messages().unwrap(), 0);
}

#[tokio::test]
async fn sender_is_the_calling_station() {
    let st = station();
    session(&st, "kd9xyz", "send w1aw --subject hi --message there\n").await;
    let msg = st.store().get_message(1).unwrap().unwrap();
    assert_eq!(msg.sender, "KD9XYZ");
    assert_eq!(msg.recipient, "W1AW");
}
