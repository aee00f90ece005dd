use reading_core::model::OptionLetter;
use reading_core::time::fixed_now;
use services::{AppServices, Clock, SessionEvent};

const QUESTIONS: &str = r#"{
    "title": "Coral Reefs",
    "passage": ["Reefs grow slowly.", "They shelter many species."],
    "questions": [
        {"id": 1, "type": "vocabulary", "text": "The word \"shelter\" is closest in meaning to",
         "options": ["A. protect", "B. expose", "C. feed", "D. move"], "answer": "A",
         "explanation": "Shelter means protect."},
        {"id": 2, "type": "inference", "text": "What can be inferred from paragraph 1?",
         "options": ["A. fast", "B. slow", "C. none", "D. all"], "answer": "B"}
    ]
}"#;

#[tokio::test]
async fn sqlite_backed_services_round_trip() {
    let path = std::env::temp_dir().join(format!("reading_flow_{}.json", std::process::id()));
    tokio::fs::write(&path, QUESTIONS).await.unwrap();

    let services = AppServices::new_sqlite(
        "sqlite:file:memdb_services_flow?mode=memory&cache=shared",
        &path,
        Clock::fixed(fixed_now()),
        1_080,
    )
    .await
    .expect("services");

    let loop_svc = services.session_loop();
    let mut session = loop_svc.start_session().await.unwrap();
    assert_eq!(session.title(), "Coral Reefs");

    let first = session.view();
    assert_eq!(first.focus.paragraphs, Some(vec![1]));

    let choice = OptionLetter::from_char('A').unwrap();
    loop_svc
        .apply(&mut session, SessionEvent::Select(choice))
        .await
        .unwrap();
    loop_svc.submit(&mut session).await.unwrap();

    let report = services.diagnostics().load_report().await.unwrap();
    assert_eq!(report.correct_count, 1);
    assert_eq!(report.total_count, 2);
    assert_eq!(report.estimate.score, 3);

    tokio::fs::remove_file(&path).await.unwrap();
}
