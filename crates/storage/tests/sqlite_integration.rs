use std::sync::Arc;

use chrono::Duration;
use reading_core::analyze;
use reading_core::model::{
    AnswerKey, AnswerRecord, AttemptId, OptionLetter, QuestionDraft, QuestionId, QuestionSet,
    QuestionSetDraft, QuestionType, QuizResult, TerminationReason,
};
use reading_core::time::fixed_now;
use storage::repository::{
    AttemptStore, InMemoryRepository, QuestionSource, SnapshotKey, SnapshotRepository, Storage,
};
use storage::sqlite::SqliteRepository;

fn letter(c: char) -> OptionLetter {
    OptionLetter::from_char(c).unwrap()
}

fn build_set() -> QuestionSet {
    let questions = (1..=3)
        .map(|id| QuestionDraft {
            id: QuestionId::new(id),
            kind: if id == 3 {
                QuestionType::Inference
            } else {
                QuestionType::Vocabulary
            },
            text: format!("Question {id}"),
            options: vec!["A. one".into(), "B. two".into(), "C. three".into()],
            explanation: Some("Because.".into()),
            answer: AnswerKey::Single(letter('B')),
        })
        .collect();
    QuestionSetDraft {
        title: "Rivers".into(),
        passage: vec!["Water flows.".into()],
        questions,
    }
    .validate()
    .unwrap()
}

fn build_result(set: &QuestionSet) -> QuizResult {
    let answers = set
        .questions()
        .iter()
        .enumerate()
        .map(|(i, q)| {
            let mut record = AnswerRecord::new(q);
            record.select(letter(if i == 0 { 'A' } else { 'B' }));
            record
        })
        .collect();
    QuizResult::freeze(
        AttemptId::generate(),
        set.title().into(),
        set.questions().to_vec(),
        answers,
        300,
        1_080,
        fixed_now() - Duration::seconds(300),
        fixed_now(),
        TerminationReason::Submitted,
    )
    .unwrap()
}

#[tokio::test]
async fn sqlite_roundtrip_persists_result_and_report() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_snapshots?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    let attempts = AttemptStore::new(Arc::new(repo.clone()));

    let set = build_set();
    let result = build_result(&set);
    attempts.save_result(&result, fixed_now()).await.unwrap();

    let loaded = attempts.load_result().await.unwrap().expect("result stored");
    assert_eq!(loaded, result);
    assert_eq!(loaded.correct_count(), 2);

    assert!(attempts.load_report().await.unwrap().is_none());
    let report = analyze(&loaded);
    attempts.save_report(&report, fixed_now()).await.unwrap();
    assert_eq!(attempts.load_report().await.unwrap(), Some(report));

    let raw = repo
        .get_snapshot(SnapshotKey::Report)
        .await
        .unwrap()
        .expect("report row");
    assert_eq!(raw.saved_at, fixed_now());
}

#[tokio::test]
async fn sqlite_overwrites_previous_snapshot() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_overwrite?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    repo.put_snapshot(SnapshotKey::Result, "{\"first\":1}".into(), fixed_now())
        .await
        .unwrap();
    let later = fixed_now() + Duration::minutes(5);
    repo.put_snapshot(SnapshotKey::Result, "{\"second\":2}".into(), later)
        .await
        .unwrap();

    let snapshot = repo
        .get_snapshot(SnapshotKey::Result)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(snapshot.payload, "{\"second\":2}");
    assert_eq!(snapshot.saved_at, later);
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_migrate?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("first migrate");
    repo.migrate().await.expect("second migrate");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schema_migrations")
        .fetch_one(repo.pool())
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn sqlite_storage_keeps_question_source() {
    let set = build_set();
    let source: Arc<dyn QuestionSource> =
        Arc::new(InMemoryRepository::with_question_set(set.clone()));
    let storage = Storage::sqlite("sqlite:file:memdb_storage?mode=memory&cache=shared", source)
        .await
        .expect("storage");

    assert_eq!(storage.questions.load_question_set().await.unwrap(), set);
    assert!(storage.attempts().load_result().await.unwrap().is_none());
}
