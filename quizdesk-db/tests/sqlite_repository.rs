use chrono::Utc;
use quizdesk_db::{
    DbConnectionConfig, DbError, NewPassage, NewQuestion, QuestionRepository,
    SqlQuestionRepository,
};
use quizdesk_job_queue::{ExplanationStatus, ExplanationUpdate, JobQueueError, QuestionStore};
use uuid::Uuid;

async fn memory_repo() -> SqlQuestionRepository {
    SqlQuestionRepository::connect(&DbConnectionConfig::new("sqlite::memory:"))
        .await
        .expect("open in-memory sqlite")
}

fn passage() -> NewPassage {
    NewPassage {
        title: "Photosynthesis".into(),
        content: "Plants convert light into chemical energy.".into(),
        comment: Some("Grade 9 biology".into()),
    }
}

fn question(passage_id: Uuid, explanation: Option<&str>) -> NewQuestion {
    NewQuestion {
        passage_id,
        question_text: "What do plants convert light into?".into(),
        options: vec![
            "Chemical energy".into(),
            "Sound".into(),
            "Heat only".into(),
        ],
        correct_answer: "Chemical energy".into(),
        explanation: explanation.map(str::to_owned),
    }
}

#[tokio::test]
async fn passages_round_trip() {
    let repo = memory_repo().await;
    let created = repo.create_passage(passage()).await.unwrap();

    let loaded = repo.get_passage(created.id).await.unwrap().expect("passage");
    assert_eq!(loaded.title, "Photosynthesis");
    assert_eq!(loaded.comment.as_deref(), Some("Grade 9 biology"));
    assert_eq!(loaded.created_at, created.created_at);

    assert!(repo.get_passage(Uuid::new_v4()).await.unwrap().is_none());
    assert_eq!(repo.backend(), "sqlite");
    repo.ping().await.unwrap();
}

#[tokio::test]
async fn questions_keep_options_and_initial_status() {
    let repo = memory_repo().await;
    let p = repo.create_passage(passage()).await.unwrap();

    let generated = repo.create_question(question(p.id, None)).await.unwrap();
    let manual = repo
        .create_question(question(p.id, Some("Light becomes sugar.")))
        .await
        .unwrap();

    let loaded = repo.get_question(generated.id).await.unwrap().expect("question");
    assert_eq!(loaded.options, vec!["Chemical energy", "Sound", "Heat only"]);
    assert_eq!(loaded.explanation_status, Some(ExplanationStatus::Pending));

    let loaded = repo.get_question(manual.id).await.unwrap().expect("question");
    assert_eq!(loaded.explanation_status, None);
    assert_eq!(loaded.explanation.as_deref(), Some("Light becomes sugar."));

    let with_questions = repo
        .get_passage_with_questions(p.id)
        .await
        .unwrap()
        .expect("passage");
    let ids: Vec<Uuid> = with_questions.questions.iter().map(|q| q.id).collect();
    assert_eq!(ids, vec![generated.id, manual.id]);
}

#[tokio::test]
async fn question_for_unknown_passage_is_rejected() {
    let repo = memory_repo().await;
    let err = repo
        .create_question(question(Uuid::new_v4(), None))
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::PassageNotFound(_)));
}

#[tokio::test]
async fn explanation_lifecycle_is_persisted() {
    let repo = memory_repo().await;
    let p = repo.create_passage(passage()).await.unwrap();
    let q = repo.create_question(question(p.id, None)).await.unwrap();

    repo.apply_explanation_update(q.id, ExplanationUpdate::Generating)
        .await
        .unwrap();
    repo.apply_explanation_update(
        q.id,
        ExplanationUpdate::Failed {
            error: "rate limited".into(),
        },
    )
    .await
    .unwrap();

    let state = repo.explanation_state(q.id).await.unwrap().expect("state");
    assert_eq!(state.status, Some(ExplanationStatus::Failed));
    assert_eq!(state.error.as_deref(), Some("rate limited"));

    let generated_at = Utc::now();
    repo.apply_explanation_update(
        q.id,
        ExplanationUpdate::Completed {
            explanation: "Chlorophyll captures light.".into(),
            generated_at,
        },
    )
    .await
    .unwrap();

    let stored = repo.get_question(q.id).await.unwrap().expect("question");
    assert_eq!(stored.explanation_status, Some(ExplanationStatus::Completed));
    assert_eq!(
        stored.explanation.as_deref(),
        Some("Chlorophyll captures light.")
    );
    assert_eq!(stored.explanation_error, None);
    let stored_at = stored.explanation_generated_at.expect("generated_at");
    assert!((stored_at - generated_at).num_milliseconds().abs() < 1);
}

#[tokio::test]
async fn updates_for_unknown_questions_report_not_found() {
    let repo = memory_repo().await;
    let missing = Uuid::new_v4();

    let err = repo
        .apply_explanation_update(missing, ExplanationUpdate::Pending)
        .await
        .unwrap_err();
    assert!(matches!(err, JobQueueError::QuestionNotFound(id) if id == missing));
    assert_eq!(repo.explanation_state(missing).await.unwrap(), None);
}

#[tokio::test]
async fn file_database_survives_reconnect() {
    let dir = tempfile::tempdir().expect("tempdir");
    let url = format!("sqlite://{}", dir.path().join("data").join("quiz.sqlite").display());
    let config = DbConnectionConfig::new(url).with_max_connections(2);

    let passage_id = {
        let repo = SqlQuestionRepository::connect(&config).await.unwrap();
        let id = repo.create_passage(passage()).await.unwrap().id;
        repo.pool().close().await;
        id
    };

    let repo = SqlQuestionRepository::connect(&config).await.unwrap();
    assert!(repo.get_passage(passage_id).await.unwrap().is_some());
}
