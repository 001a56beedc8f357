//! When steps for proof review BDD scenarios.

use super::world::{ProofReviewWorld, run_async};
use equitask::task::services::{FileProofRequest, ReviewProofRequest};
use rstest_bdd_macros::when;

#[when(r#"the employee submits text proof "{text}""#)]
fn employee_submits_text_proof(
    world: &mut ProofReviewWorld,
    text: String,
) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let result = run_async(
        world
            .service
            .submit_text_proof(&world.employee, task_id, text),
    );
    world.record(result);
    Ok(())
}

#[when(r#"the employee submits "{mime_type}" file proof "{file_name}""#)]
fn employee_submits_file_proof(
    world: &mut ProofReviewWorld,
    mime_type: String,
    file_name: String,
) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let request = FileProofRequest::new(file_name, mime_type, vec![0xff, 0xd8, 0xff, 0xe0]);
    let result = run_async(
        world
            .service
            .submit_file_proof(&world.employee, task_id, request),
    );
    world.record(result);
    Ok(())
}

#[when(r#"the manager reviews the proof with decision "{decision}""#)]
fn manager_reviews_proof(
    world: &mut ProofReviewWorld,
    decision: String,
) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let result = run_async(world.service.review_proof(
        &world.manager,
        task_id,
        ReviewProofRequest::new(decision),
    ));
    world.record(result);
    Ok(())
}

#[when(r#"the manager rejects the proof with comment "{comment}""#)]
fn manager_rejects_proof(
    world: &mut ProofReviewWorld,
    comment: String,
) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let result = run_async(world.service.review_proof(
        &world.manager,
        task_id,
        ReviewProofRequest::new("rejected").with_comment(comment),
    ));
    world.record(result);
    Ok(())
}

#[when("two managers review the proof concurrently")]
fn managers_review_concurrently(world: &mut ProofReviewWorld) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let first_service = world.service.clone();
    let second_service = world.service.clone();
    let first_manager = world.manager;
    let second_manager = world.second_manager;

    let (approve, reject) = run_async(async move {
        let approve = tokio::spawn(async move {
            first_service
                .review_proof(&first_manager, task_id, ReviewProofRequest::new("approved"))
                .await
        });
        let reject = tokio::spawn(async move {
            second_service
                .review_proof(
                    &second_manager,
                    task_id,
                    ReviewProofRequest::new("rejected").with_comment("too late"),
                )
                .await
        });
        (approve.await, reject.await)
    });

    world.review_outcomes = vec![approve?, reject?];
    Ok(())
}
