//! Given steps for proof review BDD scenarios.

use super::world::{ProofReviewWorld, run_async};
use equitask::task::services::{CreateTaskRequest, ReviewProofRequest};
use eyre::WrapErr;
use rstest_bdd_macros::given;

#[given("an organization with a task assigned to an employee")]
fn task_assigned_to_employee(world: &mut ProofReviewWorld) -> Result<(), eyre::Report> {
    let request = CreateTaskRequest::new("Restock aisle 4")
        .with_assignee(world.employee.id())
        .with_steps(vec!["unpack".to_owned(), "shelve".to_owned()]);
    let created = run_async(world.service.create_task(&world.creator, request))
        .wrap_err("create task for proof scenario")?;
    world.task = Some(created);
    Ok(())
}

#[given(r#"the employee has submitted text proof "{text}""#)]
fn employee_submitted_text_proof(
    world: &mut ProofReviewWorld,
    text: String,
) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let submitted = run_async(
        world
            .service
            .submit_text_proof(&world.employee, task_id, text),
    )
    .wrap_err("submit text proof in scenario setup")?;
    world.task = Some(submitted);
    Ok(())
}

#[given(r#"the manager has rejected the proof with comment "{comment}""#)]
fn manager_rejected_proof(
    world: &mut ProofReviewWorld,
    comment: String,
) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let reviewed = run_async(world.service.review_proof(
        &world.manager,
        task_id,
        ReviewProofRequest::new("rejected").with_comment(comment),
    ))
    .wrap_err("reject proof in scenario setup")?;
    world.task = Some(reviewed);
    Ok(())
}
