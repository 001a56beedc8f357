//! `PostgreSQL` repository implementation for task lifecycle storage.

use super::{
    models::{NewTaskRow, TaskChangeset, TaskRow},
    schema::tasks,
};
use crate::identity::domain::{OrganizationId, UserId};
use crate::task::{
    domain::{PersistedTaskData, Task, TaskId, TaskQuery, TaskScope, TaskStatus, UrgencyColor},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed task repository.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: TaskPgPool,
}

/// Listing order for task queries.
#[derive(Debug, Clone, Copy)]
enum ListOrder {
    NewestFirst,
    RecentlyUpdatedFirst,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }

    async fn list_ordered(
        &self,
        query: TaskQuery,
        order: ListOrder,
    ) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let mut statement = tasks::table
                .select(TaskRow::as_select())
                .filter(tasks::organization_id.eq(query.organization_id.into_inner()))
                .into_boxed::<Pg>();
            statement = match query.scope {
                TaskScope::Organization => statement,
                TaskScope::AssignedTo(user) => {
                    statement.filter(tasks::assigned_to.eq(user.into_inner()))
                }
                TaskScope::CreatedBy(user) => {
                    statement.filter(tasks::created_by.eq(user.into_inner()))
                }
            };
            if let Some(status) = query.status {
                statement = statement.filter(tasks::status.eq(status.as_str()));
            }
            statement = match order {
                ListOrder::NewestFirst => statement.order(tasks::created_at.desc()),
                ListOrder::RecentlyUpdatedFirst => statement.order(tasks::updated_at.desc()),
            };

            let rows = statement
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let new_row = to_new_row(task)?;

        self.run_blocking(move |connection| {
            diesel::insert_into(tasks::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TaskRepositoryError::DuplicateTask(task_id)
                    }
                    _ => TaskRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<Task> {
        let task_id = task.id();
        let organization_id = task.organization_id().into_inner();
        let expected = task.revision();
        let expected_revision = revision_to_i64(expected)?;
        let next = task.clone().into_next_revision();
        let changeset = to_changeset(&next)?;

        self.run_blocking(move |connection| {
            let affected = diesel::update(
                tasks::table
                    .filter(tasks::id.eq(task_id.into_inner()))
                    .filter(tasks::organization_id.eq(organization_id))
                    .filter(tasks::revision.eq(expected_revision)),
            )
            .set(&changeset)
            .execute(connection)
            .map_err(TaskRepositoryError::persistence)?;

            if affected == 1 {
                return Ok(next);
            }

            let still_exists = diesel::select(diesel::dsl::exists(
                tasks::table
                    .filter(tasks::id.eq(task_id.into_inner()))
                    .filter(tasks::organization_id.eq(organization_id)),
            ))
            .get_result::<bool>(connection)
            .map_err(TaskRepositoryError::persistence)?;

            if still_exists {
                Err(TaskRepositoryError::StaleRevision { task_id, expected })
            } else {
                Err(TaskRepositoryError::NotFound(task_id))
            }
        })
        .await
    }

    async fn find_in_organization(
        &self,
        organization_id: OrganizationId,
        id: TaskId,
    ) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .filter(tasks::organization_id.eq(organization_id.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn list(&self, query: &TaskQuery) -> TaskRepositoryResult<Vec<Task>> {
        self.list_ordered(*query, ListOrder::NewestFirst).await
    }

    async fn list_recently_updated(&self, query: &TaskQuery) -> TaskRepositoryResult<Vec<Task>> {
        self.list_ordered(*query, ListOrder::RecentlyUpdatedFirst)
            .await
    }

    async fn delete(
        &self,
        organization_id: OrganizationId,
        id: TaskId,
    ) -> TaskRepositoryResult<bool> {
        self.run_blocking(move |connection| {
            let affected = diesel::delete(
                tasks::table
                    .filter(tasks::id.eq(id.into_inner()))
                    .filter(tasks::organization_id.eq(organization_id.into_inner())),
            )
            .execute(connection)
            .map_err(TaskRepositoryError::persistence)?;
            Ok(affected > 0)
        })
        .await
    }
}

fn revision_to_i64(revision: u64) -> TaskRepositoryResult<i64> {
    i64::try_from(revision).map_err(TaskRepositoryError::persistence)
}

fn to_json<T: serde::Serialize>(value: &T) -> TaskRepositoryResult<serde_json::Value> {
    serde_json::to_value(value).map_err(TaskRepositoryError::persistence)
}

fn to_optional_json<T: serde::Serialize>(
    value: Option<&T>,
) -> TaskRepositoryResult<Option<serde_json::Value>> {
    value.map(to_json).transpose()
}

fn to_new_row(task: &Task) -> TaskRepositoryResult<NewTaskRow> {
    Ok(NewTaskRow {
        id: task.id().into_inner(),
        organization_id: task.organization_id().into_inner(),
        title: task.title().to_owned(),
        description: task.description().to_owned(),
        category: task.category().to_owned(),
        urgency_color: task.urgency().as_str().to_owned(),
        due_date: task.due_date(),
        created_by: task.created_by().into_inner(),
        assigned_to: task.assigned_to().map(UserId::into_inner),
        steps: to_json(&task.steps())?,
        status: task.status().as_str().to_owned(),
        proof: to_optional_json(task.proof())?,
        manager_review: to_optional_json(task.manager_review())?,
        revision: revision_to_i64(task.revision())?,
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    })
}

fn to_changeset(task: &Task) -> TaskRepositoryResult<TaskChangeset> {
    Ok(TaskChangeset {
        title: task.title().to_owned(),
        description: task.description().to_owned(),
        category: task.category().to_owned(),
        urgency_color: task.urgency().as_str().to_owned(),
        due_date: task.due_date(),
        assigned_to: task.assigned_to().map(UserId::into_inner),
        steps: to_json(&task.steps())?,
        status: task.status().as_str().to_owned(),
        proof: to_optional_json(task.proof())?,
        manager_review: to_optional_json(task.manager_review())?,
        revision: revision_to_i64(task.revision())?,
        updated_at: task.updated_at(),
    })
}

fn row_to_task(row: TaskRow) -> TaskRepositoryResult<Task> {
    let TaskRow {
        id,
        organization_id,
        title,
        description,
        category,
        urgency_color,
        due_date,
        created_by,
        assigned_to,
        steps: persisted_steps,
        status: persisted_status,
        proof: persisted_proof,
        manager_review: persisted_review,
        revision: persisted_revision,
        created_at,
        updated_at,
    } = row;

    let status = TaskStatus::try_from(persisted_status.as_str())
        .map_err(TaskRepositoryError::persistence)?;
    let urgency = UrgencyColor::try_from(urgency_color.as_str())
        .map_err(TaskRepositoryError::persistence)?;
    let steps = serde_json::from_value(persisted_steps).map_err(TaskRepositoryError::persistence)?;
    let proof = persisted_proof
        .map(serde_json::from_value)
        .transpose()
        .map_err(TaskRepositoryError::persistence)?;
    let manager_review = persisted_review
        .map(serde_json::from_value)
        .transpose()
        .map_err(TaskRepositoryError::persistence)?;
    let revision = u64::try_from(persisted_revision).map_err(TaskRepositoryError::persistence)?;

    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::from_uuid(id),
        organization_id: OrganizationId::from_uuid(organization_id),
        title,
        description,
        category,
        urgency,
        due_date,
        created_by: UserId::from_uuid(created_by),
        assigned_to: assigned_to.map(UserId::from_uuid),
        steps,
        status,
        proof,
        manager_review,
        revision,
        created_at,
        updated_at,
    }))
}
